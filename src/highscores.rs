//! Personal bests
//!
//! Two independent records, best score and best combo. Each is replaced only
//! when a finished run beats it.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Store};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScores {
    pub best_score: u64,
    pub best_combo: u32,
}

/// Which records a run broke
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewRecords {
    pub score: bool,
    pub combo: bool,
}

impl NewRecords {
    pub fn any(self) -> bool {
        self.score || self.combo
    }
}

impl HighScores {
    const STORAGE_KEY: &'static str = "highscores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a finished run
    pub fn submit(&mut self, score: u64, max_combo: u32) -> NewRecords {
        let mut records = NewRecords::default();
        if score > self.best_score {
            self.best_score = score;
            records.score = true;
        }
        if max_combo > self.best_combo {
            self.best_combo = max_combo;
            records.combo = true;
        }
        records
    }

    pub fn load(store: &Store) -> Self {
        let scores: Self = store.load_or_default(Self::STORAGE_KEY);
        log::info!("best score {} / best combo {}", scores.best_score, scores.best_combo);
        scores
    }

    pub fn save(&self, store: &Store) -> persistence::Result<()> {
        store.save(Self::STORAGE_KEY, self)
    }

    /// Submit a run and write back only if a record fell
    pub fn record_run(
        &mut self,
        store: &Store,
        score: u64,
        max_combo: u32,
    ) -> persistence::Result<NewRecords> {
        let records = self.submit(score, max_combo);
        if records.any() {
            self.save(store)?;
            log::info!("new personal best: {records:?}");
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_are_independent() {
        let mut hs = HighScores::new();
        assert_eq!(hs.submit(500, 12), NewRecords { score: true, combo: true });
        assert_eq!(hs.submit(400, 20), NewRecords { score: false, combo: true });
        assert_eq!(hs.best_score, 500);
        assert_eq!(hs.best_combo, 20);
        assert!(!hs.submit(500, 20).any());
    }

    #[test]
    fn test_record_run_persists() {
        let dir = std::env::temp_dir().join("neon_vector_highscores_test");
        let _ = std::fs::remove_dir_all(&dir);
        let store = Store::new(&dir);

        let mut hs = HighScores::load(&store);
        assert_eq!(hs, HighScores::default());
        hs.record_run(&store, 1234, 9).unwrap();

        let back = HighScores::load(&store);
        assert_eq!(back.best_score, 1234);
        assert_eq!(back.best_combo, 9);
    }
}
