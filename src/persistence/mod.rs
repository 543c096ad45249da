//! JSON file storage for settings and high scores
//!
//! The simulation never touches storage; the driver loads records at startup
//! and writes them back when they change. Missing files are not errors.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Directory of named JSON records
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$NEON_VECTOR_DATA`, or `.neon-vector` in the working directory
    pub fn from_env() -> Self {
        let dir = std::env::var_os("NEON_VECTOR_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".neon-vector"));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read a record; `Ok(None)` if it was never written
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path(key);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StoreError::Parse { path, source })
    }

    /// Write a record through a temp file so a crash never leaves half a file
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let json = serde_json::to_string_pretty(value)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }

    /// Load a record, falling back to its default on any failure
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.load(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                log::info!("no {key} record found, starting fresh");
                T::default()
            }
            Err(e) => {
                log::warn!("{e}; using defaults");
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Record {
        value: u32,
    }

    fn temp_store(name: &str) -> Store {
        let dir = std::env::temp_dir().join(format!("neon_vector_store_{name}"));
        let _ = fs::remove_dir_all(&dir);
        Store::new(dir)
    }

    #[test]
    fn test_missing_record_is_none() {
        let store = temp_store("missing");
        let rec: Option<Record> = store.load("nothing").unwrap();
        assert!(rec.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = temp_store("save");
        store.save("rec", &Record { value: 7 }).unwrap();
        let rec: Option<Record> = store.load("rec").unwrap();
        assert_eq!(rec, Some(Record { value: 7 }));
        assert!(!store.dir().join("rec.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_record_falls_back() {
        let store = temp_store("corrupt");
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join("rec.json"), "{ not json").unwrap();
        assert!(matches!(store.load::<Record>("rec"), Err(StoreError::Parse { .. })));
        assert_eq!(store.load_or_default::<Record>("rec"), Record::default());
    }
}
