//! Side effects emitted by the simulation
//!
//! The core never calls into audio or UI directly. Every tick pushes
//! events onto `GameState::events`; the frame driver drains and dispatches
//! them after each step.

use serde::{Deserialize, Serialize};

use super::upgrades::LevelUpOption;

/// Fire-and-forget audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Shoot,
    EnemyHit,
    Explosion,
    Dash,
    PowerUp,
    BossSpawn,
    GameOver,
    /// Combo milestone, carries the combo count
    Combo(u32),
}

/// Music intensity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Intensity {
    #[default]
    Normal,
    Action,
    Boss,
}

/// Everything the outside world needs to hear about from a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundCue),
    /// Banner text: elite/boss warnings, ally arrivals
    Announce(String),
    /// Player levelled up; the driver must pause and offer these
    LevelUp(Vec<LevelUpOption>),
    /// Combo decayed to zero without damage
    ComboLost,
    /// Combo reset by taking damage
    ComboBroken,
    /// An upgrade hit a stat cap and was converted into an enemy buff
    StatCapped,
    GameOver { score: u64, max_combo: u32 },
}
