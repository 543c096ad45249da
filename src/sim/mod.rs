//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (collection order, IDs for cross-references)
//! - No rendering, audio or platform dependencies

pub mod ally;
pub mod boss;
pub mod bullet;
pub mod collision;
pub mod effects;
pub mod enemy;
pub mod events;
pub mod pickup;
pub mod player;
pub mod skills;
pub mod spatial;
pub mod state;
pub mod support;
pub mod tick;
pub mod upgrades;
pub mod vector;

/// Stable handle shared by enemies, chiefs and bosses
pub type EntityId = u32;

pub use boss::{Boss, BossKind};
pub use bullet::{Bullet, TargetRef};
pub use enemy::{Enemy, EnemyKind};
pub use events::{GameEvent, Intensity, SoundCue};
pub use player::{ActiveSkill, PassivePower, Perk, Player};
pub use spatial::SpatialHash;
pub use state::GameState;
pub use tick::{TickInput, autopilot_input, tick};
pub use upgrades::{LevelUpOption, Power};
