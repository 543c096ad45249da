//! Neon Vector - top-down neon survival arcade
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, waves, bosses, economy)
//! - `game`: Fixed-step frame driver wrapping the simulation
//! - `renderer`: Backend-agnostic draw lists
//! - `platform`: Input device abstraction
//! - `persistence`: JSON storage for settings and high scores

pub mod audio;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::{Game, GameCallbacks, HudStats};
pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_STEP_MS: f64 = 1000.0 / 60.0;
    /// Maximum fixed steps per frame callback
    pub const MAX_UPDATES_PER_FRAME: u32 = 10;
    /// Accumulator backlog cap in milliseconds
    pub const MAX_ACCUMULATOR_MS: f64 = 250.0;

    /// Square world, origin top-left
    pub const WORLD_SIZE: f32 = 4000.0;
    /// Background grid spacing
    pub const TILE_SIZE: f32 = 100.0;

    /// Player stat caps; anything above is clamped and converted into an enemy buff
    pub const MAX_PLAYER_SPEED: f32 = 22.0;
    pub const MAX_PLAYER_DAMAGE: f32 = 200.0;
    pub const MAX_PICKUP_RANGE: f32 = 800.0;
    /// Enemy buff granted per capped upgrade
    pub const OVERFLOW_BUFF: f32 = 0.1;

    /// Player movement
    pub const FRICTION: f32 = 0.92;
    pub const ACCELERATION: f32 = 1.5;
    pub const BASE_SPEED: f32 = 6.0;
    pub const DASH_IMPULSE: f32 = 25.0;
    pub const DASH_SPEED_LIMIT: f32 = 30.0;
    /// Fixed fan arc for multishot (radians)
    pub const FAN_SPREAD: f32 = 0.2;

    /// Spatial hash cell size, tuned against the largest common enemy radius
    pub const SPATIAL_CELL_SIZE: f32 = 150.0;

    /// Homing acquisition radii
    pub const HOMING_ACQUIRE_RADIUS: f32 = 600.0;
    pub const HOMING_REACQUIRE_RADIUS: f32 = 400.0;
    pub const HOMING_STEER: f32 = 0.35;

    /// Wave progression
    pub const WAVE_DURATION: u32 = 3600;
    /// True boss cadence in player levels
    pub const BOSS_LEVEL_INTERVAL: u32 = 15;
    pub const BOSS_INTRO_TICKS: u32 = 180;
    /// Intro tick at which the arena is wiped
    pub const BOSS_INTRO_WIPE_AT: u32 = 60;
    /// Powers replace upgrades every N levels
    pub const POWER_LEVEL_INTERVAL: u32 = 10;

    /// Combo
    pub const COMBO_MAX_TIMER: u32 = 240;
    pub const COMBO_MILESTONE: u32 = 10;

    /// Hit-stop lengths in frame callbacks
    pub const HIT_STOP_CRIT: u32 = 4;
    pub const HIT_STOP_BIG_KILL: u32 = 8;
    pub const BIG_ENEMY_SIZE: f32 = 30.0;

    /// Population caps
    pub const MAX_PARTICLES: usize = 150;
    pub const MAX_ENEMIES: usize = 500;
    pub const MAX_DRONES: usize = 3;

    /// Spawn chance ceiling per tick
    pub const MAX_SPAWN_CHANCE: f32 = 0.15;

    /// Orbs
    pub const ORB_LIFE: i32 = 3600;
    pub const ORB_BASE_MAGNET: f32 = 350.0;
    pub const ORB_PICKUP_RADIUS: f32 = 40.0;

    /// Plasma aura
    pub const AURA_RADIUS: f32 = 150.0;
    pub const AURA_DAMAGE: f32 = 1.0;

    /// Enemy speed multiplier while Time Warp is running
    pub const TIME_WARP_FACTOR: f32 = 0.15;

    /// Player hurt radius used by enemy bullets and contact
    pub const PLAYER_HIT_RADIUS: f32 = 10.0;
}

/// Clamp a point into the square `[margin, WORLD_SIZE - margin]`
#[inline]
pub fn clamp_to_world(pos: Vec2, margin: f32) -> Vec2 {
    let max = consts::WORLD_SIZE - margin;
    Vec2::new(pos.x.clamp(margin, max), pos.y.clamp(margin, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_to_world() {
        let p = clamp_to_world(Vec2::new(-20.0, 5000.0), 50.0);
        assert_eq!(p, Vec2::new(50.0, consts::WORLD_SIZE - 50.0));
    }
}
