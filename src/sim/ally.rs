//! Attack drones granted by the drone power

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, TargetView};
use super::player::Player;
use super::vector::{dir_to, jitter};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ally {
    pub pos: Vec2,
    pub damage: f32,
    /// Ticks between shots
    pub fire_rate: f32,
    pub fire_timer: u32,
    pub range: f32,
    /// Ticks alive; drives the orbit around the player
    pub age: u32,
}

impl Ally {
    const ORBIT_RADIUS: f32 = 60.0;
    const BULLET_SPEED: f32 = 10.0;

    pub fn new<R: Rng + ?Sized>(player: &Player, rng: &mut R) -> Self {
        let mut ally = Self {
            pos: player.pos + jitter(rng, 50.0),
            damage: 0.0,
            fire_rate: 0.0,
            fire_timer: 0,
            range: 500.0,
            age: 0,
        };
        ally.sync_stats(player);
        ally
    }

    /// Inherit a share of the player's firepower
    pub fn sync_stats(&mut self, player: &Player) {
        self.damage = (player.damage * 0.35).max(1.0);
        self.fire_rate = player.fire_rate.max(5.0);
    }

    /// Follow the player and shoot the nearest hostile in range
    pub fn update(&mut self, player_pos: Vec2, view: &TargetView<'_>) -> Option<Bullet> {
        self.age += 1;
        let t = self.age as f32 / 60.0;
        let anchor = player_pos + Vec2::new(t.cos(), t.sin()) * Self::ORBIT_RADIUS;
        self.pos += (anchor - self.pos) * 0.1;

        self.fire_timer += 1;
        if (self.fire_timer as f32) < self.fire_rate {
            return None;
        }
        let (_, target_pos) = view.nearest_hostile(self.pos, self.range)?;
        self.fire_timer = 0;
        let aim = dir_to(self.pos, target_pos);
        Some(Bullet::new(self.pos, aim * Self::BULLET_SPEED, self.damage))
    }
}
