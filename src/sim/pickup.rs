//! Collectible orbs and persistent area fields

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::vector::VecExt;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbKind {
    Xp,
    Health,
}

/// XP or health pickup that gets magnetised toward the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orb {
    pub pos: Vec2,
    pub vel: Vec2,
    pub value: f32,
    pub kind: OrbKind,
    pub radius: f32,
    pub life: i32,
}

impl Orb {
    /// Spawns with a small upward pop
    pub fn new<R: Rng + ?Sized>(pos: Vec2, value: f32, kind: OrbKind, rng: &mut R) -> Self {
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * 4.0,
            -rng.random::<f32>() * 4.0 - 2.0,
        );
        Self {
            pos,
            vel,
            value,
            kind,
            radius: match kind {
                OrbKind::Xp => 5.0,
                OrbKind::Health => 8.0,
            },
            life: ORB_LIFE,
        }
    }

    /// Advance one tick; returns `false` once the orb has expired
    pub fn update(&mut self, player_pos: Vec2, magnet_bonus: f32) -> bool {
        self.life -= 1;
        if self.life <= 0 {
            return false;
        }

        let dist = self.pos.distance(player_pos);
        let magnet = ORB_BASE_MAGNET + magnet_bonus;

        if dist < magnet {
            let desired = (player_pos - self.pos).norm();
            let pull = 0.8 + (1.0 - dist / magnet) * 3.0;
            self.vel += desired * pull;
            self.vel *= 0.92;
            // Hard lock close in so the orb cannot orbit the player
            if dist < 80.0 {
                self.vel = desired * self.vel.length();
            }
            self.vel = self.vel.limit(24.0);
        } else {
            self.vel *= 0.92;
        }

        self.pos += self.vel;
        true
    }

    pub fn touches(&self, player_pos: Vec2) -> bool {
        self.pos.distance(player_pos) < ORB_PICKUP_RADIUS + self.radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaKind {
    BlackHole,
}

/// Lingering field that drags and damages everything hostile inside it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaEffect {
    pub pos: Vec2,
    pub kind: AreaKind,
    pub life: i32,
    pub radius: f32,
}

impl AreaEffect {
    pub const BLACK_HOLE_LIFE: i32 = 300;
    pub const BLACK_HOLE_RADIUS: f32 = 300.0;
    pub const DAMAGE_PER_TICK: f32 = 2.0;
    const ENEMY_PULL: f32 = 2.5;
    const BOSS_PULL: f32 = 0.5;

    pub fn black_hole(pos: Vec2) -> Self {
        Self {
            pos,
            kind: AreaKind::BlackHole,
            life: Self::BLACK_HOLE_LIFE,
            radius: Self::BLACK_HOLE_RADIUS,
        }
    }

    /// Count down; returns `true` on ticks that shed a debris particle
    pub fn tick(&mut self) -> bool {
        self.life -= 1;
        self.life % 5 == 0
    }

    pub fn is_expired(&self) -> bool {
        self.life <= 0
    }

    fn pull(&self, pos: Vec2, strength: f32) -> Option<Vec2> {
        (pos.distance(self.pos) < self.radius).then(|| (self.pos - pos).norm() * strength)
    }

    /// Displacement for an enemy at `pos`, if it is inside the field
    pub fn enemy_pull(&self, pos: Vec2) -> Option<Vec2> {
        self.pull(pos, Self::ENEMY_PULL)
    }

    /// Bosses resist the drag
    pub fn boss_pull(&self, pos: Vec2) -> Option<Vec2> {
        self.pull(pos, Self::BOSS_PULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_orb_expires() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut orb = Orb::new(Vec2::ZERO, 10.0, OrbKind::Xp, &mut rng);
        orb.life = 2;
        assert!(orb.update(Vec2::splat(3000.0), 0.0));
        assert!(!orb.update(Vec2::splat(3000.0), 0.0));
    }

    #[test]
    fn test_orb_is_pulled_in() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Vec2::new(1000.0, 1000.0);
        let mut orb = Orb::new(Vec2::new(1200.0, 1000.0), 10.0, OrbKind::Xp, &mut rng);
        let start = orb.pos.distance(player);
        for _ in 0..30 {
            orb.update(player, 0.0);
        }
        assert!(orb.pos.distance(player) < start);
        assert!(orb.vel.length() <= 24.0 + 1e-4);
    }

    #[test]
    fn test_magnet_bonus_extends_reach() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Vec2::new(1000.0, 1000.0);
        let mut near = Orb::new(Vec2::new(1400.0, 1000.0), 1.0, OrbKind::Health, &mut rng);
        near.vel = Vec2::ZERO;
        let mut far = near.clone();
        near.update(player, 100.0);
        far.update(player, 0.0);
        assert!(near.vel.x < 0.0);
        assert_eq!(far.vel, Vec2::ZERO);
    }

    #[test]
    fn test_black_hole_pull() {
        let bh = AreaEffect::black_hole(Vec2::new(500.0, 500.0));
        let pull = bh.enemy_pull(Vec2::new(600.0, 500.0));
        assert_eq!(pull, Some(Vec2::new(-2.5, 0.0)));
        assert_eq!(bh.boss_pull(Vec2::new(500.0, 400.0)), Some(Vec2::new(0.0, 0.5)));
        assert_eq!(bh.enemy_pull(Vec2::new(900.0, 500.0)), None);
    }
}
