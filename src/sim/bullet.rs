//! Projectiles
//!
//! One type serves both sides; `enemy` decides who it can hurt. Hit testing
//! uses `radius`, drawing uses `visual_radius()` (big enemy shots look
//! smaller than their hitbox).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::EntityId;
use super::boss::Boss;
use super::enemy::Enemy;
use super::vector::VecExt;
use crate::consts::*;

/// Non-owning handle to something a bullet steers toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    Player,
    Enemy(EntityId),
    /// Wave chief or true boss
    Boss(EntityId),
}

/// Read-only snapshot of everything a bullet may home in on
pub struct TargetView<'a> {
    pub player_pos: Vec2,
    pub player_hp: f32,
    pub enemies: &'a [Enemy],
    pub chiefs: &'a [Boss],
    pub bosses: &'a [Boss],
}

impl TargetView<'_> {
    /// Position of a live target; `None` if it died or left its collection
    pub fn locate(&self, target: TargetRef) -> Option<Vec2> {
        match target {
            TargetRef::Player => (self.player_hp > 0.0).then_some(self.player_pos),
            TargetRef::Enemy(id) => self
                .enemies
                .iter()
                .find(|e| e.id == id && e.hp > 0.0)
                .map(|e| e.pos),
            TargetRef::Boss(id) => self
                .chiefs
                .iter()
                .chain(self.bosses)
                .find(|b| b.id == id && b.hp > 0.0)
                .map(|b| b.pos),
        }
    }

    /// Every live enemy, chief and boss with its position
    pub fn hostiles(&self) -> impl Iterator<Item = (TargetRef, Vec2)> + '_ {
        let enemies = self
            .enemies
            .iter()
            .filter(|e| e.hp > 0.0)
            .map(|e| (TargetRef::Enemy(e.id), e.pos));
        let bosses = self
            .chiefs
            .iter()
            .chain(self.bosses)
            .filter(|b| b.hp > 0.0)
            .map(|b| (TargetRef::Boss(b.id), b.pos));
        enemies.chain(bosses)
    }

    /// Closest hostile of any kind strictly within `range`
    pub fn nearest_hostile(&self, from: Vec2, range: f32) -> Option<(TargetRef, Vec2)> {
        let mut best = None;
        let mut best_dist = range;
        for (target, pos) in self.hostiles() {
            let d = from.distance(pos);
            if d < best_dist {
                best_dist = d;
                best = Some((target, pos));
            }
        }
        best
    }

    /// Closest live enemy strictly within `range`
    pub fn nearest_enemy(&self, from: Vec2, range: f32) -> Option<EntityId> {
        let mut best = None;
        let mut best_dist = range;
        for e in self.enemies {
            let d = from.distance(e.pos);
            if d < best_dist && e.hp > 0.0 {
                best_dist = d;
                best = Some(e.id);
            }
        }
        best
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    /// Hitbox radius
    pub radius: f32,
    pub life: i32,
    /// Remaining targets this bullet may pass through
    pub piercing: i32,
    /// Fired by an enemy or boss; hurts only the player
    pub enemy: bool,
    pub target: Option<TargetRef>,
    pub crit: bool,
    pub knockback: f32,
    /// Remaining wall/target bounces
    pub bounces: u32,
    pub blast_radius: f32,
    /// Acquires its own target when it has none
    pub homing: bool,
    /// Enemies and bosses already damaged by this bullet
    pub hit_ids: Vec<EntityId>,
}

impl Bullet {
    /// A 4px, 120-tick, single-pierce player bullet
    pub fn new(pos: Vec2, vel: Vec2, damage: f32) -> Self {
        Self {
            pos,
            vel,
            damage,
            radius: 4.0,
            life: 120,
            piercing: 1,
            enemy: false,
            target: None,
            crit: false,
            knockback: 0.0,
            bounces: 0,
            blast_radius: 0.0,
            homing: false,
            hit_ids: Vec::new(),
        }
    }

    /// Enemy-owned shot with the given hitbox and lifetime
    pub fn hostile(pos: Vec2, vel: Vec2, damage: f32, radius: f32, life: i32) -> Self {
        Self {
            radius,
            life,
            enemy: true,
            ..Self::new(pos, vel, damage)
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_life(mut self, life: i32) -> Self {
        self.life = life;
        self
    }

    pub fn with_piercing(mut self, piercing: i32) -> Self {
        self.piercing = piercing;
        self
    }

    pub fn with_target(mut self, target: Option<TargetRef>) -> Self {
        self.target = target;
        self
    }

    pub fn with_crit(mut self, crit: bool) -> Self {
        self.crit = crit;
        self
    }

    pub fn with_knockback(mut self, knockback: f32) -> Self {
        self.knockback = knockback;
        self
    }

    pub fn with_bounces(mut self, bounces: u32) -> Self {
        self.bounces = bounces;
        self
    }

    pub fn with_blast(mut self, blast_radius: f32) -> Self {
        self.blast_radius = blast_radius;
        self
    }

    pub fn homing(mut self) -> Self {
        self.homing = true;
        self
    }

    /// Drawn radius; large enemy shots render at 60% of their hitbox
    pub fn visual_radius(&self) -> f32 {
        if self.enemy && self.radius > 8.0 {
            self.radius * 0.6
        } else {
            self.radius
        }
    }

    pub fn has_hit(&self, id: EntityId) -> bool {
        self.hit_ids.contains(&id)
    }

    pub fn register_hit(&mut self, id: EntityId) {
        self.hit_ids.push(id);
    }

    fn out_of_bounds(&self) -> bool {
        self.pos.x < 0.0 || self.pos.x > WORLD_SIZE || self.pos.y < 0.0 || self.pos.y > WORLD_SIZE
    }

    /// Ready for removal: life spent, or outside the world with no bounce left
    pub fn is_expired(&self) -> bool {
        self.life <= 0 || (self.bounces == 0 && self.out_of_bounds())
    }

    /// Wall bounce, target upkeep, homing steer, then integrate one tick
    pub fn update(&mut self, view: &TargetView<'_>) {
        if self.bounces > 0 {
            let mut bounced = false;
            if self.pos.x <= 0.0 || self.pos.x >= WORLD_SIZE {
                self.vel.x = -self.vel.x;
                bounced = true;
            }
            if self.pos.y <= 0.0 || self.pos.y >= WORLD_SIZE {
                self.vel.y = -self.vel.y;
                bounced = true;
            }
            if bounced {
                self.bounces -= 1;
            }
        }

        if self.homing && self.target.is_none() && !self.enemy {
            self.target = view
                .nearest_enemy(self.pos, HOMING_ACQUIRE_RADIUS)
                .map(TargetRef::Enemy);
        }

        if let Some(target) = self.target {
            let mut aim = view.locate(target);
            if aim.is_none() {
                self.target = None;
                if !self.enemy {
                    self.target = view
                        .nearest_enemy(self.pos, HOMING_REACQUIRE_RADIUS)
                        .map(TargetRef::Enemy);
                    aim = self.target.and_then(|t| view.locate(t));
                }
            }

            if let Some(target_pos) = aim {
                let speed = self.vel.length();
                let desired = (target_pos - self.pos).norm();
                self.vel = (self.vel + desired * HOMING_STEER).norm() * speed;
            }
        }

        self.pos += self.vel;
        self.life -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn empty_view() -> TargetView<'static> {
        TargetView {
            player_pos: Vec2::splat(2000.0),
            player_hp: 100.0,
            enemies: &[],
            chiefs: &[],
            bosses: &[],
        }
    }

    #[test]
    fn test_wall_bounce_reflects_once() {
        let mut b = Bullet::new(Vec2::new(0.0, 500.0), Vec2::new(-5.0, 0.0), 10.0).with_bounces(1);
        b.update(&empty_view());
        assert_eq!(b.vel, Vec2::new(5.0, 0.0));
        assert_eq!(b.bounces, 0);
        assert_eq!(b.pos, Vec2::new(5.0, 500.0));
        assert!(!b.is_expired());
    }

    #[test]
    fn test_bounce_budget_counts_down_exactly() {
        // Pinned against the left wall: every step crosses x <= 0 again
        let mut b = Bullet::new(Vec2::new(0.0, 500.0), Vec2::new(-5.0, 0.0), 10.0)
            .with_bounces(3)
            .with_life(1000);
        let mut reflections = 0;
        for _ in 0..10 {
            let before = b.vel.x;
            b.update(&empty_view());
            if b.vel.x != before {
                reflections += 1;
            }
            b.vel.x = -b.vel.x.abs();
            b.pos.x = 0.0;
            if b.bounces == 0 {
                break;
            }
        }
        assert_eq!(reflections, 3);
        b.pos.x = -1.0;
        assert!(b.is_expired());
    }

    #[test]
    fn test_non_bouncing_bullet_expires_outside() {
        let mut b = Bullet::new(Vec2::new(2.0, 500.0), Vec2::new(-5.0, 0.0), 10.0);
        b.update(&empty_view());
        assert!(b.is_expired());
    }

    #[test]
    fn test_visual_radius() {
        let big = Bullet::hostile(Vec2::ZERO, Vec2::ZERO, 10.0, 15.0, 100);
        assert!((big.visual_radius() - 9.0).abs() < 1e-5);
        let small = Bullet::hostile(Vec2::ZERO, Vec2::ZERO, 10.0, 6.0, 100);
        assert_eq!(small.visual_radius(), 6.0);
        let player = Bullet::new(Vec2::ZERO, Vec2::ZERO, 10.0).with_radius(15.0);
        assert_eq!(player.visual_radius(), 15.0);
    }

    #[test]
    fn test_homing_acquires_and_keeps_speed() {
        let mut rng = Pcg32::seed_from_u64(1);
        let enemy = Enemy::new(7, EnemyKind::Grunt, Vec2::new(1000.0, 1300.0), 1.0, &mut rng);
        let enemies = [enemy];
        let view = TargetView {
            enemies: &enemies,
            ..empty_view()
        };
        let mut b = Bullet::new(Vec2::new(1000.0, 1000.0), Vec2::new(10.0, 0.0), 5.0).homing();
        b.update(&view);
        assert_eq!(b.target, Some(TargetRef::Enemy(7)));
        assert!((b.vel.length() - 10.0).abs() < 1e-4);
        assert!(b.vel.y > 0.0);
    }

    #[test]
    fn test_dead_target_is_dropped() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut enemy = Enemy::new(7, EnemyKind::Grunt, Vec2::new(1000.0, 1100.0), 1.0, &mut rng);
        enemy.hp = 0.0;
        let enemies = [enemy];
        let view = TargetView {
            enemies: &enemies,
            ..empty_view()
        };
        let mut b = Bullet::new(Vec2::new(1000.0, 1000.0), Vec2::new(10.0, 0.0), 5.0)
            .with_target(Some(TargetRef::Enemy(7)));
        b.update(&view);
        assert_eq!(b.target, None);
        assert_eq!(b.vel, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_hit_set() {
        let mut b = Bullet::new(Vec2::ZERO, Vec2::X, 1.0);
        assert!(!b.has_hit(3));
        b.register_hit(3);
        assert!(b.has_hit(3));
        assert!(!b.has_hit(4));
    }
}
