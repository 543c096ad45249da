//! The Monolith: stationary fortress guarded by minions

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Boss;
use crate::sim::bullet::Bullet;
use crate::sim::enemy::{Enemy, EnemyKind, SpawnRequest};
use crate::sim::pickup::AreaEffect;
use crate::sim::player::Player;
use crate::sim::vector::{dir_to, jitter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonolithPhase {
    #[default]
    Shield,
    Spiral,
    Void,
    Beam,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonolithState {
    pub phase: MonolithPhase,
    pub state_timer: u32,
    pub rotation: f32,
}

const MAX_MINIONS: usize = 4;

fn minion_count(enemies: &[Enemy]) -> usize {
    enemies
        .iter()
        .filter(|e| e.kind == EnemyKind::MiniMonolith && e.hp > 0.0)
        .count()
}

/// Damage fraction the Monolith ignores while its minions live:
/// 10% per minion, capped at 60%
pub fn minion_reduction(enemies: &[Enemy]) -> f32 {
    (minion_count(enemies) as f32 * 0.1).min(0.6)
}

fn ring(
    origin: Vec2,
    count: usize,
    offset: f32,
    speed: f32,
    damage: f32,
    radius: f32,
    life: i32,
) -> impl Iterator<Item = Bullet> {
    (0..count).map(move |i| {
        let angle = i as f32 / count as f32 * TAU + offset;
        Bullet::hostile(origin, Vec2::from_angle(angle) * speed, damage, radius, life)
    })
}

impl MonolithState {
    fn enter(&mut self, phase: MonolithPhase) {
        self.phase = phase;
        self.state_timer = 0;
    }

    pub(super) fn update<R: Rng + ?Sized>(
        &mut self,
        boss: &mut Boss,
        player: &Player,
        enemies: &[Enemy],
        rng: &mut R,
    ) -> Vec<Bullet> {
        self.state_timer += 1;
        self.rotation += 0.01;
        let t = self.state_timer;
        let to_player = dir_to(boss.pos, player.pos);
        let mut bullets = Vec::new();

        match self.phase {
            MonolithPhase::Shield => {
                if minion_count(enemies) < MAX_MINIONS && t % 60 == 0 {
                    boss.pending_spawns.push(SpawnRequest {
                        kind: EnemyKind::MiniMonolith,
                        pos: boss.pos + jitter(rng, 300.0),
                        difficulty_mult: 1.0,
                    });
                }
                if t % 90 == 0 {
                    bullets.extend(ring(boss.pos, 8, self.rotation, 5.0, 20.0, 10.0, 240));
                }
                if t > 600 {
                    self.enter(MonolithPhase::Spiral);
                }
            }
            MonolithPhase::Spiral => {
                self.rotation += 0.05;
                if t % 4 == 0 {
                    bullets.extend(ring(boss.pos, 4, self.rotation, 6.0, 15.0, 8.0, 300));
                }
                if t > 300 {
                    self.enter(MonolithPhase::Void);
                }
            }
            MonolithPhase::Void => {
                if t % 120 == 0 && t < 400 {
                    boss.pending_area_effects
                        .push(AreaEffect::black_hole(player.pos + player.vel * 20.0));
                }
                if t % 30 == 0 {
                    bullets.push(Bullet::hostile(boss.pos, to_player * 10.0, 20.0, 12.0, 180));
                }
                if t > 480 {
                    self.enter(MonolithPhase::Beam);
                }
            }
            MonolithPhase::Beam => {
                if t % 5 == 0 {
                    let beam = Bullet::hostile(boss.pos, to_player * 20.0, 40.0, 6.0, 120);
                    bullets.push(beam.with_piercing(99));
                }
                if t > 180 {
                    self.enter(MonolithPhase::Shield);
                }
            }
        }
        bullets
    }
}
