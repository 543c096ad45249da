//! The Cursor: fast duelist that cycles orbit, snipe, dash and teleport

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Boss;
use crate::clamp_to_world;
use crate::sim::bullet::Bullet;
use crate::sim::player::Player;
use crate::sim::vector::{VecExt, dir_to, random_dir};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorPhase {
    #[default]
    Orbit,
    Snipe,
    Dasher,
    Teleport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CursorState {
    pub phase: CursorPhase,
    pub state_timer: u32,
    pub snipe_charge: u32,
    pub dash_dir: Vec2,
    /// Where the snipe will land; drawn as the aim line
    pub predicted: Vec2,
}

impl CursorState {
    const IDEAL_DIST: f32 = 600.0;
    const ORBIT_TICKS: u32 = 240;
    const SNIPE_CHARGE: u32 = 60;
    /// Parked here while invisible
    const HIDDEN: Vec2 = Vec2::new(-1000.0, -1000.0);

    fn enter(&mut self, phase: CursorPhase) {
        self.phase = phase;
        self.state_timer = 0;
    }

    pub fn is_hidden(&self) -> bool {
        self.phase == CursorPhase::Teleport && self.state_timer > 20 && self.state_timer < 60
    }

    pub(super) fn update<R: Rng + ?Sized>(
        &mut self,
        boss: &mut Boss,
        player: &Player,
        rng: &mut R,
    ) -> Vec<Bullet> {
        self.state_timer += 1;
        let mut bullets = Vec::new();
        let dist = boss.pos.distance(player.pos);
        let to_player = dir_to(boss.pos, player.pos);

        match self.phase {
            CursorPhase::Orbit => {
                let side = if self.state_timer % 200 > 100 { 1.0 } else { -1.0 };
                let orbit = to_player.perp_left() * side;
                let target = if dist < Self::IDEAL_DIST - 100.0 {
                    to_player * -4.0 + orbit * 2.0
                } else if dist > Self::IDEAL_DIST + 100.0 {
                    to_player * 5.0 + orbit * 2.0
                } else {
                    orbit * 5.0
                };
                boss.vel += (target - boss.vel) * 0.1;

                if self.state_timer % 15 == 0 {
                    bullets.push(Bullet::hostile(boss.pos, to_player * 8.0, 15.0, 12.0, 180));
                }

                if self.state_timer > Self::ORBIT_TICKS {
                    let roll = rng.random::<f32>();
                    self.enter(if roll < 0.4 {
                        CursorPhase::Snipe
                    } else if roll < 0.7 {
                        CursorPhase::Dasher
                    } else {
                        CursorPhase::Teleport
                    });
                }
            }
            CursorPhase::Snipe => {
                boss.vel *= 0.85;
                self.snipe_charge += 1;
                self.predicted = player.pos + player.vel * 30.0;

                if self.snipe_charge > Self::SNIPE_CHARGE {
                    let aim = (self.predicted - boss.pos).norm();
                    bullets.push(Bullet::hostile(boss.pos, aim * 25.0, 60.0, 15.0, 300));
                    boss.vel = aim * -10.0;
                    self.snipe_charge = 0;
                    self.enter(CursorPhase::Orbit);
                }
            }
            CursorPhase::Dasher => {
                if self.state_timer == 1 {
                    self.dash_dir = to_player;
                }
                if self.state_timer < 40 {
                    // Wind up
                    boss.vel = self.dash_dir * -2.0;
                } else if self.state_timer < 60 {
                    boss.vel = self.dash_dir * 35.0;
                    if self.state_timer % 2 == 0 {
                        // Mine left behind
                        bullets.push(Bullet::hostile(boss.pos, Vec2::ZERO, 10.0, 8.0, 300));
                    }
                } else {
                    boss.vel *= 0.9;
                    if self.state_timer > 90 {
                        self.enter(CursorPhase::Orbit);
                    }
                }
            }
            CursorPhase::Teleport => {
                if self.state_timer == 1 {
                    boss.hit_flash = 10;
                }
                if self.is_hidden() {
                    boss.pos = Self::HIDDEN;
                }
                if self.state_timer == 60 {
                    boss.pos = player.pos + random_dir(rng) * 500.0;
                    for i in 0..12 {
                        let angle = i as f32 / 12.0 * TAU;
                        let vel = Vec2::from_angle(angle) * 6.0;
                        bullets.push(Bullet::hostile(boss.pos, vel, 20.0, 10.0, 180));
                    }
                    self.enter(CursorPhase::Orbit);
                }
            }
        }

        boss.pos = clamp_to_world(boss.pos + boss.vel, 100.0);
        bullets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::BossKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn state(boss: &Boss) -> CursorState {
        match boss.kind {
            BossKind::Cursor(c) => c,
            _ => panic!("not the cursor"),
        }
    }

    fn force_phase(boss: &mut Boss, phase: CursorPhase) {
        if let BossKind::Cursor(c) = &mut boss.kind {
            c.enter(phase);
        }
    }

    #[test]
    fn test_orbit_pulses_every_15_ticks() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Player::new();
        let mut boss = Boss::cursor(1, player.pos + Vec2::new(600.0, 0.0), 15);
        let shots: usize = (0..60).map(|_| boss.update(&player, &mut [], &mut rng).len()).sum();
        assert_eq!(shots, 4);
        assert_eq!(state(&boss).phase, CursorPhase::Orbit);
    }

    #[test]
    fn test_orbit_picks_next_attack() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Player::new();
        let mut boss = Boss::cursor(1, player.pos + Vec2::new(600.0, 0.0), 15);
        for _ in 0..241 {
            boss.update(&player, &mut [], &mut rng);
        }
        assert_ne!(state(&boss).phase, CursorPhase::Orbit);
        assert_eq!(state(&boss).state_timer, 0);
    }

    #[test]
    fn test_snipe_fires_one_heavy_shot() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Player::new();
        let mut boss = Boss::cursor(1, player.pos + Vec2::new(600.0, 0.0), 15);
        force_phase(&mut boss, CursorPhase::Snipe);
        let mut shots = Vec::new();
        for _ in 0..61 {
            shots.extend(boss.update(&player, &mut [], &mut rng));
        }
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].damage, 60.0);
        assert_eq!(shots[0].radius, 15.0);
        assert!((shots[0].vel.length() - 25.0).abs() < 1e-3);
        assert!(boss.vel.x > 0.0);
        assert_eq!(state(&boss).phase, CursorPhase::Orbit);
    }

    #[test]
    fn test_teleport_hides_then_ambushes() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Player::new();
        let mut boss = Boss::cursor(1, player.pos + Vec2::new(600.0, 0.0), 15);
        force_phase(&mut boss, CursorPhase::Teleport);
        for _ in 0..30 {
            assert!(boss.update(&player, &mut [], &mut rng).is_empty());
        }
        assert!(state(&boss).is_hidden());
        assert_eq!(boss.pos, Vec2::splat(100.0));
        let mut ring = Vec::new();
        for _ in 30..60 {
            ring.extend(boss.update(&player, &mut [], &mut rng));
        }
        assert_eq!(ring.len(), 12);
        assert!((boss.pos.distance(player.pos) - 500.0).abs() < 50.0);
    }

    #[test]
    fn test_dasher_drops_mines() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Player::new();
        let mut boss = Boss::cursor(1, player.pos + Vec2::new(1200.0, 0.0), 15);
        force_phase(&mut boss, CursorPhase::Dasher);
        let mines: Vec<Bullet> = (0..91)
            .flat_map(|_| boss.update(&player, &mut [], &mut rng))
            .collect();
        assert_eq!(mines.len(), 10);
        assert!(mines.iter().all(|m| m.vel == Vec2::ZERO && m.enemy));
        assert_eq!(state(&boss).phase, CursorPhase::Orbit);
    }
}
