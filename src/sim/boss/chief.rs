//! Wave chief: elite version of a regular enemy kind

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Boss;
use crate::clamp_to_world;
use crate::sim::bullet::Bullet;
use crate::sim::enemy::{Enemy, EnemyKind};
use crate::sim::player::Player;
use crate::sim::vector::{VecExt, dir_to};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affix {
    Vampiric,
    Reactive,
    /// Slows the chief to 80%
    Tether,
}

impl Affix {
    pub const ALL: [Affix; 3] = [Affix::Vampiric, Affix::Reactive, Affix::Tether];

    pub fn label(self) -> &'static str {
        match self {
            Self::Vampiric => "VAMPIRIC",
            Self::Reactive => "REACTIVE",
            Self::Tether => "TETHER",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affixes(u8);

impl Affixes {
    /// Each affix unlocks at a wave threshold and then rolls at 50%
    pub fn roll<R: Rng + ?Sized>(wave: u32, rng: &mut R) -> Self {
        let mut affixes = Self::default();
        let unlocks = [(Affix::Vampiric, 5), (Affix::Reactive, 10), (Affix::Tether, 15)];
        for (affix, min_wave) in unlocks {
            if wave > min_wave && rng.random_bool(0.5) {
                affixes.insert(affix);
            }
        }
        affixes
    }

    pub fn has(self, affix: Affix) -> bool {
        self.0 & (1 << affix as u8) != 0
    }

    pub fn insert(&mut self, affix: Affix) {
        self.0 |= 1 << affix as u8;
    }

    pub fn iter(self) -> impl Iterator<Item = Affix> {
        Affix::ALL.into_iter().filter(move |a| self.has(*a))
    }
}

/// Speeder chief attack cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeederPhase {
    #[default]
    Chase,
    Charge,
    Dash,
    Cooldown,
}

/// Per-kind body multipliers
pub(super) struct ChiefBody {
    pub hp_mult: f32,
    pub speed: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveChief {
    pub kind: EnemyKind,
    pub speed: f32,
    pub affixes: Affixes,
    pub state_timer: u32,
    pub weapon_timer: u32,
    /// Grows in place, harmless, while above zero
    pub spawn_timer: u32,
    /// Latched once HP drops below half
    pub rage: bool,
    pub phase: SpeederPhase,
    pub dash_dir: Vec2,
}

impl WaveChief {
    pub const SPAWN_TICKS: u32 = 60;
    const DASH_REDUCTION: f32 = 0.6;
    const HEAL_RADIUS: f32 = 300.0;

    pub(super) fn body(kind: EnemyKind) -> ChiefBody {
        let (hp_mult, speed, size) = match kind {
            EnemyKind::Grunt => (1.0, 2.5, 45.0),
            EnemyKind::Speeder => (1.2, 5.5, 40.0),
            EnemyKind::Tank => (4.0, 1.0, 70.0),
            EnemyKind::Seeker => (1.2, 2.5, 50.0),
            EnemyKind::Sniper => (0.9, 1.8, 40.0),
            EnemyKind::Turret => (2.5, 0.0, 60.0),
            _ => (1.5, 2.0, 50.0),
        };
        ChiefBody { hp_mult, speed, size }
    }

    pub(super) fn new(kind: EnemyKind, speed: f32, affixes: Affixes) -> Self {
        Self {
            kind,
            speed,
            affixes,
            state_timer: 0,
            weapon_timer: 0,
            spawn_timer: Self::SPAWN_TICKS,
            rage: false,
            phase: SpeederPhase::Chase,
            dash_dir: Vec2::ZERO,
        }
    }

    /// Chief kind for the current wave, picked uniformly from those unlocked
    pub fn pick_kind<R: Rng + ?Sized>(wave: u32, rng: &mut R) -> EnemyKind {
        use rand::seq::IndexedRandom;

        let mut kinds = Vec::with_capacity(7);
        if wave <= 3 {
            kinds.push(EnemyKind::Grunt);
        }
        if wave >= 3 {
            kinds.push(EnemyKind::Speeder);
        }
        if wave > 10 {
            kinds.push(EnemyKind::Tank);
        }
        if wave > 15 {
            kinds.extend([EnemyKind::Seeker, EnemyKind::Sniper]);
        }
        if wave > 20 {
            kinds.extend([EnemyKind::Brute, EnemyKind::Aegis]);
        }
        kinds.choose(rng).copied().unwrap_or(EnemyKind::Speeder)
    }

    pub fn is_spawning(&self) -> bool {
        self.spawn_timer > 0
    }

    fn speeder_step(
        &mut self,
        boss: &mut Boss,
        player: &Player,
        to_player: Vec2,
        dist: f32,
        speed: f32,
    ) {
        match self.phase {
            SpeederPhase::Chase => {
                boss.vel = to_player * speed;
                if dist < 500.0 && self.state_timer > 120 {
                    self.phase = SpeederPhase::Charge;
                    self.state_timer = 0;
                    boss.vel = Vec2::ZERO;
                }
            }
            SpeederPhase::Charge => {
                // Direction is locked on the first charge tick, with a little lead
                if self.state_timer == 1 {
                    self.dash_dir = (player.pos + player.vel * 20.0 - boss.pos).norm();
                }
                boss.vel *= 0.8;
                if self.state_timer > 45 {
                    self.phase = SpeederPhase::Dash;
                    self.state_timer = 0;
                }
            }
            SpeederPhase::Dash => {
                let dash_speed = if self.rage { 30.0 } else { 22.0 };
                boss.vel = self.dash_dir * dash_speed;
                boss.damage_reduction = Self::DASH_REDUCTION;
                if self.state_timer > 25 {
                    self.phase = SpeederPhase::Cooldown;
                    self.state_timer = 0;
                }
            }
            SpeederPhase::Cooldown => {
                boss.vel *= 0.9;
                if self.state_timer > 60 {
                    self.phase = SpeederPhase::Chase;
                    self.state_timer = 0;
                }
            }
        }
    }

    pub(super) fn update(
        &mut self,
        boss: &mut Boss,
        player: &Player,
        enemies: &mut [Enemy],
    ) -> Vec<Bullet> {
        self.spawn_timer = self.spawn_timer.saturating_sub(1);
        self.state_timer += 1;
        self.weapon_timer += 1;

        let to_player = dir_to(boss.pos, player.pos);
        let dist = boss.pos.distance(player.pos);

        if boss.hp < boss.max_hp * 0.5 {
            self.rage = true;
        }

        let mut speed = self.speed;
        if self.affixes.has(Affix::Tether) {
            speed *= 0.8;
        }
        boss.damage_reduction = 0.0;

        if self.is_spawning() {
            boss.vel = Vec2::ZERO;
        } else {
            match self.kind {
                EnemyKind::Speeder => self.speeder_step(boss, player, to_player, dist, speed),
                EnemyKind::Tank => {
                    boss.vel = to_player * speed;
                    if self.state_timer % 60 == 0 {
                        for e in enemies.iter_mut() {
                            if e.pos.distance(boss.pos) < Self::HEAL_RADIUS && e.hp < e.max_hp {
                                e.hp = (e.hp + 5.0).min(e.max_hp);
                            }
                        }
                    }
                }
                EnemyKind::Sniper => {
                    const IDEAL: f32 = 600.0;
                    if dist < IDEAL - 100.0 {
                        boss.vel = to_player * -speed;
                    } else if dist > IDEAL + 100.0 {
                        boss.vel = to_player * speed;
                    } else {
                        boss.vel *= 0.9;
                    }
                }
                _ => boss.vel = to_player * speed,
            }
        }

        boss.pos = clamp_to_world(boss.pos + boss.vel, 50.0);

        let mut bullets = Vec::new();
        let fire_rate = if self.rage { 50 } else { 70 };
        if self.weapon_timer > fire_rate && !self.is_spawning() {
            self.weapon_timer = 0;
            let dmg = (player.max_hp * 0.15).max(10.0);
            match self.kind {
                EnemyKind::Sniper => {
                    let aim = dir_to(boss.pos, player.pos);
                    bullets.push(Bullet::hostile(boss.pos, aim * 18.0, dmg * 2.0, 15.0, 180));
                }
                EnemyKind::Tank => {
                    for i in 0..8 {
                        let angle = TAU / 8.0 * i as f32 + self.state_timer as f32 * 0.05;
                        let vel = Vec2::from_angle(angle) * 6.0;
                        bullets.push(Bullet::hostile(boss.pos, vel, dmg, 20.0, 150));
                    }
                }
                // Speeders are melee only
                EnemyKind::Speeder => {}
                _ => {
                    let aim = dir_to(boss.pos, player.pos + player.vel * 10.0);
                    bullets.push(Bullet::hostile(boss.pos, aim * 10.0, dmg, 14.0, 140));
                }
            }
        }
        bullets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::BossKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn chief_state(boss: &Boss) -> WaveChief {
        match boss.kind {
            BossKind::Chief(c) => c,
            _ => panic!("not a chief"),
        }
    }

    #[test]
    fn test_chief_kinds_by_wave() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(WaveChief::pick_kind(1, &mut rng), EnemyKind::Grunt);
            let k = WaveChief::pick_kind(3, &mut rng);
            assert!(matches!(k, EnemyKind::Grunt | EnemyKind::Speeder));
            assert_eq!(WaveChief::pick_kind(7, &mut rng), EnemyKind::Speeder);
            let k = WaveChief::pick_kind(12, &mut rng);
            assert!(matches!(k, EnemyKind::Speeder | EnemyKind::Tank));
        }
    }

    #[test]
    fn test_affix_thresholds() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(Affixes::roll(5, &mut rng), Affixes::default());
            let a = Affixes::roll(11, &mut rng);
            assert!(!a.has(Affix::Tether));
        }
        let mut a = Affixes::default();
        a.insert(Affix::Tether);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![Affix::Tether]);
    }

    #[test]
    fn test_spawn_animation_holds_still_and_silent() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Player::new();
        let at = player.pos + Vec2::new(300.0, 0.0);
        let mut boss = Boss::chief(1, at, EnemyKind::Grunt, 1, 1, &mut rng);
        let start = boss.pos;
        for _ in 0..59 {
            assert!(boss.update(&player, &mut [], &mut rng).is_empty());
        }
        assert_eq!(boss.pos, start);
        boss.update(&player, &mut [], &mut rng);
        assert!(boss.pos.x < start.x);
    }

    #[test]
    fn test_rage_latches() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Player::new();
        let mut boss = Boss::chief(1, Vec2::splat(1000.0), EnemyKind::Grunt, 1, 1, &mut rng);
        boss.hp = boss.max_hp * 0.4;
        boss.update(&player, &mut [], &mut rng);
        boss.hp = boss.max_hp;
        boss.update(&player, &mut [], &mut rng);
        assert!(chief_state(&boss).rage);
    }

    #[test]
    fn test_speeder_dash_cycle_and_shield() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Player::new();
        let at = player.pos + Vec2::new(2000.0, 0.0);
        let mut boss = Boss::chief(1, at, EnemyKind::Speeder, 1, 1, &mut rng);
        let mut seen_dash = false;
        for _ in 0..1000 {
            let bullets = boss.update(&player, &mut [], &mut rng);
            assert!(bullets.is_empty());
            match chief_state(&boss).phase {
                SpeederPhase::Dash if boss.damage_reduction > 0.0 => {
                    seen_dash = true;
                    assert_eq!(boss.damage_reduction, 0.6);
                    assert!((boss.vel.length() - 22.0).abs() < 1e-3);
                }
                SpeederPhase::Chase | SpeederPhase::Charge => {
                    assert_eq!(boss.damage_reduction, 0.0)
                }
                _ => {}
            }
        }
        assert!(seen_dash);
    }

    #[test]
    fn test_tank_heals_escort_and_fires_ring() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Player::new();
        let at = player.pos + Vec2::new(800.0, 0.0);
        let mut boss = Boss::chief(1, at, EnemyKind::Tank, 1, 1, &mut rng);
        let beside = boss.pos + Vec2::new(50.0, 0.0);
        let mut escort = Enemy::new(5, EnemyKind::Grunt, beside, 1.0, &mut rng);
        escort.hp = 1.0;
        let mut enemies = [escort];
        let mut ring = 0;
        for _ in 0..71 {
            ring = ring.max(boss.update(&player, &mut enemies, &mut rng).len());
        }
        assert_eq!(enemies[0].hp, 6.0);
        assert_eq!(ring, 8);
    }

    #[test]
    fn test_sniper_keeps_band() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Player::new();
        let at = player.pos + Vec2::new(300.0, 0.0);
        let mut boss = Boss::chief(1, at, EnemyKind::Sniper, 1, 1, &mut rng);
        for _ in 0..61 {
            boss.update(&player, &mut [], &mut rng);
        }
        assert!(boss.pos.x > player.pos.x + 300.0);
    }
}
