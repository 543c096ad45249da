//! The player ship: movement, dash, shooting, levelling and status effects

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, TargetRef};
use super::enemy::Enemy;
use super::tick::TickInput;
use super::vector::VecExt;
use crate::consts::*;

/// Build-defining flags granted by synergy and glitch upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Perk {
    /// Crit kills heal 1 HP
    Vampirism,
    /// XP bar drains every tick
    MemoryLeak,
    /// +50% damage taken
    SegFault,
    PlasmaAura,
    StaticFriction,
}

impl Perk {
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perks(u8);

impl Perks {
    pub fn has(self, perk: Perk) -> bool {
        self.0 & perk.bit() != 0
    }

    pub fn insert(&mut self, perk: Perk) {
        self.0 |= perk.bit();
    }
}

/// Skills fired with the ultimate input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveSkill {
    Shockwave,
    Overload,
    TimeWarp,
    MissileSwarm,
    BlackHole,
}

impl ActiveSkill {
    pub fn id(self) -> &'static str {
        match self {
            Self::Shockwave => "shockwave",
            Self::Overload => "overload",
            Self::TimeWarp => "time_warp",
            Self::MissileSwarm => "missile_swarm",
            Self::BlackHole => "black_hole",
        }
    }

    /// Cooldown in ticks
    pub fn cooldown(self) -> u32 {
        match self {
            Self::Shockwave => 300,
            Self::Overload => 600,
            Self::TimeWarp => 900,
            Self::MissileSwarm => 450,
            Self::BlackHole => 900,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassivePower {
    AllyDrone,
    PlasmaAura,
}

impl PassivePower {
    pub fn id(self) -> &'static str {
        match self {
            Self::AllyDrone => "ally_drone",
            Self::PlasmaAura => "plasma_aura",
        }
    }
}

/// What one player update produced
#[derive(Debug, Default)]
pub struct PlayerOutput {
    pub bullets: Vec<Bullet>,
    /// A dash started this tick
    pub dashed: bool,
}

const TRAIL_LENGTH: usize = 8;
const STUN_ON_HIT: u32 = 10;
const STUN_IMMUNITY: u32 = 60;
const REGEN_DELAY: u32 = 180;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub xp: f32,
    pub xp_to_next_level: f32,
    pub level: u32,

    pub speed: f32,
    pub damage: f32,
    /// Ticks between shots
    pub fire_rate: f32,
    /// HP per second once the regen delay has passed
    pub regen: f32,
    pub pickup_range: f32,
    pub crit_chance: f32,
    pub crit_mult: f32,

    pub projectiles: u32,
    pub piercing: i32,
    pub bullet_speed: f32,
    pub bullet_size: f32,
    pub bullet_life: i32,
    pub knockback: f32,
    pub bullet_bounces: u32,
    pub bullet_homing: bool,
    pub blast_radius: f32,

    pub xp_mult: f32,
    /// Added to the base orb magnet radius
    pub magnet_radius: f32,

    pub last_shot: u32,
    pub regen_timer: u32,

    pub dash_cooldown: u32,
    pub dash_cooldown_mult: f32,
    pub dash_max_cooldown: u32,
    pub dash_duration: u32,
    pub dash_invuln_duration: u32,
    pub dash_damage: f32,

    pub perks: Perks,
    pub active_skills: Vec<ActiveSkill>,
    pub passive_powers: Vec<PassivePower>,
    pub skill_cooldown: u32,
    pub skill_max_cooldown: u32,

    pub invulnerable: u32,
    pub overload_timer: u32,
    pub stun_timer: u32,
    pub slow_timer: u32,
    pub stun_cooldown: u32,

    #[serde(skip)]
    pub trail: Vec<Vec2>,
    pub rotation: f32,
    pub recoil: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::splat(WORLD_SIZE / 2.0),
            vel: Vec2::ZERO,
            hp: 100.0,
            max_hp: 100.0,
            xp: 0.0,
            xp_to_next_level: 100.0,
            level: 1,
            speed: BASE_SPEED,
            damage: 10.0,
            fire_rate: 12.0,
            regen: 0.0,
            pickup_range: 100.0,
            crit_chance: 0.05,
            crit_mult: 1.5,
            projectiles: 1,
            piercing: 1,
            bullet_speed: 12.0,
            bullet_size: 4.0,
            bullet_life: 120,
            knockback: 0.0,
            bullet_bounces: 0,
            bullet_homing: false,
            blast_radius: 0.0,
            xp_mult: 1.0,
            magnet_radius: 0.0,
            last_shot: 0,
            regen_timer: 0,
            dash_cooldown: 0,
            dash_cooldown_mult: 1.0,
            dash_max_cooldown: 180,
            dash_duration: 15,
            dash_invuln_duration: 20,
            dash_damage: 0.0,
            perks: Perks::default(),
            active_skills: Vec::new(),
            passive_powers: Vec::new(),
            skill_cooldown: 0,
            skill_max_cooldown: 0,
            invulnerable: 0,
            overload_timer: 0,
            stun_timer: 0,
            slow_timer: 0,
            stun_cooldown: 0,
            trail: Vec::with_capacity(TRAIL_LENGTH + 1),
            rotation: 0.0,
            recoil: 0.0,
        }
    }

    /// Full dash cycle length in ticks, after cooldown reduction
    pub fn dash_total_cooldown(&self) -> u32 {
        (self.dash_max_cooldown as f32 * self.dash_cooldown_mult).round() as u32
    }

    /// Dash cycle length for the HUD, never zero
    pub fn hud_dash_max(&self) -> f32 {
        let max = self.dash_max_cooldown as f32 * self.dash_cooldown_mult;
        if max.is_finite() && max > 0.0 { max } else { 60.0 }
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_cooldown > self.dash_total_cooldown().saturating_sub(self.dash_duration)
    }

    pub fn has_perk(&self, perk: Perk) -> bool {
        self.perks.has(perk)
    }

    /// Clamp capped stats; returns `true` if anything was over its cap
    pub fn enforce_caps(&mut self) -> bool {
        let mut overflow = false;
        if self.speed > MAX_PLAYER_SPEED {
            self.speed = MAX_PLAYER_SPEED;
            overflow = true;
        }
        if self.damage > MAX_PLAYER_DAMAGE {
            self.damage = MAX_PLAYER_DAMAGE;
            overflow = true;
        }
        if self.pickup_range > MAX_PICKUP_RANGE {
            self.pickup_range = MAX_PICKUP_RANGE;
            overflow = true;
        }
        overflow
    }

    /// Apply incoming damage, with a short stun unless recently stunned
    pub fn take_damage(&mut self, amount: f32) {
        if self.stun_cooldown == 0 {
            self.stun_timer = STUN_ON_HIT;
            self.stun_cooldown = STUN_IMMUNITY;
        }
        let amount = if self.has_perk(Perk::SegFault) {
            amount * 1.5
        } else {
            amount
        };
        self.hp -= amount;
        self.regen_timer = REGEN_DELAY;
    }

    pub fn apply_stun(&mut self, ticks: u32) {
        self.stun_timer = self.stun_timer.max(ticks);
    }

    pub fn apply_slow(&mut self, ticks: u32) {
        self.slow_timer = self.slow_timer.max(ticks);
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Equip an active skill; the shared cooldown becomes the longest of the set
    /// and the skill is ready at once
    pub fn equip_skill(&mut self, skill: ActiveSkill) {
        if !self.active_skills.contains(&skill) {
            self.active_skills.push(skill);
        }
        self.skill_max_cooldown = self
            .active_skills
            .iter()
            .map(|s| s.cooldown())
            .max()
            .unwrap_or(0);
        self.skill_cooldown = 0;
    }

    pub fn add_passive(&mut self, power: PassivePower) {
        if !self.passive_powers.contains(&power) {
            self.passive_powers.push(power);
        }
    }

    /// XP gain, doubled below level 10
    pub fn gain_xp(&mut self, amount: f32) {
        let mut amount = amount * self.xp_mult;
        if self.level < 10 {
            amount *= 2.0;
        }
        self.xp += amount;
    }

    /// Single-step level check. Excess XP carries over and HP refills.
    pub fn check_level_up(&mut self) -> bool {
        if self.xp < self.xp_to_next_level {
            return false;
        }
        self.level += 1;
        self.xp -= self.xp_to_next_level;
        self.xp_to_next_level = (self.xp_to_next_level * 1.1).floor() + 25.0;
        self.hp = self.max_hp;
        log::debug!("player reached level {}", self.level);
        true
    }

    fn nearest_enemy(&self, enemies: &[Enemy]) -> Option<TargetRef> {
        let mut best = None;
        let mut best_dist = HOMING_ACQUIRE_RADIUS;
        for e in enemies {
            let d = self.pos.distance(e.pos);
            if d < best_dist {
                best_dist = d;
                best = Some(TargetRef::Enemy(e.id));
            }
        }
        best
    }

    fn tick_timers(&mut self) {
        self.stun_timer = self.stun_timer.saturating_sub(1);
        self.slow_timer = self.slow_timer.saturating_sub(1);
        self.stun_cooldown = self.stun_cooldown.saturating_sub(1);

        if self.has_perk(Perk::MemoryLeak) && self.xp > 0.0 {
            self.xp = (self.xp - 0.15).max(0.0);
        }

        if self.regen_timer > 0 {
            self.regen_timer -= 1;
        } else if self.regen > 0.0 && self.hp < self.max_hp {
            self.heal(self.regen / 60.0);
        }

        self.dash_cooldown = self.dash_cooldown.saturating_sub(1);
        self.skill_cooldown = self.skill_cooldown.saturating_sub(1);
        self.overload_timer = self.overload_timer.saturating_sub(1);
        if self.recoil > 0.0 {
            self.recoil *= 0.8;
        }
        self.invulnerable = self.invulnerable.saturating_sub(1);
    }

    /// One fixed step of movement and shooting
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        input: &TickInput,
        enemies: &[Enemy],
        rng: &mut R,
    ) -> PlayerOutput {
        self.tick_timers();
        let mut out = PlayerOutput::default();

        let stunned = self.stun_timer > 0;
        let move_dir = if stunned { Vec2::ZERO } else { input.move_dir.norm() };
        let moving = move_dir != Vec2::ZERO;
        let mut top_speed = self.speed;
        if self.slow_timer > 0 {
            top_speed *= 0.5;
        }

        if input.dash && self.dash_cooldown == 0 && moving {
            self.dash_cooldown = self.dash_total_cooldown();
            self.invulnerable = self.dash_invuln_duration;
            self.vel = move_dir * DASH_IMPULSE;
            out.dashed = true;
        }

        let dashing = self.is_dashing();
        if dashing && self.dash_cooldown % 2 == 0 {
            self.trail.push(self.pos);
        }
        if moving && self.vel.length() > 5.0 && rng.random::<f32>() < 0.3 {
            self.trail.push(self.pos);
        }
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.remove(0);
        }

        if moving && !dashing {
            self.vel += move_dir * ACCELERATION;
        }
        self.vel *= FRICTION;
        self.vel = self
            .vel
            .limit(if dashing { DASH_SPEED_LIMIT } else { top_speed });
        self.pos = (self.pos + self.vel).clamp(Vec2::ZERO, Vec2::splat(WORLD_SIZE));

        if !stunned {
            self.last_shot += 1;
            let fire_rate = if self.overload_timer > 0 {
                (self.fire_rate * 0.25).max(2.0)
            } else {
                self.fire_rate
            };

            if input.fire && self.last_shot as f32 >= fire_rate {
                self.last_shot = 0;
                self.recoil = 5.0;
                let aim = (input.aim - self.pos).norm();
                self.vel -= aim * 0.5;
                out.bullets = self.fire_fan(aim, enemies, rng);
            }
        }

        self.rotation += 0.05 + self.vel.length() * 0.02;
        out
    }

    /// Evenly spread `projectiles` shots across a fixed arc around `aim`
    fn fire_fan<R: Rng + ?Sized>(&self, aim: Vec2, enemies: &[Enemy], rng: &mut R) -> Vec<Bullet> {
        let base = aim.y.atan2(aim.x);
        let target = if self.bullet_homing {
            self.nearest_enemy(enemies)
        } else {
            None
        };

        (0..self.projectiles)
            .map(|i| {
                let offset = if self.projectiles > 1 {
                    let step = FAN_SPREAD / (self.projectiles - 1) as f32;
                    -FAN_SPREAD / 2.0 + step * i as f32
                } else {
                    0.0
                };
                let dir = Vec2::from_angle(base + offset);
                let crit = rng.random::<f32>() < self.crit_chance;
                let damage = if crit { self.damage * self.crit_mult } else { self.damage };
                let size = if crit { self.bullet_size * 1.5 } else { self.bullet_size };

                let bullet = Bullet::new(self.pos + dir * 10.0, dir * self.bullet_speed, damage)
                    .with_radius(size)
                    .with_life(self.bullet_life)
                    .with_piercing(self.piercing)
                    .with_target(target)
                    .with_crit(crit)
                    .with_knockback(self.knockback)
                    .with_bounces(self.bullet_bounces)
                    .with_blast(self.blast_radius);
                if self.bullet_homing { bullet.homing() } else { bullet }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn firing_at(aim: Vec2) -> TickInput {
        TickInput {
            aim,
            fire: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_level_up_carries_excess_and_heals() {
        let mut p = Player::new();
        p.level = 12;
        p.hp = 10.0;
        p.gain_xp(130.0);
        assert!(p.check_level_up());
        assert_eq!(p.level, 13);
        assert_eq!(p.xp, 30.0);
        assert_eq!(p.xp_to_next_level, 135.0);
        assert_eq!(p.hp, p.max_hp);
        assert!(!p.check_level_up());
    }

    #[test]
    fn test_early_levels_double_xp() {
        let mut p = Player::new();
        p.gain_xp(10.0);
        assert_eq!(p.xp, 20.0);
        p.level = 10;
        p.xp_mult = 1.5;
        p.gain_xp(10.0);
        assert_eq!(p.xp, 35.0);
    }

    #[test]
    fn test_enforce_caps() {
        let mut p = Player::new();
        assert!(!p.enforce_caps());
        p.damage = 500.0;
        p.speed = 30.0;
        assert!(p.enforce_caps());
        assert_eq!(p.damage, MAX_PLAYER_DAMAGE);
        assert_eq!(p.speed, MAX_PLAYER_SPEED);
        assert!(!p.enforce_caps());
    }

    #[test]
    fn test_take_damage_stun_immunity() {
        let mut p = Player::new();
        p.take_damage(10.0);
        assert_eq!(p.hp, 90.0);
        assert_eq!(p.stun_timer, STUN_ON_HIT);
        assert_eq!(p.regen_timer, REGEN_DELAY);
        p.stun_timer = 0;
        p.take_damage(10.0);
        assert_eq!(p.stun_timer, 0);

        p.perks.insert(Perk::SegFault);
        p.take_damage(10.0);
        assert_eq!(p.hp, 65.0);
    }

    #[test]
    fn test_stun_blocks_movement_and_fire() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = Player::new();
        p.apply_stun(5);
        let input = TickInput {
            move_dir: Vec2::X,
            ..firing_at(Vec2::new(3000.0, 2000.0))
        };
        let out = p.update(&input, &[], &mut rng);
        assert!(out.bullets.is_empty());
        assert_eq!(p.vel, Vec2::ZERO);
    }

    #[test]
    fn test_slow_halves_top_speed() {
        let mut rng = Pcg32::seed_from_u64(1);
        let input = TickInput {
            move_dir: Vec2::X,
            ..Default::default()
        };
        let mut normal = Player::new();
        let mut slowed = Player::new();
        slowed.apply_slow(100);
        slowed.apply_slow(10);
        for _ in 0..60 {
            normal.update(&input, &[], &mut rng);
            slowed.update(&input, &[], &mut rng);
        }
        assert!((normal.vel.length() - normal.speed).abs() < 1e-3);
        assert!((slowed.vel.length() - slowed.speed * 0.5).abs() < 1e-3);
        assert_eq!(slowed.slow_timer, 40);
    }

    #[test]
    fn test_dash_burst_and_invulnerability() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = Player::new();
        let input = TickInput {
            move_dir: Vec2::Y,
            dash: true,
            ..Default::default()
        };
        let out = p.update(&input, &[], &mut rng);
        assert!(out.dashed);
        assert!(p.is_dashing());
        assert_eq!(p.invulnerable, p.dash_invuln_duration);
        assert!(p.vel.y > BASE_SPEED);
        assert_eq!(p.dash_cooldown, 180);

        p.dash_cooldown_mult = 0.5;
        assert_eq!(p.dash_total_cooldown(), 90);
        assert_eq!(p.hud_dash_max(), 90.0);
        p.dash_cooldown_mult = f32::NAN;
        assert_eq!(p.hud_dash_max(), 60.0);
    }

    #[test]
    fn test_fan_spread_even() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = Player::new();
        p.projectiles = 3;
        p.crit_chance = 0.0;
        p.last_shot = 100;
        let out = p.update(&firing_at(p.pos + Vec2::new(100.0, 0.0)), &[], &mut rng);
        assert_eq!(out.bullets.len(), 3);
        let angles: Vec<f32> = out.bullets.iter().map(|b| b.vel.y.atan2(b.vel.x)).collect();
        assert!((angles[0] + 0.1).abs() < 1e-4);
        assert!(angles[1].abs() < 1e-4);
        assert!((angles[2] - 0.1).abs() < 1e-4);
        assert!(out.bullets.iter().all(|b| (b.vel.length() - 12.0).abs() < 1e-4));
    }

    #[test]
    fn test_overload_quarters_fire_interval() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = Player::new();
        p.overload_timer = 100;
        let input = firing_at(p.pos + Vec2::X * 100.0);
        let shots: usize = (0..24)
            .map(|_| p.update(&input, &[], &mut rng).bullets.len())
            .sum();
        assert_eq!(shots, 8);
    }

    #[test]
    fn test_crit_enlarges_bullet() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = Player::new();
        p.crit_chance = 1.0;
        p.last_shot = 100;
        let out = p.update(&firing_at(p.pos + Vec2::X * 100.0), &[], &mut rng);
        let b = &out.bullets[0];
        assert!(b.crit);
        assert_eq!(b.damage, 15.0);
        assert_eq!(b.radius, 6.0);
    }

    #[test]
    fn test_homing_targets_nearest() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = Player::new();
        p.bullet_homing = true;
        p.last_shot = 100;
        let enemies = [
            Enemy::new(1, EnemyKind::Grunt, p.pos + Vec2::new(500.0, 0.0), 1.0, &mut rng),
            Enemy::new(2, EnemyKind::Grunt, p.pos + Vec2::new(0.0, 200.0), 1.0, &mut rng),
        ];
        let out = p.update(&firing_at(p.pos + Vec2::X * 100.0), &enemies, &mut rng);
        assert_eq!(out.bullets[0].target, Some(TargetRef::Enemy(2)));
    }

    #[test]
    fn test_memory_leak_drains_to_zero() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = Player::new();
        p.perks.insert(Perk::MemoryLeak);
        p.xp = 0.2;
        p.update(&TickInput::default(), &[], &mut rng);
        p.update(&TickInput::default(), &[], &mut rng);
        assert_eq!(p.xp, 0.0);
    }

    #[test]
    fn test_equip_skill_takes_longest_cooldown() {
        let mut p = Player::new();
        p.skill_cooldown = 50;
        p.equip_skill(ActiveSkill::Shockwave);
        assert_eq!(p.skill_max_cooldown, 300);
        p.equip_skill(ActiveSkill::TimeWarp);
        p.equip_skill(ActiveSkill::Shockwave);
        assert_eq!(p.active_skills.len(), 2);
        assert_eq!(p.skill_max_cooldown, 900);
        assert_eq!(p.skill_cooldown, 0);
    }

    #[test]
    fn test_perks_bitmask() {
        let mut perks = Perks::default();
        perks.insert(Perk::PlasmaAura);
        assert!(perks.has(Perk::PlasmaAura));
        assert!(!perks.has(Perk::Vampirism));
    }

    proptest! {
        #[test]
        fn prop_level_up_monotonic(gains in prop::collection::vec(0.0f32..400.0, 1..40)) {
            let mut p = Player::new();
            for g in gains {
                let level = p.level;
                let prev_next = p.xp_to_next_level;
                p.gain_xp(g);
                p.hp = 1.0;
                if p.check_level_up() {
                    prop_assert_eq!(p.level, level + 1);
                    prop_assert_eq!(p.xp_to_next_level, (prev_next * 1.1).floor() + 25.0);
                    prop_assert_eq!(p.hp, p.max_hp);
                } else {
                    prop_assert_eq!(p.level, level);
                }
            }
        }
    }
}
