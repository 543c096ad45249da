//! Active skills, explosions, the plasma aura and upgrade installation

use glam::Vec2;
use rand::Rng;

use super::ally::Ally;
use super::bullet::Bullet;
use super::effects::{ParticleKind, Tint};
use super::events::{GameEvent, SoundCue};
use super::pickup::AreaEffect;
use super::player::{ActiveSkill, PassivePower, Perk};
use super::state::GameState;
use super::upgrades::{LevelUpOption, Power, upgrade_by_id};
use crate::consts::*;

const SHOCKWAVE_RADIUS: f32 = 500.0;
const OVERLOAD_TICKS: u32 = 300;
const TIME_WARP_TICKS: u32 = 360;
const MISSILE_COUNT: usize = 16;
const DRONE_OVERFLOW_SCORE: u64 = 1000;

/// Blast that hurts every enemy, chief and boss whose body overlaps `radius`
pub fn trigger_explosion(state: &mut GameState, pos: Vec2, radius: f32, damage: f32, crit: bool) {
    let tint = if crit { Tint::Crit } else { Tint::Explosion };
    state.ring(pos, tint, radius * 2.0);
    for _ in 0..10 {
        let speed = 5.0 + state.rng.random::<f32>() * 5.0;
        state.spawn_particle(pos, Tint::Ember, speed, 4.0, ParticleKind::Spark);
    }
    state.sound(SoundCue::Explosion);

    let label = damage.round().to_string();
    let mut hits = Vec::new();
    for e in &mut state.enemies {
        if e.pos.distance(pos) < radius + e.size {
            e.hp -= damage;
            hits.push(e.pos);
        }
    }
    for b in state.bosses.iter_mut().chain(state.chiefs.iter_mut()) {
        if b.pos.distance(pos) < radius + b.size {
            b.hp -= damage;
            hits.push(b.pos);
        }
    }
    for at in hits {
        state.spawn_text(at, label.clone(), Tint::Blast, 14.0);
    }
}

/// Fire every equipped active skill and restart the shared cooldown
pub fn trigger_active_skills(state: &mut GameState, aim: Vec2) {
    state.player.skill_cooldown = state.player.skill_max_cooldown;
    let skills = state.player.active_skills.clone();
    log::debug!("active skills fired: {skills:?}");

    for skill in skills {
        match skill {
            ActiveSkill::Shockwave => {
                let damage = 100.0 + state.player.damage * 3.0;
                let origin = state.player.pos;
                trigger_explosion(state, origin, SHOCKWAVE_RADIUS, damage, true);
                let kind = ParticleKind::Shockwave;
                state.spawn_particle(origin, Tint::Dash, 0.0, SHOCKWAVE_RADIUS, kind);
                state.screen_shake = 20.0;
            }
            ActiveSkill::Overload => {
                state.player.overload_timer = OVERLOAD_TICKS;
                state.sound(SoundCue::PowerUp);
            }
            ActiveSkill::TimeWarp => {
                state.time_warp_timer = TIME_WARP_TICKS;
                state.sound(SoundCue::PowerUp);
            }
            ActiveSkill::MissileSwarm => {
                let origin = state.player.pos;
                let damage = state.player.damage * 2.0;
                for i in 0..MISSILE_COUNT {
                    let angle = i as f32 / MISSILE_COUNT as f32 * std::f32::consts::TAU;
                    let missile = Bullet::new(origin, Vec2::from_angle(angle) * 10.0, damage)
                        .with_radius(6.0)
                        .with_life(240)
                        .with_crit(true)
                        .homing();
                    state.bullets.push(missile);
                }
                state.sound(SoundCue::Shoot);
            }
            ActiveSkill::BlackHole => {
                state.area_effects.push(AreaEffect::black_hole(aim));
                state.sound(SoundCue::PowerUp);
            }
        }
    }
}

/// Plasma aura: chip damage to everything near the player
pub fn apply_plasma_aura(state: &mut GameState) {
    if !state.player.has_perk(Perk::PlasmaAura) {
        return;
    }
    let center = state.player.pos;
    let mut sparks = Vec::new();

    for e in &mut state.enemies {
        if e.pos.distance(center) < AURA_RADIUS {
            e.hp -= AURA_DAMAGE;
            if state.rng.random::<f32>() < 0.1 {
                sparks.push(e.pos);
            }
        }
    }
    for b in state.bosses.iter_mut().chain(state.chiefs.iter_mut()) {
        if b.pos.distance(center) < AURA_RADIUS + b.size {
            b.hp -= AURA_DAMAGE;
            b.hit_flash = 3;
            if state.rng.random::<f32>() < 0.1 {
                sparks.push(b.pos);
            }
        }
    }
    for at in sparks {
        state.spawn_particle(at, Tint::Aura, 2.0, 2.0, ParticleKind::Spark);
    }
}

/// Add an attack drone, or pay out score once the squad is full
pub fn spawn_ally(state: &mut GameState) {
    if state.allies.len() < MAX_DRONES {
        let ally = Ally::new(&state.player, &mut state.rng);
        state.allies.push(ally);
        state.announce("DRONE SUPPORT DEPLOYED");
    } else {
        state.score += DRONE_OVERFLOW_SCORE;
        state.player_text(0.0, "MAX DRONES!", Tint::Crit, 20.0);
    }
}

/// Install the option the player picked from a level-up offer
pub fn install_upgrade(state: &mut GameState, option: &LevelUpOption) {
    match option {
        LevelUpOption::Upgrade(id) => {
            let Some(upgrade) = upgrade_by_id(id) else {
                log::warn!("unknown upgrade id {id:?}, ignoring");
                return;
            };
            log::debug!("installing upgrade {}", upgrade.id);
            (upgrade.apply)(&mut state.player);

            // One buff per install, however many stats clamped
            if state.player.enforce_caps() {
                state.enemy_buff += OVERFLOW_BUFF;
                log::debug!("stat capped, enemy buff now {:.1}", state.enemy_buff);
                state.player_text(80.0, "STAT CAPPED! ENEMIES BUFFED!", Tint::Hurt, 20.0);
                state.sound(SoundCue::BossSpawn);
                state.events.push(GameEvent::StatCapped);
            }
        }
        LevelUpOption::Power(power) => apply_power(state, *power),
    }
}

pub fn apply_power(state: &mut GameState, power: Power) {
    log::debug!("installing power {}", power.id());
    match power {
        Power::Active(skill) => state.player.equip_skill(skill),
        Power::Passive(PassivePower::AllyDrone) => {
            spawn_ally(state);
            state.player.add_passive(PassivePower::AllyDrone);
        }
        Power::Passive(PassivePower::PlasmaAura) => {
            state.player.add_passive(PassivePower::PlasmaAura);
            state.player.perks.insert(Perk::PlasmaAura);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::Boss;
    use crate::sim::enemy::{Enemy, EnemyKind};

    fn state() -> GameState {
        GameState::new(3, Vec2::new(1280.0, 720.0))
    }

    fn enemy_at(state: &mut GameState, pos: Vec2) {
        let id = state.next_entity_id();
        let e = Enemy::new(id, EnemyKind::Tank, pos, 1.0, &mut state.rng);
        state.enemies.push(e);
    }

    #[test]
    fn test_explosion_reaches_body_edge() {
        let mut s = state();
        let size = EnemyKind::Tank.base_stats().size;
        enemy_at(&mut s, Vec2::new(1000.0 + 100.0 + size - 1.0, 1000.0));
        enemy_at(&mut s, Vec2::new(1000.0 + 100.0 + size + 1.0, 1000.0));
        let before: Vec<f32> = s.enemies.iter().map(|e| e.hp).collect();
        trigger_explosion(&mut s, Vec2::splat(1000.0), 100.0, 30.0, false);
        assert_eq!(s.enemies[0].hp, before[0] - 30.0);
        assert_eq!(s.enemies[1].hp, before[1]);
        assert!(s.events.contains(&GameEvent::Sound(SoundCue::Explosion)));
    }

    #[test]
    fn test_explosion_hits_bosses() {
        let mut s = state();
        let id = s.next_entity_id();
        s.bosses.push(Boss::monolith(id, Vec2::new(1200.0, 1000.0), 15));
        let hp = s.bosses[0].hp;
        trigger_explosion(&mut s, Vec2::splat(1000.0), 100.0, 50.0, true);
        assert_eq!(s.bosses[0].hp, hp - 50.0);
    }

    #[test]
    fn test_overflow_buff_once_per_install() {
        let mut s = state();
        s.player.damage = MAX_PLAYER_DAMAGE;
        s.player.speed = MAX_PLAYER_SPEED;
        install_upgrade(&mut s, &LevelUpOption::Upgrade("dmg_1".into()));
        assert_eq!(s.player.damage, MAX_PLAYER_DAMAGE);
        assert!((s.enemy_buff - 0.1).abs() < 1e-6);
        assert!(s.events.contains(&GameEvent::StatCapped));

        install_upgrade(&mut s, &LevelUpOption::Upgrade("xp_1".into()));
        assert!((s.enemy_buff - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_drone_cap_converts_to_score() {
        let mut s = state();
        for _ in 0..4 {
            apply_power(&mut s, Power::Passive(PassivePower::AllyDrone));
        }
        assert_eq!(s.allies.len(), MAX_DRONES);
        assert_eq!(s.score, DRONE_OVERFLOW_SCORE);
        assert_eq!(s.player.passive_powers, vec![PassivePower::AllyDrone]);
    }

    #[test]
    fn test_active_power_is_ready_at_once() {
        let mut s = state();
        apply_power(&mut s, Power::Active(ActiveSkill::TimeWarp));
        assert_eq!(s.player.skill_cooldown, 0);
        assert_eq!(s.player.skill_max_cooldown, 900);
        trigger_active_skills(&mut s, Vec2::ZERO);
        assert_eq!(s.time_warp_timer, TIME_WARP_TICKS);
        assert_eq!(s.player.skill_cooldown, 900);
    }

    #[test]
    fn test_missile_swarm_ring() {
        let mut s = state();
        s.player.equip_skill(ActiveSkill::MissileSwarm);
        trigger_active_skills(&mut s, Vec2::ZERO);
        assert_eq!(s.bullets.len(), MISSILE_COUNT);
        assert!(s.bullets.iter().all(|b| b.homing && b.crit && b.damage == 20.0));
    }

    #[test]
    fn test_black_hole_lands_on_aim() {
        let mut s = state();
        s.player.equip_skill(ActiveSkill::BlackHole);
        trigger_active_skills(&mut s, Vec2::new(300.0, 400.0));
        assert_eq!(s.area_effects.len(), 1);
        assert_eq!(s.area_effects[0].pos, Vec2::new(300.0, 400.0));
    }

    #[test]
    fn test_plasma_aura_needs_perk() {
        let mut s = state();
        let near = s.player.pos + Vec2::new(100.0, 0.0);
        enemy_at(&mut s, near);
        let hp = s.enemies[0].hp;
        apply_plasma_aura(&mut s);
        assert_eq!(s.enemies[0].hp, hp);

        apply_power(&mut s, Power::Passive(PassivePower::PlasmaAura));
        apply_plasma_aura(&mut s);
        assert_eq!(s.enemies[0].hp, hp - AURA_DAMAGE);
    }
}
