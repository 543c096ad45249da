//! Pairwise interactions and economy payouts
//!
//! Bullets against the player, enemies and bosses; melee contact; pickups;
//! support strikes. Collections are never spliced mid-pass: dead enemies are
//! flagged and compacted at the end of their pass, bosses are rebuilt into
//! a survivor list.

use rand::Rng;

use super::boss::{Boss, minion_reduction};
use super::bullet::{Bullet, TargetRef};
use super::effects::{ParticleKind, Tint};
use super::enemy::{EnemyKind, Neighbor};
use super::events::{GameEvent, SoundCue};
use super::pickup::{Orb, OrbKind};
use super::player::{ActiveSkill, Perk};
use super::skills::trigger_explosion;
use super::spatial::SpatialHash;
use super::state::GameState;
use super::support::Strike;
use super::upgrades::level_up_options;
use super::vector::{VecExt, jitter, random_dir};
use crate::consts::*;

const BOUNCE_RETARGET_RADIUS: f32 = 600.0;

/// Index of every enemy by its slot in `state.enemies`
pub fn build_enemy_hash(hash: &mut SpatialHash<usize>, state: &GameState) {
    hash.clear();
    for (slot, e) in state.enemies.iter().enumerate() {
        hash.insert(e.pos, slot);
    }
}

#[derive(Debug, Clone, Copy)]
enum BossSlot {
    Boss(usize),
    Chief(usize),
}

/// True bosses first, then chiefs
fn boss_slots(state: &GameState) -> Vec<BossSlot> {
    (0..state.bosses.len())
        .map(BossSlot::Boss)
        .chain((0..state.chiefs.len()).map(BossSlot::Chief))
        .collect()
}

fn boss_mut(state: &mut GameState, slot: BossSlot) -> &mut Boss {
    match slot {
        BossSlot::Boss(i) => &mut state.bosses[i],
        BossSlot::Chief(i) => &mut state.chiefs[i],
    }
}

/// Move, cull and resolve every bullet
pub fn resolve_bullets(state: &mut GameState, hash: &SpatialHash<usize>) {
    let mut bullets = std::mem::take(&mut state.bullets);
    bullets.retain_mut(|b| step_bullet(state, hash, b));
    bullets.append(&mut state.bullets);
    state.bullets = bullets;
}

/// Returns whether the bullet survives this tick
fn step_bullet(state: &mut GameState, hash: &SpatialHash<usize>, b: &mut Bullet) -> bool {
    b.update(&state.target_view());
    if b.is_expired() {
        return false;
    }
    if b.enemy {
        return !hit_player(state, b);
    }
    if hit_enemies(state, hash, b) {
        return false;
    }
    !hit_bosses(state, b)
}

fn hit_player(state: &mut GameState, b: &Bullet) -> bool {
    if state.player.pos.distance(b.pos) >= PLAYER_HIT_RADIUS + b.radius {
        return false;
    }
    if !state.hurt_player(b.damage, 15, 10.0) {
        return false;
    }
    state.sound(SoundCue::EnemyHit);
    true
}

/// Returns whether the bullet was used up
fn hit_enemies(state: &mut GameState, hash: &SpatialHash<usize>, b: &mut Bullet) -> bool {
    for slot in hash.query(b.pos) {
        let Some(e) = state.enemies.get(slot) else {
            continue;
        };
        let reach = e.size + b.radius;
        if e.pos.distance_squared(b.pos) >= reach * reach || b.has_hit(e.id) {
            continue;
        }
        if strike_enemy(state, slot, b) {
            return true;
        }
    }
    false
}

fn strike_enemy(state: &mut GameState, slot: usize, b: &mut Bullet) -> bool {
    let (id, pos, kind, killed, big) = {
        let e = &mut state.enemies[slot];
        e.hp -= b.damage;
        if b.knockback > 0.0 {
            e.pos += (e.pos - b.pos).norm() * b.knockback;
        }
        let killed = e.hp <= 0.0;
        (e.id, e.pos, e.kind, killed, killed && e.size > BIG_ENEMY_SIZE)
    };

    if b.crit {
        state.hit_stop = HIT_STOP_CRIT;
    }
    if big {
        state.hit_stop = HIT_STOP_BIG_KILL;
    }
    if killed
        && b.crit
        && state.player.has_perk(Perk::Vampirism)
        && state.player.hp < state.player.max_hp
    {
        state.player.heal(1.0);
        state.player_text(20.0, "+1 HP", Tint::Heal, 16.0);
    }

    b.register_hit(id);
    b.piercing -= 1;
    state.sound(SoundCue::EnemyHit);
    if b.crit {
        state.spawn_particle(b.pos, Tint::Crit, 3.0, 3.0, ParticleKind::Spark);
    }
    let (tint, size) = if b.crit { (Tint::Crit, 20.0) } else { (Tint::Damage, 12.0) };
    state.spawn_text(pos, b.damage.floor().to_string(), tint, size);
    state.burst(pos, Tint::Enemy(kind), 3, 4.0, 3.0);

    if b.blast_radius > 0.0 {
        trigger_explosion(state, b.pos, b.blast_radius, b.damage * 0.5, b.crit);
    }

    if b.bounces > 0 {
        b.bounces -= 1;
        let speed = b.vel.length();
        let mut best = None;
        let mut best_dist = BOUNCE_RETARGET_RADIUS;
        for other in &state.enemies {
            if other.id == id || other.hp <= 0.0 || b.has_hit(other.id) {
                continue;
            }
            let d = b.pos.distance(other.pos);
            if d < best_dist {
                best_dist = d;
                best = Some(other.pos);
            }
        }
        let dir = match best {
            Some(target) => (target - b.pos).norm(),
            None => random_dir(&mut state.rng),
        };
        b.vel = dir * speed;
        state.spawn_particle(b.pos, Tint::White, 2.0, 5.0, ParticleKind::Spark);
        // A bounced bullet always gets another go
        if b.piercing <= 0 {
            b.piercing = 1;
        }
        false
    } else {
        b.piercing <= 0
    }
}

/// Returns whether the bullet was used up
fn hit_bosses(state: &mut GameState, b: &mut Bullet) -> bool {
    for slot in boss_slots(state) {
        let (id, pos, size, monolith, shield) = {
            let boss = boss_mut(state, slot);
            (boss.id, boss.pos, boss.size, boss.is_monolith(), boss.damage_reduction)
        };
        if pos.distance(b.pos) >= size + b.radius || b.has_hit(id) {
            continue;
        }

        let mut damage = b.damage;
        if monolith {
            let reduction = minion_reduction(&state.enemies);
            if reduction > 0.0 {
                damage *= 1.0 - reduction;
                // Heavily shielded hits never read as crits
                if reduction >= 0.5 {
                    b.crit = false;
                }
            }
        }
        if shield > 0.0 {
            damage *= 1.0 - shield;
            if state.rng.random::<f32>() < 0.3 {
                state.spawn_particle(pos, Tint::White, 5.0, 2.0, ParticleKind::Ring);
            }
        }

        {
            let boss = boss_mut(state, slot);
            boss.hp -= damage;
            boss.hit_flash = 5;
        }
        b.register_hit(id);
        b.piercing -= 1;
        state.sound(SoundCue::EnemyHit);
        let tint = if b.crit { Tint::Crit } else { Tint::Damage };
        state.spawn_text(pos, damage.floor().to_string(), tint, 14.0);
        if state.rng.random::<f32>() < 0.5 {
            state.spawn_particle(pos, Tint::White, 4.0, 3.0, ParticleKind::Spark);
        }

        if b.blast_radius > 0.0 {
            trigger_explosion(state, b.pos, b.blast_radius, damage * 0.5, b.crit);
        }
        if b.piercing <= 0 {
            return true;
        }
    }
    false
}

/// Magnetise, expire and collect orbs. Collecting enough XP levels up and
/// queues a `LevelUp` offer.
pub fn collect_orbs(state: &mut GameState) {
    let mut orbs = std::mem::take(&mut state.orbs);
    let player_pos = state.player.pos;
    let magnet = state.player.magnet_radius;

    orbs.retain_mut(|orb| {
        if !orb.update(player_pos, magnet) {
            return false;
        }
        if !orb.touches(player_pos) {
            return true;
        }
        match orb.kind {
            OrbKind::Xp => {
                state.spawn_particle(orb.pos, Tint::Xp, 3.0, 2.0, ParticleKind::Spark);
                state.player.gain_xp(orb.value);
                if state.player.check_level_up() {
                    let options = level_up_options(&state.player, &mut state.rng);
                    state.events.push(GameEvent::LevelUp(options));
                    state.level_up_flash = 0.5;
                    state.ring(state.player.pos, Tint::White, 150.0);
                    state.sound(SoundCue::PowerUp);
                }
            }
            OrbKind::Health => {
                state.spawn_particle(orb.pos, Tint::Health, 3.0, 2.0, ParticleKind::Spark);
                state.player.heal(orb.value);
                state.sound(SoundCue::PowerUp);
                state.player_text(0.0, "+HP", Tint::Heal, 14.0);
            }
        }
        false
    });

    orbs.append(&mut state.orbs);
    state.orbs = orbs;
}

/// Score, loot and combo for the enemy in `slot`. The caller removes it.
fn kill_enemy(state: &mut GameState, slot: usize) {
    let (pos, xp, size, kind) = {
        let e = &state.enemies[slot];
        (e.pos, e.xp_value, e.size, e.kind)
    };
    state.score += u64::from(xp);
    let orb = Orb::new(pos, xp as f32, OrbKind::Xp, &mut state.rng);
    state.orbs.push(orb);

    let mut health_chance = 0.05;
    if state.player.active_skills.contains(&ActiveSkill::BlackHole) {
        health_chance += 0.05;
    }
    if state.rng.random::<f32>() < health_chance {
        let orb = Orb::new(pos, 20.0, OrbKind::Health, &mut state.rng);
        state.orbs.push(orb);
    }

    state.increment_combo(1);

    let pieces = (size / 2.0).min(10.0).ceil() as usize;
    for _ in 0..pieces {
        let speed = 2.0 + state.rng.random::<f32>() * 3.0;
        state.spawn_particle(pos, Tint::Enemy(kind), speed, 3.0, ParticleKind::Spark);
    }
    state.ring(pos, Tint::Enemy(kind), size * 1.5);
}

/// Enemy pass: pay out the dead, run AI, queue spawns, resolve contact
pub fn update_enemies(state: &mut GameState, hash: &SpatialHash<usize>) {
    let speed_mult = if state.time_warp_timer > 0 { TIME_WARP_FACTOR } else { 1.0 };
    let mut dead = vec![false; state.enemies.len()];

    for i in (0..state.enemies.len()).rev() {
        if state.enemies[i].hp <= 0.0 {
            kill_enemy(state, i);
            dead[i] = true;
            continue;
        }

        if !state.enemies[i].pending_spawns.is_empty() {
            let spawns = std::mem::take(&mut state.enemies[i].pending_spawns);
            if state.enemies.len() < MAX_ENEMIES {
                state.pending_spawns.extend(spawns);
            }
        }

        let pos = state.enemies[i].pos;
        let neighbors: Vec<Neighbor> = hash
            .query(pos)
            .into_iter()
            .filter(|&slot| !dead.get(slot).copied().unwrap_or(true))
            .filter_map(|slot| state.enemies.get(slot).map(|n| n.neighbor(slot)))
            .filter(|n| n.hp > 0.0)
            .collect();

        let player_pos = state.player.pos;
        let action = state.enemies[i].update(player_pos, &neighbors, speed_mult, &mut state.rng);
        if let Some((slot, amount)) = action.heal {
            if let Some(target) = state.enemies.get_mut(slot) {
                target.hp = (target.hp + amount).min(target.max_hp);
            }
        }
        if let Some(bullet) = action.bullet {
            state.bullets.push(bullet);
        }

        if enemy_contact(state, i) {
            kill_enemy(state, i);
            dead[i] = true;
        }
    }

    let mut slot = 0;
    state.enemies.retain(|_| {
        let keep = !dead[slot];
        slot += 1;
        keep
    });
}

/// Melee between the player and enemy `i`. Returns `true` if the enemy
/// destroyed itself on impact.
fn enemy_contact(state: &mut GameState, i: usize) -> bool {
    let (pos, size, damage, kind) = {
        let e = &state.enemies[i];
        (e.pos, e.size, e.damage, e.kind)
    };
    if state.player.pos.distance(pos) >= size + PLAYER_HIT_RADIUS {
        return false;
    }

    let dash_damage = state.player.dash_damage;
    if state.player.is_dashing() && dash_damage > 0.0 {
        state.enemies[i].hp -= dash_damage;
        state.spawn_particle(pos, Tint::Dash, 4.0, 4.0, ParticleKind::Spark);
        state.sound(SoundCue::EnemyHit);
        state.spawn_text(pos, dash_damage.to_string(), Tint::Dash, 20.0);
        state.increment_combo(1);
        return false;
    }

    if !state.hurt_player(damage, 20, 15.0) {
        return false;
    }
    state.sound(SoundCue::EnemyHit);

    // Electric speeders burn out on impact, or they would stun-lock the player
    if kind == EnemyKind::ElectricSpeeder {
        state.player.apply_stun(30);
        state.player_text(40.0, "STUN!", Tint::Crit, 20.0);
        state.enemies[i].hp = 0.0;
        state.burst(pos, Tint::Crit, 10, 5.0, 5.0);
        return true;
    }
    false
}

/// Spawn everything queued this tick, within the enemy cap
pub fn flush_pending_spawns(state: &mut GameState) {
    let requests = std::mem::take(&mut state.pending_spawns);
    for req in requests {
        if state.enemies.len() >= MAX_ENEMIES {
            log::trace!("enemy cap reached, dropping {} spawn", req.kind.name());
            continue;
        }
        let id = state.next_entity_id();
        let enemy =
            super::enemy::Enemy::new(id, req.kind, req.pos, req.difficulty_mult, &mut state.rng);
        state.enemies.push(enemy);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossList {
    Chiefs,
    Bosses,
}

fn list_mut(state: &mut GameState, which: BossList) -> &mut Vec<Boss> {
    match which {
        BossList::Chiefs => &mut state.chiefs,
        BossList::Bosses => &mut state.bosses,
    }
}

/// Pay out dead bosses, step the living, drain their queues, resolve contact
pub fn update_boss_list(state: &mut GameState, which: BossList) {
    let list = std::mem::take(list_mut(state, which));
    let mut survivors = Vec::with_capacity(list.len());

    for mut boss in list {
        if boss.hp <= 0.0 {
            boss_defeated(state, &boss);
            continue;
        }

        let origin = boss.pos;
        let bullets = boss.update(&state.player, &mut state.enemies, &mut state.rng);
        if state.time_warp_timer > 0 {
            boss.pos = origin + (boss.pos - origin) * TIME_WARP_FACTOR;
        }
        state.bullets.extend(bullets);
        state.pending_spawns.append(&mut boss.pending_spawns);
        state.area_effects.append(&mut boss.pending_area_effects);

        if boss.leaves_trail() {
            flame_trail(state, &boss);
        }
        boss_contact(state, &mut boss);
        survivors.push(boss);
    }

    let list = list_mut(state, which);
    survivors.append(list);
    *list = survivors;
}

fn boss_defeated(state: &mut GameState, boss: &Boss) {
    log::info!("{} defeated (+{} score)", boss.name(), boss.xp_value);
    state.score += u64::from(boss.xp_value);
    state.screen_shake = 60.0;
    state.sound(SoundCue::Explosion);
    state.ring(boss.pos, Tint::White, 300.0);
    for _ in 0..50 {
        let speed = 8.0 + state.rng.random::<f32>() * 8.0;
        state.spawn_particle(boss.pos, Tint::Boss, speed, 5.0, ParticleKind::Spark);
    }

    let level = state.player.level;
    let count = 5 + (level / 5).min(5);
    let value = 25.0 + level as f32 * 2.0;
    for _ in 0..count {
        let at = boss.pos + jitter(&mut state.rng, 150.0);
        let orb = Orb::new(at, value, OrbKind::Xp, &mut state.rng);
        state.orbs.push(orb);
    }
    let orb = Orb::new(boss.pos, 200.0, OrbKind::Health, &mut state.rng);
    state.orbs.push(orb);
}

/// Exhaust behind a dashing speeder chief
fn flame_trail(state: &mut GameState, boss: &Boss) {
    let backward = -boss.vel.norm();
    for _ in 0..3 {
        let at = boss.pos + backward * (boss.size / 2.0) + jitter(&mut state.rng, 10.0);
        let vel = backward * (5.0 + state.rng.random::<f32>() * 5.0);
        let tint = if state.rng.random_bool(0.5) { Tint::Flame } else { Tint::Crit };
        let p =
            super::effects::Particle::spark(at, tint, 5.0, 4.0, &mut state.rng).with_velocity(vel);
        state.particles.push(p);
    }
}

fn boss_contact(state: &mut GameState, boss: &mut Boss) {
    if state.player.pos.distance(boss.pos) >= boss.size + PLAYER_HIT_RADIUS {
        return;
    }
    let dash_damage = state.player.dash_damage;
    if state.player.is_dashing() && dash_damage > 0.0 {
        boss.hp -= dash_damage;
        boss.hit_flash = 5;
        state.spawn_particle(boss.pos, Tint::Dash, 4.0, 4.0, ParticleKind::Spark);
        state.sound(SoundCue::EnemyHit);
        state.spawn_text(boss.pos, dash_damage.to_string(), Tint::Dash, 20.0);
    } else {
        state.hurt_player(boss.contact_damage, 40, 20.0);
    }
}

/// Apply damage dealt by a special ally
pub fn apply_strikes(state: &mut GameState, strikes: &[Strike]) {
    for strike in strikes {
        match strike.target {
            TargetRef::Enemy(id) => {
                if let Some(e) = state.enemies.iter_mut().find(|e| e.id == id) {
                    e.hp -= strike.damage;
                }
            }
            TargetRef::Boss(id) => {
                let boss = state
                    .bosses
                    .iter_mut()
                    .chain(state.chiefs.iter_mut())
                    .find(|b| b.id == id);
                if let Some(b) = boss {
                    b.hp -= strike.damage;
                    b.hit_flash = 5;
                }
            }
            TargetRef::Player => {}
        }
    }
}

/// Black holes drag and grind everything inside them
pub fn update_area_effects(state: &mut GameState) {
    let mut effects = std::mem::take(&mut state.area_effects);
    for effect in &mut effects {
        if effect.tick() {
            let at = effect.pos + jitter(&mut state.rng, 50.0);
            state.spawn_particle(at, Tint::White, 1.0, 4.0, ParticleKind::Square);
        }
        for e in &mut state.enemies {
            if let Some(pull) = effect.enemy_pull(e.pos) {
                e.pos += pull;
                e.hp -= super::pickup::AreaEffect::DAMAGE_PER_TICK;
            }
        }
        for b in state.bosses.iter_mut().chain(state.chiefs.iter_mut()) {
            if let Some(pull) = effect.boss_pull(b.pos) {
                b.pos += pull;
                b.hp -= super::pickup::AreaEffect::DAMAGE_PER_TICK;
            }
        }
    }
    effects.retain(|e| !e.is_expired());
    effects.append(&mut state.area_effects);
    state.area_effects = effects;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::Enemy;
    use glam::Vec2;

    fn state() -> GameState {
        GameState::new(11, Vec2::new(1280.0, 720.0))
    }

    fn add_enemy(state: &mut GameState, kind: EnemyKind, pos: Vec2) -> usize {
        let id = state.next_entity_id();
        let e = Enemy::new(id, kind, pos, 1.0, &mut state.rng);
        state.enemies.push(e);
        state.enemies.len() - 1
    }

    fn hash_of(state: &GameState) -> SpatialHash<usize> {
        let mut hash = SpatialHash::new(SPATIAL_CELL_SIZE);
        build_enemy_hash(&mut hash, state);
        hash
    }

    #[test]
    fn test_monolith_shield_scenario() {
        let mut s = state();
        let id = s.next_entity_id();
        s.bosses.push(Boss::monolith(id, Vec2::new(1000.0, 1000.0), 15));
        for i in 0..3 {
            add_enemy(&mut s, EnemyKind::MiniMonolith, Vec2::new(3000.0, 500.0 + i as f32 * 100.0));
        }
        let hp = s.bosses[0].hp;
        let mut b = Bullet::new(Vec2::new(1000.0, 1000.0), Vec2::ZERO, 100.0);
        assert!(hit_bosses(&mut s, &mut b));
        assert!((hp - s.bosses[0].hp - 70.0).abs() < 1e-3);
        assert_eq!(s.bosses[0].hit_flash, 5);
    }

    #[test]
    fn test_pierce_limits_distinct_hits() {
        let mut s = state();
        for i in 0..4 {
            add_enemy(&mut s, EnemyKind::Tank, Vec2::new(1000.0 + i as f32 * 5.0, 1000.0));
        }
        let hash = hash_of(&s);
        let hp: Vec<f32> = s.enemies.iter().map(|e| e.hp).collect();
        let mut b = Bullet::new(Vec2::new(1000.0, 1000.0), Vec2::ZERO, 1.0).with_piercing(2);
        assert!(hit_enemies(&mut s, &hash, &mut b));
        let damaged = s.enemies.iter().zip(&hp).filter(|(e, hp)| e.hp < **hp).count();
        assert_eq!(damaged, 2);
        assert_eq!(b.hit_ids.len(), 2);
    }

    #[test]
    fn test_hit_set_blocks_repeat_damage() {
        let mut s = state();
        add_enemy(&mut s, EnemyKind::Tank, Vec2::new(1000.0, 1000.0));
        let hash = hash_of(&s);
        let hp = s.enemies[0].hp;
        let mut b = Bullet::new(Vec2::new(1000.0, 1000.0), Vec2::ZERO, 1.0).with_piercing(5);
        hit_enemies(&mut s, &hash, &mut b);
        hit_enemies(&mut s, &hash, &mut b);
        assert_eq!(s.enemies[0].hp, hp - 1.0);
    }

    #[test]
    fn test_bounce_retargets_and_gifts_pierce() {
        let mut s = state();
        add_enemy(&mut s, EnemyKind::Tank, Vec2::new(1000.0, 1000.0));
        add_enemy(&mut s, EnemyKind::Grunt, Vec2::new(1000.0, 1300.0));
        let hash = hash_of(&s);
        let mut b =
            Bullet::new(Vec2::new(1000.0, 1000.0), Vec2::new(8.0, 0.0), 1.0).with_bounces(1);
        assert!(!hit_enemies(&mut s, &hash, &mut b));
        assert_eq!(b.bounces, 0);
        assert_eq!(b.piercing, 1);
        assert!((b.vel - Vec2::new(0.0, 8.0)).length() < 1e-4);
    }

    #[test]
    fn test_crit_triggers_hit_stop() {
        let mut s = state();
        add_enemy(&mut s, EnemyKind::Tank, Vec2::new(1000.0, 1000.0));
        let hash = hash_of(&s);
        let mut b = Bullet::new(Vec2::new(1000.0, 1000.0), Vec2::ZERO, 1.0).with_crit(true);
        hit_enemies(&mut s, &hash, &mut b);
        assert_eq!(s.hit_stop, HIT_STOP_CRIT);
    }

    #[test]
    fn test_kill_pays_out_and_compacts() {
        let mut s = state();
        let slot = add_enemy(&mut s, EnemyKind::Grunt, Vec2::new(500.0, 500.0));
        add_enemy(&mut s, EnemyKind::Grunt, Vec2::new(3500.0, 3500.0));
        let xp = s.enemies[slot].xp_value;
        s.enemies[slot].hp = 0.0;
        let hash = hash_of(&s);
        update_enemies(&mut s, &hash);
        assert_eq!(s.enemies.len(), 1);
        assert_eq!(s.score, u64::from(xp));
        assert_eq!(s.combo, 1);
        assert!(s.orbs.iter().any(|o| o.kind == OrbKind::Xp && o.value == xp as f32));
    }

    #[test]
    fn test_electric_speeder_burns_out_on_contact() {
        let mut s = state();
        let at = s.player.pos + Vec2::new(5.0, 0.0);
        add_enemy(&mut s, EnemyKind::ElectricSpeeder, at);
        let hash = hash_of(&s);
        let hp = s.player.hp;
        update_enemies(&mut s, &hash);
        assert!(s.enemies.is_empty());
        assert!(s.player.hp < hp);
        assert!(s.player.stun_timer >= 30);
    }

    #[test]
    fn test_enemy_bullet_respects_invulnerability() {
        let mut s = state();
        let mut b = Bullet::hostile(s.player.pos, Vec2::ZERO, 10.0, 5.0, 100);
        s.player.invulnerable = 5;
        assert!(!hit_player(&mut s, &b));
        s.player.invulnerable = 0;
        b.pos = s.player.pos;
        assert!(hit_player(&mut s, &b));
        assert_eq!(s.player.invulnerable, 15);
    }

    #[test]
    fn test_pending_spawns_respect_cap() {
        let mut s = state();
        for _ in 0..MAX_ENEMIES - 1 {
            add_enemy(&mut s, EnemyKind::Grunt, Vec2::splat(100.0));
        }
        for _ in 0..3 {
            s.pending_spawns.push(crate::sim::enemy::SpawnRequest {
                kind: EnemyKind::Swarmer,
                pos: Vec2::splat(200.0),
                difficulty_mult: 1.0,
            });
        }
        flush_pending_spawns(&mut s);
        assert_eq!(s.enemies.len(), MAX_ENEMIES);
        assert!(s.pending_spawns.is_empty());
    }

    #[test]
    fn test_boss_death_drops_loot() {
        let mut s = state();
        s.player.level = 15;
        let id = s.next_entity_id();
        let mut boss = Boss::cursor(id, Vec2::splat(1000.0), 15);
        boss.hp = 0.0;
        s.bosses.push(boss);
        update_boss_list(&mut s, BossList::Bosses);
        assert!(s.bosses.is_empty());
        assert_eq!(s.score, 5000 + 15 * 500);
        let xp_orbs = s.orbs.iter().filter(|o| o.kind == OrbKind::Xp).count();
        assert_eq!(xp_orbs, 8);
        assert!(s.orbs.iter().any(|o| o.kind == OrbKind::Health && o.value == 200.0));
    }

    #[test]
    fn test_xp_orb_triggers_level_up_offer() {
        let mut s = state();
        let at = s.player.pos;
        let orb = Orb::new(at, 60.0, OrbKind::Xp, &mut s.rng);
        s.orbs.push(orb);
        collect_orbs(&mut s);
        assert!(s.orbs.is_empty());
        assert_eq!(s.player.level, 2);
        assert!(s.events.iter().any(|e| matches!(e, GameEvent::LevelUp(opts) if opts.len() == 3)));
    }

    #[test]
    fn test_strikes_hit_by_id() {
        let mut s = state();
        add_enemy(&mut s, EnemyKind::Tank, Vec2::splat(100.0));
        let id = s.enemies[0].id;
        let hp = s.enemies[0].hp;
        apply_strikes(
            &mut s,
            &[
                Strike { target: TargetRef::Enemy(id), damage: 50.0 },
                Strike { target: TargetRef::Enemy(999), damage: 50.0 },
            ],
        );
        assert_eq!(s.enemies[0].hp, hp - 50.0);
    }

    #[test]
    fn test_black_hole_drags_and_expires() {
        let mut s = state();
        add_enemy(&mut s, EnemyKind::Tank, Vec2::new(1100.0, 1000.0));
        let hp = s.enemies[0].hp;
        s.area_effects.push(crate::sim::pickup::AreaEffect::black_hole(Vec2::splat(1000.0)));
        update_area_effects(&mut s);
        assert!(s.enemies[0].pos.x < 1100.0);
        assert_eq!(s.enemies[0].hp, hp - 2.0);
        s.area_effects[0].life = 1;
        update_area_effects(&mut s);
        assert!(s.area_effects.is_empty());
    }
}
