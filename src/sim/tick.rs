//! Fixed timestep simulation tick
//!
//! Advances the whole run by one step: wave and boss progression, the
//! player and allies, spawning, then every interaction in a fixed order.

use glam::Vec2;
use rand::Rng;

use super::boss::{Boss, WaveChief};
use super::collision::{
    BossList, apply_strikes, build_enemy_hash, collect_orbs, flush_pending_spawns, resolve_bullets,
    update_area_effects, update_boss_list, update_enemies,
};
use super::bullet::TargetView;
use super::effects::Tint;
use super::enemy::{EnemyKind, SpawnRequest};
use super::events::{GameEvent, Intensity, SoundCue};
use super::skills::{apply_plasma_aura, trigger_active_skills};
use super::spatial::SpatialHash;
use super::state::GameState;
use super::support::{SupportAlly, SupportKind};
use super::vector::{VecExt, dir_to, random_dir};
use crate::clamp_to_world;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement direction; normalised by the player
    pub move_dir: Vec2,
    /// Aim point in world space
    pub aim: Vec2,
    /// Primary fire held
    pub fire: bool,
    /// Dash pressed this tick
    pub dash: bool,
    /// Ultimate pressed this tick
    pub ultimate: bool,
    /// Demo mode: the AI plays instead of the input above
    pub autopilot: bool,
}

const CHIEF_SPAWN_DISTANCE: f32 = 500.0;
const BOSS_SPAWN_DISTANCE: f32 = 600.0;
const INTENSE_ENEMY_COUNT: usize = 80;
const ACTION_ENEMY_COUNT: usize = 40;

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, hash: &mut SpatialHash<usize>, input: &TickInput) {
    if state.game_over {
        return;
    }
    state.time_ticks += 1;

    if state.boss_intro_timer > 0 {
        boss_intro_step(state);
        return;
    }

    state.global_pulse += 0.05;

    let level = state.player.level;
    if level > 0 && level % BOSS_LEVEL_INTERVAL == 0 && state.last_boss_level != level {
        start_boss_intro(state);
        return;
    }

    decay_combo(state);

    if !state.is_boss_active() {
        advance_wave(state);
    }

    state.time_warp_timer = state.time_warp_timer.saturating_sub(1);
    if state.level_up_flash > 0.0 {
        state.level_up_flash -= 0.05;
    }
    state.trim_particles();

    state.intensity = if state.is_boss_active() || state.wave_event_active {
        Intensity::Boss
    } else if state.enemies.len() > ACTION_ENEMY_COUNT {
        Intensity::Action
    } else {
        Intensity::Normal
    };

    build_enemy_hash(hash, state);

    let input = if input.autopilot {
        autopilot_input(state)
    } else {
        input.clone()
    };
    update_player(state, &input);
    update_allies(state);
    follow_camera(state);

    if input.ultimate
        && state.player.skill_cooldown == 0
        && !state.player.active_skills.is_empty()
    {
        trigger_active_skills(state, input.aim);
    }
    apply_plasma_aura(state);
    update_area_effects(state);
    update_support(state);
    maybe_spawn_enemy(state);

    resolve_bullets(state, hash);
    state.particles.retain_mut(|p| {
        p.update();
        p.life > 0.0
    });
    state.texts.retain_mut(|t| {
        t.update();
        t.life > 0
    });
    collect_orbs(state);
    update_enemies(state, hash);
    flush_pending_spawns(state);
    update_boss_list(state, BossList::Chiefs);
    update_boss_list(state, BossList::Bosses);
}

/// Cinematic before a true boss: everything freezes, the arena is wiped
/// partway through and the boss lands at the end
fn boss_intro_step(state: &mut GameState) {
    state.boss_intro_timer -= 1;
    state.screen_shake = 5.0 + (state.time_ticks as f32 * 0.5).sin() * 2.0;

    if state.boss_intro_timer == BOSS_INTRO_WIPE_AT {
        state.enemies.clear();
        state.bullets.clear();
        state.sound(SoundCue::Explosion);
        state.screen_shake = 50.0;
    }

    if state.boss_intro_timer == 0 {
        if let Some(boss) = state.pending_boss.take() {
            log::info!("{} engaged at {:?}", boss.name(), boss.pos);
            state.bosses.push(boss);
        }
        state.boss_spawn_location = None;
        state.intensity = Intensity::Boss;
        return;
    }

    if let Some(at) = state.boss_spawn_location {
        let target = at - state.viewport / 2.0;
        state.camera += (target - state.camera) * 0.05;
    }
}

fn start_boss_intro(state: &mut GameState) {
    let level = state.player.level;
    state.last_boss_level = level;

    let offset = random_dir(&mut state.rng) * BOSS_SPAWN_DISTANCE;
    let pos = clamp_to_world(state.player.pos + offset, 300.0);
    let id = state.next_entity_id();
    let boss = if state.rng.random_bool(0.5) {
        state.announce("WARNING: THE CURSOR");
        Boss::cursor(id, pos, level)
    } else {
        state.announce("WARNING: MONOLITH");
        Boss::monolith(id, pos, level)
    };
    state.sound(SoundCue::BossSpawn);

    state.pending_boss = Some(boss);
    state.boss_spawn_location = Some(pos);
    state.boss_intro_timer = BOSS_INTRO_TICKS;
    state.enemies.clear();
    state.bullets.clear();
    state.screen_shake = 20.0;
}

/// Count the combo down; held at max while a true boss is up
pub fn decay_combo(state: &mut GameState) {
    if state.combo == 0 {
        return;
    }
    if state.is_boss_active() {
        state.combo_timer = COMBO_MAX_TIMER;
        return;
    }
    state.combo_timer = state.combo_timer.saturating_sub(1);
    if state.combo_timer == 0 {
        state.combo = 0;
        state.player_text(50.0, "COMBO LOST", Tint::Hurt, 20.0);
        state.events.push(GameEvent::ComboLost);
    }
}

/// Wave timer and the chief gate
fn advance_wave(state: &mut GameState) {
    if state.wave_timer < WAVE_DURATION {
        state.wave_timer += 1;
    }
    if state.wave_timer < WAVE_DURATION {
        return;
    }

    if !state.wave_event_active {
        spawn_wave_chief(state);
        state.wave_event_active = true;
    } else if state.chiefs.is_empty() {
        state.wave += 1;
        state.wave_timer = 0;
        state.wave_event_active = false;
        log::info!("wave {} start", state.wave);
        state.player_text(100.0, format!("WAVE {} START", state.wave), Tint::Player, 30.0);
    }
}

fn spawn_wave_chief(state: &mut GameState) {
    let kind = WaveChief::pick_kind(state.wave, &mut state.rng);
    let offset = random_dir(&mut state.rng) * CHIEF_SPAWN_DISTANCE;
    let pos = clamp_to_world(state.player.pos + offset, 100.0);
    let id = state.next_entity_id();
    let chief = Boss::chief(id, pos, kind, state.player.level, state.wave, &mut state.rng);
    log::debug!("spawned {} (hp {:.0}) for wave {}", chief.name(), chief.hp, state.wave);

    state.ring(pos, Tint::Boss, 150.0);
    state.chiefs.push(chief);
    state.announce("ELITE HOSTILE DETECTED");
    state.sound(SoundCue::BossSpawn);
}

fn update_player(state: &mut GameState, input: &TickInput) {
    let out = state.player.update(input, &state.enemies, &mut state.rng);
    let pos = state.player.pos;

    if out.dashed {
        state.ring(pos, Tint::Player, 80.0);
        state.burst(pos, Tint::Player, 8, 5.0, 3.0);
        state.screen_shake = 5.0;
        state.sound(SoundCue::Dash);
    }

    if !out.bullets.is_empty() {
        let muzzle = pos + dir_to(pos, input.aim) * 20.0;
        state.burst(muzzle, Tint::Player, 3, 2.0, 2.0);
        state.sound(SoundCue::Shoot);
        state.bullets.extend(out.bullets);
    }
}

fn update_allies(state: &mut GameState) {
    let mut allies = std::mem::take(&mut state.allies);
    for ally in &mut allies {
        ally.sync_stats(&state.player);
        if let Some(b) = ally.update(state.player.pos, &state.target_view()) {
            state.bullets.push(b);
        }
    }
    state.allies = allies;
}

fn follow_camera(state: &mut GameState) {
    let target = state.player.pos - state.viewport / 2.0;
    state.camera += (target - state.camera) * 0.1;
    let max = (Vec2::splat(WORLD_SIZE) - state.viewport).max(Vec2::ZERO);
    state.camera = state.camera.clamp(Vec2::ZERO, max);

    state.screen_shake *= 0.9;
    if state.screen_shake < 0.5 {
        state.screen_shake = 0.0;
    }
}

fn update_support(state: &mut GameState) {
    let intense = state.enemies.len() > INTENSE_ENEMY_COUNT || state.is_boss_active();
    if intense && state.support.is_none() {
        for (kind, chance) in SupportKind::SPAWN_TABLE {
            if state.rng.random_bool(chance) {
                state.support = Some(SupportAlly::new(kind, state.player.pos));
                state.announce(kind.announcement());
                state.sound(kind.arrival_cue());
                break;
            }
        }
    }

    let Some(mut support) = state.support.take() else {
        return;
    };
    // Field borrows keep particles and rng writable
    let view = TargetView {
        player_pos: state.player.pos,
        player_hp: state.player.hp,
        enemies: &state.enemies,
        chiefs: &state.chiefs,
        bosses: &state.bosses,
    };
    let out = support.update(&view, &mut state.particles, &mut state.rng);
    apply_strikes(state, &out.strikes);
    if let Some(b) = out.bullet {
        state.bullets.push(b);
    }
    if let Some(cue) = out.cue {
        state.sound(cue);
    }
    if !support.finished {
        state.support = Some(support);
    }
}

/// Per-tick spawn probability for the current wave
pub fn spawn_chance(wave: u32) -> f32 {
    let chance = 0.005 + 0.015 * (wave as f32 * 2.0).ln();
    chance.min(MAX_SPAWN_CHANCE)
}

fn maybe_spawn_enemy(state: &mut GameState) {
    let can_spawn = !state.is_boss_active()
        && (state.wave_timer < WAVE_DURATION || state.wave_event_active);
    if !can_spawn || state.rng.random::<f32>() >= spawn_chance(state.wave) {
        return;
    }

    let radius = state.viewport.length() / 2.0 + 100.0;
    let pos = clamp_to_world(state.player.pos + random_dir(&mut state.rng) * radius, 50.0);
    let pool = EnemyKind::spawn_pool(state.wave);
    let kind = pool[state.rng.random_range(0..pool.len())];
    state.pending_spawns.push(SpawnRequest {
        kind,
        pos,
        difficulty_mult: state.difficulty_mult(),
    });
}

/// Simple survival AI: kite the nearest threat, sweep up orbs when safe,
/// always shoot
pub fn autopilot_input(state: &GameState) -> TickInput {
    let pos = state.player.pos;
    let view = state.target_view();
    let threat = view.nearest_hostile(pos, 2000.0).map(|(_, at)| at);

    let mut input = TickInput {
        fire: true,
        aim: threat.unwrap_or(pos + Vec2::X),
        ultimate: state.player.skill_cooldown == 0,
        ..Default::default()
    };

    let danger = threat.filter(|at| at.distance(pos) < 250.0);
    input.move_dir = match danger {
        Some(at) => {
            input.dash = at.distance(pos) < 80.0;
            (pos - at).norm()
        }
        None => state
            .orbs
            .iter()
            .min_by(|a, b| a.pos.distance_squared(pos).total_cmp(&b.pos.distance_squared(pos)))
            .map(|orb| dir_to(pos, orb.pos))
            .unwrap_or_else(|| dir_to(pos, Vec2::splat(WORLD_SIZE / 2.0))),
    };
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::Enemy;

    fn state() -> GameState {
        GameState::new(12345, Vec2::new(1280.0, 720.0))
    }

    fn hash() -> SpatialHash<usize> {
        SpatialHash::new(SPATIAL_CELL_SIZE)
    }

    #[test]
    fn test_determinism() {
        let mut state1 = state();
        let mut state2 = state();
        let mut hash1 = hash();
        let mut hash2 = hash();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        for _ in 0..600 {
            tick(&mut state1, &mut hash1, &input);
            tick(&mut state2, &mut hash2, &input);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.enemies.len(), state2.enemies.len());
        for (a, b) in state1.enemies.iter().zip(&state2.enemies) {
            assert_eq!(a.pos, b.pos);
            assert_eq!(a.hp, b.hp);
        }
    }

    #[test]
    fn test_wave_gate() {
        let mut s = state();
        let mut h = hash();
        s.wave_timer = WAVE_DURATION - 1;
        tick(&mut s, &mut h, &TickInput::default());
        assert_eq!(s.chiefs.len(), 1);
        assert!(s.wave_event_active);
        assert_eq!(s.wave, 1);
        assert!(s.events.contains(&GameEvent::Announce("ELITE HOSTILE DETECTED".into())));

        tick(&mut s, &mut h, &TickInput::default());
        assert_eq!(s.chiefs.len(), 1);
        assert_eq!(s.wave, 1);

        s.chiefs[0].hp = 0.0;
        // Payout tick, then the gate opens
        tick(&mut s, &mut h, &TickInput::default());
        tick(&mut s, &mut h, &TickInput::default());
        assert_eq!(s.wave, 2);
        assert_eq!(s.wave_timer, 0);
        assert!(!s.wave_event_active);
    }

    #[test]
    fn test_combo_lifecycle() {
        let mut s = state();
        for _ in 0..10 {
            s.increment_combo(1);
        }
        for _ in 0..COMBO_MAX_TIMER + 5 {
            decay_combo(&mut s);
        }
        assert_eq!(s.combo, 0);
        assert_eq!(s.max_combo, 10);
        let lost = s.events.iter().filter(|e| **e == GameEvent::ComboLost).count();
        assert_eq!(lost, 1);
    }

    #[test]
    fn test_combo_held_during_boss() {
        let mut s = state();
        s.increment_combo(1);
        s.combo_timer = 3;
        let id = s.next_entity_id();
        s.bosses.push(Boss::cursor(id, Vec2::splat(500.0), 15));
        decay_combo(&mut s);
        assert_eq!(s.combo_timer, COMBO_MAX_TIMER);
        assert_eq!(s.combo, 1);
    }

    #[test]
    fn test_boss_intro_wipes_and_spawns() {
        let mut s = state();
        let mut h = hash();
        s.player.level = 15;
        for i in 0..5 {
            let id = s.next_entity_id();
            let at = Vec2::splat(100.0 + i as f32);
            let e = Enemy::new(id, EnemyKind::Grunt, at, 1.0, &mut s.rng);
            s.enemies.push(e);
        }
        tick(&mut s, &mut h, &TickInput::default());
        assert_eq!(s.last_boss_level, 15);
        assert_eq!(s.boss_intro_timer, BOSS_INTRO_TICKS);
        assert!(s.pending_boss.is_some());
        assert!(s.enemies.is_empty());

        for _ in 0..BOSS_INTRO_TICKS {
            tick(&mut s, &mut h, &TickInput::default());
        }
        assert_eq!(s.bosses.len(), 1);
        assert_eq!(s.intensity, Intensity::Boss);

        // Same level never triggers twice
        tick(&mut s, &mut h, &TickInput::default());
        assert_eq!(s.boss_intro_timer, 0);
    }

    #[test]
    fn test_support_ally_strikes_through_tick() {
        let mut s = state();
        let id = s.next_entity_id();
        let near = s.player.pos + Vec2::new(60.0, 0.0);
        let e = Enemy::new(id, EnemyKind::Tank, near, 1.0, &mut s.rng);
        let start_hp = e.hp;
        s.enemies.push(e);
        s.support = Some(SupportAlly::new(SupportKind::AzBox, s.player.pos));

        for _ in 0..100 {
            update_support(&mut s);
        }

        let support = s.support.as_ref().expect("still on the field");
        assert_eq!(support.phase, crate::sim::support::SupportPhase::Active);
        assert!(s.enemies[0].hp <= start_hp - 50.0);
    }

    #[test]
    fn test_spawn_chance_curve() {
        assert!((spawn_chance(1) - (0.005 + 0.015 * 2f32.ln())).abs() < 1e-6);
        assert!(spawn_chance(5) > spawn_chance(2));
        assert_eq!(spawn_chance(100_000), MAX_SPAWN_CHANCE);
    }

    #[test]
    fn test_no_spawns_after_wave_timer_without_chief() {
        let mut s = state();
        s.wave_timer = WAVE_DURATION;
        s.wave_event_active = false;
        for _ in 0..1000 {
            maybe_spawn_enemy(&mut s);
        }
        assert!(s.pending_spawns.is_empty());
    }

    #[test]
    fn test_game_over_halts_ticks() {
        let mut s = state();
        let mut h = hash();
        s.game_over = true;
        tick(&mut s, &mut h, &TickInput::default());
        assert_eq!(s.time_ticks, 0);
    }
}
