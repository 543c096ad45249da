//! Game state and core simulation types
//!
//! Everything a run needs to resume or replay lives here, including the RNG.
//! Side effects leave the simulation only through `events`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::EntityId;
use super::ally::Ally;
use super::boss::Boss;
use super::bullet::{Bullet, TargetView};
use super::effects::{FloatingText, Particle, ParticleKind, Tint};
use super::enemy::{Enemy, SpawnRequest};
use super::events::{GameEvent, Intensity, SoundCue};
use super::pickup::{AreaEffect, Orb};
use super::player::Player;
use super::support::SupportAlly;
use crate::consts::*;

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Sole source of randomness, cosmetics included
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,

    pub enemies: Vec<Enemy>,
    /// Wave chiefs
    pub chiefs: Vec<Boss>,
    /// True bosses
    pub bosses: Vec<Boss>,
    pub bullets: Vec<Bullet>,
    pub orbs: Vec<Orb>,
    pub area_effects: Vec<AreaEffect>,
    pub allies: Vec<Ally>,
    /// At most one special ally at a time
    pub support: Option<SupportAlly>,
    /// Spawns queued by carriers and bosses, flushed after the enemy pass
    pub pending_spawns: Vec<SpawnRequest>,
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,

    pub score: u64,
    pub combo: u32,
    pub combo_timer: u32,
    pub max_combo: u32,

    /// 1-based
    pub wave: u32,
    pub wave_timer: u32,
    /// A wave chief has been spawned for the current wave
    pub wave_event_active: bool,

    /// Player level that last triggered a true boss
    pub last_boss_level: u32,
    /// Ticks left in the boss cinematic
    pub boss_intro_timer: u32,
    pub pending_boss: Option<Boss>,
    pub boss_spawn_location: Option<Vec2>,

    /// Permanent enemy difficulty bonus from capped upgrades
    pub enemy_buff: f32,
    pub time_warp_timer: u32,
    /// Frame callbacks left to freeze; consumed by the frame driver
    pub hit_stop: u32,
    pub screen_shake: f32,
    /// Top-left of the view in world space
    pub camera: Vec2,
    /// View size in world units, used for spawn distance and camera clamp
    pub viewport: Vec2,
    pub level_up_flash: f32,
    pub global_pulse: f32,
    pub intensity: Intensity,
    /// Live particle budget; never above `MAX_PARTICLES`
    pub particle_cap: usize,
    pub game_over: bool,

    /// Side effects of the current tick; drained by the driver
    #[serde(skip)]
    pub events: Vec<GameEvent>,

    next_id: EntityId,
}

impl GameState {
    pub fn new(seed: u64, viewport: Vec2) -> Self {
        let player = Player::new();
        let camera = player.pos - viewport / 2.0;
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            player,
            enemies: Vec::new(),
            chiefs: Vec::new(),
            bosses: Vec::new(),
            bullets: Vec::new(),
            orbs: Vec::new(),
            area_effects: Vec::new(),
            allies: Vec::new(),
            support: None,
            pending_spawns: Vec::new(),
            particles: Vec::new(),
            texts: Vec::new(),
            score: 0,
            combo: 0,
            combo_timer: 0,
            max_combo: 0,
            wave: 1,
            wave_timer: 0,
            wave_event_active: false,
            last_boss_level: 0,
            boss_intro_timer: 0,
            pending_boss: None,
            boss_spawn_location: None,
            enemy_buff: 0.0,
            time_warp_timer: 0,
            hit_stop: 0,
            screen_shake: 0.0,
            camera,
            viewport,
            level_up_flash: 0.0,
            global_pulse: 0.0,
            intensity: Intensity::Normal,
            particle_cap: MAX_PARTICLES,
            game_over: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID; enemies and bosses share the sequence
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// A true boss is fighting (not counting the intro)
    pub fn is_boss_active(&self) -> bool {
        !self.bosses.is_empty()
    }

    /// Everything bullets and allies may target this tick
    pub fn target_view(&self) -> TargetView<'_> {
        TargetView {
            player_pos: self.player.pos,
            player_hp: self.player.hp,
            enemies: &self.enemies,
            chiefs: &self.chiefs,
            bosses: &self.bosses,
        }
    }

    /// Enemy stat multiplier for spawns in the current wave
    pub fn difficulty_mult(&self) -> f32 {
        1.0 + self.wave as f32 * 0.15 + self.enemy_buff
    }

    pub fn sound(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    pub fn announce(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!("{text}");
        self.events.push(GameEvent::Announce(text));
    }

    pub fn spawn_text(&mut self, pos: Vec2, text: impl Into<String>, tint: Tint, size: f32) {
        let t = FloatingText::new(pos, text, tint, size, &mut self.rng);
        self.texts.push(t);
    }

    /// Text floating above the player, `lift` pixels up
    pub fn player_text(&mut self, lift: f32, text: impl Into<String>, tint: Tint, size: f32) {
        let pos = self.player.pos - Vec2::new(0.0, lift);
        self.spawn_text(pos, text, tint, size);
    }

    pub fn spawn_particle(
        &mut self,
        pos: Vec2,
        tint: Tint,
        speed: f32,
        life: f32,
        kind: ParticleKind,
    ) {
        let p = Particle::new(pos, tint, speed, life, kind, &mut self.rng);
        self.particles.push(p);
    }

    /// `count` sparks at `pos`
    pub fn burst(&mut self, pos: Vec2, tint: Tint, count: usize, speed: f32, life: f32) {
        for _ in 0..count {
            self.spawn_particle(pos, tint, speed, life, ParticleKind::Spark);
        }
    }

    pub fn ring(&mut self, pos: Vec2, tint: Tint, life: f32) {
        self.spawn_particle(pos, tint, 0.0, life, ParticleKind::Ring);
    }

    /// Drop the oldest particles beyond the budget
    pub fn trim_particles(&mut self) {
        let cap = self.particle_cap.min(MAX_PARTICLES);
        if self.particles.len() > cap {
            let excess = self.particles.len() - cap;
            self.particles.drain(..excess);
        }
    }

    pub fn increment_combo(&mut self, amount: u32) {
        self.combo += amount;
        self.combo_timer = COMBO_MAX_TIMER;
        self.max_combo = self.max_combo.max(self.combo);
        if self.combo % COMBO_MILESTONE == 0 {
            let combo = self.combo;
            self.sound(SoundCue::Combo(combo));
            self.player_text(40.0, format!("{combo}x COMBO!"), Tint::Crit, 24.0);
            self.screen_shake = 5.0;
        }
    }

    /// Reset the combo after the player took damage
    pub fn break_combo(&mut self) {
        if self.combo > 0 {
            self.combo = 0;
            self.player_text(30.0, "COMBO BROKEN", Tint::Hurt, 24.0);
            self.events.push(GameEvent::ComboBroken);
        }
    }

    /// Hit the player for `amount` unless invulnerable. Returns whether the
    /// hit landed. Handles invulnerability frames, combo break and death.
    pub fn hurt_player(&mut self, amount: f32, invuln: u32, shake: f32) -> bool {
        if self.player.invulnerable > 0 {
            return false;
        }
        self.player.take_damage(amount);
        self.player.invulnerable = invuln;
        self.screen_shake = shake;
        self.player_text(0.0, format!("-{}", amount.round()), Tint::Hurt, 16.0);
        self.break_combo();
        self.check_game_over();
        true
    }

    /// End the run once HP is gone. Fires at most once.
    pub fn check_game_over(&mut self) {
        if self.player.hp > 0.0 || self.game_over {
            return;
        }
        self.game_over = true;
        log::info!(
            "game over: score {} max combo {} wave {} level {}",
            self.score,
            self.max_combo,
            self.wave,
            self.player.level
        );
        self.sound(SoundCue::GameOver);
        self.events.push(GameEvent::GameOver {
            score: self.score,
            max_combo: self.max_combo,
        });
    }

    /// Take this tick's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
