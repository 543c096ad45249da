//! Frame driver around the simulation
//!
//! `Game` owns the `GameState` and runs it with a fixed-step accumulator:
//! every frame callback adds elapsed wall time, steps the simulation at
//! 60 Hz (at most `MAX_UPDATES_PER_FRAME` times) and renders exactly once.
//! It also owns pause, hit-stop and the level-up pause, and forwards the
//! simulation's events to the injected audio sink and callbacks.

use std::collections::VecDeque;

use glam::Vec2;
use serde::Serialize;

use crate::audio::AudioSink;
use crate::consts::*;
use crate::platform::InputSnapshot;
use crate::renderer::{self, Frame};
use crate::settings::Settings;
use crate::sim::skills::install_upgrade;
use crate::sim::{GameEvent, GameState, LevelUpOption, SpatialHash, TickInput, tick};

/// Notifications for the UI layer. All methods default to no-ops.
pub trait GameCallbacks {
    fn on_game_over(&mut self, _score: u64, _max_combo: u32) {}
    /// The game is paused until `Game::install_upgrade` is called
    fn on_level_up(&mut self, _options: &[LevelUpOption]) {}
    fn on_update_hud(&mut self, _stats: &HudStats) {}
    /// Banner text for elites, bosses and arriving support
    fn on_boss_spawn(&mut self, _announcement: &str) {}
}

/// Callbacks that ignore everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallbacks;

impl GameCallbacks for NoCallbacks {}

/// Per-frame HUD snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudStats {
    pub hp: f32,
    pub max_hp: f32,
    pub score: u64,
    pub level: u32,
    pub xp: f32,
    pub xp_max: f32,
    pub active_skills: Vec<&'static str>,
    pub passive_powers: Vec<&'static str>,
    pub skill_cooldown: u32,
    pub skill_max_cooldown: u32,
    pub dash_cooldown: u32,
    /// Never zero or NaN
    pub dash_max_cooldown: f32,
    pub combo: u32,
    pub combo_timer: u32,
    pub max_combo_timer: u32,
    pub wave: u32,
    pub boss_active: bool,
}

impl HudStats {
    pub fn from_state(state: &GameState) -> Self {
        let p = &state.player;
        Self {
            hp: p.hp,
            max_hp: p.max_hp,
            score: state.score,
            level: p.level,
            xp: p.xp,
            xp_max: p.xp_to_next_level,
            active_skills: p.active_skills.iter().map(|s| s.id()).collect(),
            passive_powers: p.passive_powers.iter().map(|s| s.id()).collect(),
            skill_cooldown: p.skill_cooldown,
            skill_max_cooldown: p.skill_max_cooldown,
            dash_cooldown: p.dash_cooldown,
            dash_max_cooldown: p.hud_dash_max(),
            combo: state.combo,
            combo_timer: state.combo_timer,
            max_combo_timer: COMBO_MAX_TIMER,
            wave: state.wave,
            boss_active: state.is_boss_active(),
        }
    }
}

/// Why `install_upgrade` refused an option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    /// No level-up is waiting for a choice
    NothingOffered,
    /// The option was not part of the current offer
    NotOffered,
}

pub struct Game<C: GameCallbacks = NoCallbacks, A: AudioSink = crate::audio::NullAudio> {
    state: GameState,
    hash: SpatialHash<usize>,
    settings: Settings,
    callbacks: C,
    audio: A,

    running: bool,
    paused: bool,
    autopilot: bool,
    /// Level-up offers waiting for a choice; the front one is on screen
    offers: VecDeque<Vec<LevelUpOption>>,

    last_time: Option<f64>,
    accumulator: f64,
}

impl<C: GameCallbacks, A: AudioSink> Game<C, A> {
    pub fn new(seed: u64, viewport: Vec2, settings: Settings, callbacks: C, audio: A) -> Self {
        let mut state = GameState::new(seed, viewport);
        state.particle_cap = settings.max_particles();
        Self {
            state,
            hash: SpatialHash::new(SPATIAL_CELL_SIZE),
            settings,
            callbacks,
            audio,
            running: false,
            paused: false,
            autopilot: false,
            offers: VecDeque::new(),
            last_time: None,
            accumulator: 0.0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Offer currently waiting for a choice
    pub fn current_offer(&self) -> Option<&[LevelUpOption]> {
        self.offers.front().map(Vec::as_slice)
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.autopilot = on;
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.state.particle_cap = settings.max_particles();
        self.settings = settings;
    }

    /// Begin simulating; `now_ms` is the frame clock's current reading
    pub fn start(&mut self, now_ms: f64) {
        log::info!("run started (seed {})", self.state.seed);
        self.running = true;
        self.paused = false;
        self.last_time = Some(now_ms);
        self.accumulator = 0.0;
    }

    pub fn toggle_pause(&mut self) {
        if !self.offers.is_empty() {
            // Only a choice resumes from a level-up
            return;
        }
        self.set_paused(!self.paused);
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.audio.set_paused(paused);
        // Time spent paused must not flood the accumulator
        self.last_time = None;
        log::debug!("paused: {paused}");
    }

    /// Apply the chosen level-up option and resume (or present the next
    /// queued offer)
    pub fn install_upgrade(&mut self, option: &LevelUpOption) -> Result<(), InstallError> {
        let Some(offer) = self.offers.front() else {
            log::warn!("install_upgrade called with no pending offer");
            return Err(InstallError::NothingOffered);
        };
        if !offer.contains(option) {
            log::warn!("option {option:?} was not offered");
            return Err(InstallError::NotOffered);
        }

        install_upgrade(&mut self.state, option);
        self.offers.pop_front();
        self.flush_events();

        match self.offers.front() {
            Some(next) => self.callbacks.on_level_up(next),
            None => self.set_paused(false),
        }
        Ok(())
    }

    /// Sync the view size with the presentation surface
    pub fn resize(&mut self, viewport: Vec2) {
        self.state.viewport = viewport;
    }

    /// One presentation callback: advance the simulation by elapsed time and
    /// render once
    pub fn frame(&mut self, now_ms: f64, input: &InputSnapshot) -> Frame {
        if input.pause {
            self.toggle_pause();
        }

        let elapsed = match self.last_time {
            Some(last) => (now_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_time = Some(now_ms);

        if self.running && !self.paused {
            if self.state.hit_stop > 0 {
                self.state.hit_stop -= 1;
            } else {
                self.advance(elapsed, input);
            }
        }

        let hud = HudStats::from_state(&self.state);
        self.callbacks.on_update_hud(&hud);
        renderer::draw(&self.state, &self.settings)
    }

    fn advance(&mut self, elapsed: f64, input: &InputSnapshot) {
        self.accumulator = (self.accumulator + elapsed).min(MAX_ACCUMULATOR_MS);

        let mut steps = 0;
        while self.accumulator >= SIM_STEP_MS {
            // Edge-triggered presses only count for the first step
            let tick_input = TickInput {
                move_dir: input.move_dir,
                aim: input.mouse + self.state.camera,
                fire: input.fire,
                dash: input.dash && steps == 0,
                ultimate: input.ultimate && steps == 0,
                autopilot: self.autopilot,
            };
            self.step(&tick_input);
            self.accumulator -= SIM_STEP_MS;
            steps += 1;

            if !self.running || self.paused || steps >= MAX_UPDATES_PER_FRAME {
                self.accumulator = 0.0;
                break;
            }
        }
    }

    /// One fixed simulation step plus event dispatch
    pub fn step(&mut self, input: &TickInput) {
        tick(&mut self.state, &mut self.hash, input);

        let p = &self.state.player;
        self.audio.set_health((p.hp / p.max_hp).max(0.0));
        self.audio.set_intensity(self.state.intensity);
        self.flush_events();
    }

    fn flush_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound(cue) => self.audio.play(cue),
                GameEvent::Announce(text) => self.callbacks.on_boss_spawn(&text),
                GameEvent::LevelUp(options) => {
                    log::debug!(
                        "level {} reached, {} options",
                        self.state.player.level,
                        options.len()
                    );
                    if self.offers.is_empty() {
                        self.callbacks.on_level_up(&options);
                        self.paused = true;
                        self.audio.set_paused(true);
                    }
                    self.offers.push_back(options);
                }
                GameEvent::ComboLost | GameEvent::ComboBroken => {
                    log::trace!("combo reset");
                }
                GameEvent::StatCapped => {
                    log::debug!("enemy buff now {:.1}", self.state.enemy_buff);
                }
                GameEvent::GameOver { score, max_combo } => {
                    self.running = false;
                    self.callbacks.on_game_over(score, max_combo);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioManager, NullAudio};
    use crate::sim::pickup::{Orb, OrbKind};
    use proptest::prelude::*;

    #[derive(Default)]
    struct Recorder {
        game_overs: Vec<(u64, u32)>,
        level_ups: usize,
        banners: Vec<String>,
        huds: usize,
    }

    impl GameCallbacks for Recorder {
        fn on_game_over(&mut self, score: u64, max_combo: u32) {
            self.game_overs.push((score, max_combo));
        }
        fn on_level_up(&mut self, _options: &[LevelUpOption]) {
            self.level_ups += 1;
        }
        fn on_update_hud(&mut self, _stats: &HudStats) {
            self.huds += 1;
        }
        fn on_boss_spawn(&mut self, announcement: &str) {
            self.banners.push(announcement.to_owned());
        }
    }

    fn game() -> Game<Recorder, NullAudio> {
        Game::new(42, Vec2::new(1280.0, 720.0), Settings::default(), Recorder::default(), NullAudio)
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    #[test]
    fn test_steps_follow_elapsed_time() {
        let mut g = game();
        g.start(0.0);
        g.frame(SIM_STEP_MS * 3.5, &idle());
        assert_eq!(g.state().time_ticks, 3);
        // Leftover half step carries into the next frame
        g.frame(SIM_STEP_MS * 4.6, &idle());
        assert_eq!(g.state().time_ticks, 4);
        assert_eq!(g.callbacks().huds, 2);
    }

    #[test]
    fn test_no_steps_before_start() {
        let mut g = game();
        g.frame(1000.0, &idle());
        assert_eq!(g.state().time_ticks, 0);
    }

    #[test]
    fn test_pause_freezes_and_does_not_bank_time() {
        let mut g = game();
        g.start(0.0);
        g.toggle_pause();
        g.frame(5000.0, &idle());
        assert_eq!(g.state().time_ticks, 0);
        g.toggle_pause();
        g.frame(6000.0, &idle());
        assert_eq!(g.state().time_ticks, 0);
        g.frame(6000.0 + SIM_STEP_MS * 2.5, &idle());
        assert_eq!(g.state().time_ticks, 2);
    }

    #[test]
    fn test_hit_stop_skips_stepping() {
        let mut g = game();
        g.start(0.0);
        g.state.hit_stop = 2;
        g.frame(100.0, &idle());
        g.frame(200.0, &idle());
        assert_eq!(g.state().time_ticks, 0);
        assert_eq!(g.state().hit_stop, 0);
    }

    #[test]
    fn test_level_up_pauses_until_install() {
        let mut g = game();
        g.start(0.0);
        let at = g.state.player.pos;
        let orb = Orb::new(at, 60.0, OrbKind::Xp, &mut g.state.rng);
        g.state.orbs.push(orb);
        g.frame(SIM_STEP_MS * 5.5, &idle());

        assert!(g.is_paused());
        assert_eq!(g.state().time_ticks, 1);
        assert_eq!(g.callbacks().level_ups, 1);
        // Pause key cannot skip the choice
        g.toggle_pause();
        assert!(g.is_paused());

        let choice = g.current_offer().map(|o| o[0].clone());
        let choice = choice.expect("offer pending");
        let bogus = LevelUpOption::Upgrade("nope".into());
        assert_eq!(g.install_upgrade(&bogus), Err(InstallError::NotOffered));
        assert_eq!(g.install_upgrade(&choice), Ok(()));
        assert!(!g.is_paused());
        assert_eq!(g.install_upgrade(&choice), Err(InstallError::NothingOffered));
    }

    #[test]
    fn test_game_over_stops_the_run() {
        let mut g = game();
        g.start(0.0);
        g.state.player.hp = 1.0;
        g.state.hurt_player(50.0, 20, 15.0);
        g.frame(SIM_STEP_MS * 2.5, &idle());
        assert!(!g.is_running());
        assert_eq!(g.callbacks().game_overs.len(), 1);
        let ticks = g.state().time_ticks;
        g.frame(1000.0, &idle());
        assert_eq!(g.state().time_ticks, ticks);
    }

    #[test]
    fn test_sounds_reach_audio() {
        let viewport = Vec2::new(800.0, 600.0);
        let mut g = Game::new(1, viewport, Settings::default(), NoCallbacks, AudioManager::new());
        g.start(0.0);
        g.state.increment_combo(10);
        g.frame(SIM_STEP_MS * 1.5, &idle());
        assert!(!g.audio_mut().drain_voices().is_empty());
    }

    #[test]
    fn test_settings_and_resize_reach_state() {
        let mut g = game();
        g.set_settings(Settings::from_preset(crate::settings::QualityPreset::Low));
        assert_eq!(g.state().particle_cap, 50);
        g.resize(Vec2::new(640.0, 480.0));
        assert_eq!(g.state().viewport, Vec2::new(640.0, 480.0));
    }

    #[test]
    fn test_hud_dash_guard() {
        let mut g = game();
        g.state.player.dash_max_cooldown = 0;
        let hud = HudStats::from_state(g.state());
        assert_eq!(hud.dash_max_cooldown, 60.0);
        assert_eq!(hud.max_combo_timer, COMBO_MAX_TIMER);
    }

    proptest! {
        #[test]
        fn prop_accumulator_bounds_steps(elapsed in 0.0f64..1_000_000.0) {
            let mut g = game();
            g.start(0.0);
            g.frame(elapsed, &idle());
            prop_assert!(g.state().time_ticks <= u64::from(MAX_UPDATES_PER_FRAME));
        }
    }
}
