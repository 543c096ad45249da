//! Neon Vector headless runner
//!
//! Plays a run on autopilot at a simulated 60 fps, picking the first option
//! at every level-up, then records the result in the high-score store.
//!
//! Usage: `neon-vector [seed] [max-seconds]`

use glam::Vec2;

use neon_vector::audio::AudioManager;
use neon_vector::consts::SIM_STEP_MS;
use neon_vector::persistence::Store;
use neon_vector::platform::InputSnapshot;
use neon_vector::sim::LevelUpOption;
use neon_vector::{Game, GameCallbacks, HighScores, HudStats, Settings};

const DEFAULT_MAX_SECONDS: u64 = 600;

#[derive(Default)]
struct Console {
    result: Option<(u64, u32)>,
    last_wave: u32,
}

impl GameCallbacks for Console {
    fn on_game_over(&mut self, score: u64, max_combo: u32) {
        self.result = Some((score, max_combo));
    }

    fn on_level_up(&mut self, options: &[LevelUpOption]) {
        log::debug!("offered {options:?}");
    }

    fn on_update_hud(&mut self, stats: &HudStats) {
        if stats.wave != self.last_wave {
            self.last_wave = stats.wave;
            log::info!(
                "wave {} | level {} | hp {:.0}/{:.0} | score {}",
                stats.wave,
                stats.level,
                stats.hp,
                stats.max_hp,
                stats.score
            );
        }
    }

    fn on_boss_spawn(&mut self, announcement: &str) {
        log::info!("{announcement}");
    }
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or_else(clock_seed);
    let max_seconds = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_SECONDS);

    let store = Store::from_env();
    let settings = Settings::load(&store);
    let mut scores = HighScores::load(&store);
    log::info!(
        "Neon Vector starting (seed {seed}, best score {}, best combo {})",
        scores.best_score,
        scores.best_combo
    );

    let mut audio = AudioManager::new();
    audio.set_master_volume(settings.master_volume);
    audio.set_sfx_volume(settings.sfx_volume);

    let mut game = Game::new(seed, Vec2::new(1280.0, 720.0), settings, Console::default(), audio);
    game.set_autopilot(true);
    game.start(0.0);

    let input = InputSnapshot::default();
    let frames = max_seconds * 60;
    let mut now = 0.0;
    for _ in 0..frames {
        now += SIM_STEP_MS;
        game.frame(now, &input);
        // Nothing is listening to the synth
        game.audio_mut().drain_voices();

        let pick = game.current_offer().and_then(|o| o.first().cloned());
        if let Some(option) = pick {
            log::info!("level {}: taking {}", game.state().player.level, option.name());
            if let Err(e) = game.install_upgrade(&option) {
                log::warn!("upgrade rejected: {e:?}");
            }
        }
        if !game.is_running() {
            break;
        }
    }

    let state = game.state();
    let (score, max_combo) = game
        .callbacks()
        .result
        .unwrap_or((state.score, state.max_combo));
    println!(
        "seed {seed}: score {score}, max combo {max_combo}, wave {}, level {}, {:.1}s simulated{}",
        state.wave,
        state.player.level,
        state.time_ticks as f64 / 60.0,
        if state.game_over { "" } else { " (time limit)" }
    );

    match scores.record_run(&store, score, max_combo) {
        Ok(records) if records.any() => println!("new record!"),
        Ok(_) => {}
        Err(e) => log::error!("could not save high scores: {e}"),
    }
}
