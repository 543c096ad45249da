//! Procedural sound effects
//!
//! The simulation emits `SoundCue`s; an `AudioSink` turns them into sound.
//! `AudioManager` renders every cue into oscillator/noise `Voice`s that a
//! synth backend pulls with `drain_voices`, so nothing here depends on an
//! audio device.

pub use crate::sim::{Intensity, SoundCue};

/// Everything the game tells the audio layer
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
    fn set_intensity(&mut self, intensity: Intensity);
    /// Player hp / max hp, clamped to >= 0
    fn set_health(&mut self, ratio: f32);
    fn set_paused(&mut self, paused: bool);
}

/// Silent sink for tests and headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
    fn set_intensity(&mut self, _intensity: Intensity) {}
    fn set_health(&mut self, _ratio: f32) {}
    fn set_paused(&mut self, _paused: bool) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
    /// White noise; `freq` is ignored
    Noise,
}

/// One scheduled tone with an exponential decay envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub wave: Waveform,
    pub freq: f32,
    /// Frequency to glide to over the duration
    pub slide_to: Option<f32>,
    /// Seconds
    pub duration: f32,
    pub volume: f32,
    /// Seconds from now
    pub delay: f32,
}

impl Voice {
    const fn tone(wave: Waveform, freq: f32, duration: f32, volume: f32) -> Self {
        Self {
            wave,
            freq,
            slide_to: None,
            duration,
            volume,
            delay: 0.0,
        }
    }

    const fn noise(duration: f32, volume: f32) -> Self {
        Self::tone(Waveform::Noise, 0.0, duration, volume)
    }

    const fn slide(mut self, to: f32) -> Self {
        self.slide_to = Some(to);
        self
    }

    const fn at(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }
}

/// Pentatonic step for a combo milestone, rising an octave every 10 up to two
fn combo_pitch(combo: u32) -> f32 {
    const SCALE: [f32; 5] = [261.63, 293.66, 329.63, 392.0, 440.0];
    let step = combo.saturating_sub(1);
    let octave = (step / 10).min(2);
    SCALE[(step % 5) as usize] * (1u32 << octave) as f32
}

/// Voice recipe for a cue, at unit volume
pub fn patch(cue: SoundCue) -> Vec<Voice> {
    use Waveform::*;
    match cue {
        SoundCue::Shoot => vec![
            Voice::tone(Triangle, 450.0, 0.08, 0.08).slide(100.0),
            Voice::noise(0.02, 0.02),
        ],
        SoundCue::EnemyHit => vec![Voice::tone(Square, 150.0, 0.05, 0.05).slide(50.0)],
        SoundCue::Explosion => vec![
            Voice::noise(0.4, 0.5),
            Voice::tone(Sawtooth, 100.0, 0.2, 0.3).slide(10.0),
        ],
        SoundCue::Dash => vec![
            Voice::noise(0.3, 0.2),
            Voice::tone(Sine, 200.0, 0.3, 0.2).slide(600.0),
        ],
        SoundCue::PowerUp => vec![
            Voice::tone(Sine, 440.0, 0.3, 0.2),
            Voice::tone(Sine, 554.0, 0.3, 0.2).at(0.1),
            Voice::tone(Sine, 659.0, 0.6, 0.2).slide(880.0).at(0.2),
        ],
        SoundCue::BossSpawn => vec![
            Voice::tone(Sawtooth, 80.0, 0.8, 0.5).slide(60.0),
            Voice::tone(Sawtooth, 80.0, 0.8, 0.5).slide(60.0).at(0.4),
            Voice::tone(Sawtooth, 80.0, 1.2, 0.5).slide(40.0).at(0.8),
        ],
        SoundCue::GameOver => vec![
            Voice::tone(Sawtooth, 300.0, 0.5, 0.4).slide(100.0),
            Voice::tone(Sawtooth, 250.0, 0.5, 0.4).slide(80.0).at(0.4),
            Voice::tone(Sawtooth, 200.0, 1.0, 0.4).slide(50.0).at(0.8),
        ],
        SoundCue::Combo(n) => {
            let freq = combo_pitch(n);
            vec![
                Voice::tone(Sine, freq, 0.1, 0.1).slide(freq * 1.5),
                Voice::tone(Triangle, freq * 0.5, 0.1, 0.05),
            ]
        }
    }
}

/// Audio manager for the game
#[derive(Debug, Clone)]
pub struct AudioManager {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    paused: bool,
    intensity: Intensity,
    health_ratio: f32,
    queue: Vec<Voice>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    /// Music drops below this health ratio into its danger variation
    pub const DANGER_HEALTH: f32 = 0.3;

    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            paused: false,
            intensity: Intensity::Normal,
            health_ratio: 1.0,
            queue: Vec::new(),
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.queue.clear();
        }
    }

    pub fn toggle_mute(&mut self) {
        self.set_muted(!self.muted);
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    pub fn is_danger(&self) -> bool {
        self.health_ratio < Self::DANGER_HEALTH
    }

    /// Music low-pass cutoff in Hz; muffled while paused
    pub fn music_cutoff(&self) -> f32 {
        if self.paused { 400.0 } else { 22_000.0 }
    }

    /// Voices scheduled since the last call, volume already applied
    pub fn drain_voices(&mut self) -> Vec<Voice> {
        std::mem::take(&mut self.queue)
    }
}

impl AudioSink for AudioManager {
    fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        log::trace!("sfx {cue:?}");
        self.queue.extend(patch(cue).into_iter().map(|mut v| {
            v.volume *= vol;
            v
        }));
    }

    fn set_intensity(&mut self, intensity: Intensity) {
        if intensity != self.intensity {
            log::trace!("music intensity {:?} -> {:?}", self.intensity, intensity);
        }
        self.intensity = intensity;
    }

    fn set_health(&mut self, ratio: f32) {
        self.health_ratio = if ratio.is_finite() { ratio.max(0.0) } else { 1.0 };
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}
