//! Game settings and preferences
//!
//! Persisted separately from high scores through `persistence::Store`.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_PARTICLES;
use crate::persistence::{self, Store};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Live particle budget; the simulation's hard cap always wins
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 50,
            QualityPreset::Medium => 100,
            QualityPreset::High => MAX_PARTICLES,
        }
    }

    /// Whether to draw the background grid
    pub fn grid_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,

    // === Visual Effects ===
    pub screen_shake: bool,
    pub particles: bool,
    /// Level-up and hit flashes
    pub flashes: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            screen_shake: true,
            particles: true,
            flashes: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "settings";

    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if preset == QualityPreset::Low {
            self.flashes = false;
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    pub fn effective_flashes(&self) -> bool {
        self.flashes && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    pub fn load(store: &Store) -> Self {
        store.load_or_default(Self::STORAGE_KEY)
    }

    pub fn save(&self, store: &Store) -> persistence::Result<()> {
        store.save(Self::STORAGE_KEY, self)?;
        log::info!("settings saved");
        Ok(())
    }
}
