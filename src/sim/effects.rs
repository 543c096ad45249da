//! Cosmetic particles and floating combat text
//!
//! Nothing here feeds back into gameplay. Colours are semantic `Tint`s so
//! the simulation stays free of any palette; the renderer resolves them.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::vector::random_dir;

/// Semantic colour slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tint {
    Player,
    Crit,
    Damage,
    Hurt,
    Heal,
    White,
    Explosion,
    Ember,
    Blast,
    Aura,
    Dash,
    Xp,
    Health,
    Boss,
    Flame,
    Monolith,
    Enemy(EnemyKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Spark,
    Ring,
    Smoke,
    Shockwave,
    Square,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub tint: Tint,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub kind: ParticleKind,
    /// Shockwave end radius
    pub target_size: f32,
}

impl Particle {
    /// Burst particle flying off in a random direction at up to `speed`.
    /// For shockwaves `life` is the final radius instead.
    pub fn new<R: Rng + ?Sized>(
        pos: Vec2,
        tint: Tint,
        speed: f32,
        life: f32,
        kind: ParticleKind,
        rng: &mut R,
    ) -> Self {
        let size = if kind == ParticleKind::Smoke {
            10.0
        } else {
            rng.random::<f32>() * 3.0 + 2.0
        };
        let vel = random_dir(rng) * (rng.random::<f32>() * speed);
        let mut p = Self {
            pos,
            vel,
            tint,
            life,
            max_life: life,
            size,
            kind,
            target_size: 0.0,
        };
        if kind == ParticleKind::Shockwave {
            p.target_size = life;
            p.life = 40.0;
            p.max_life = 40.0;
            p.size = 10.0;
            p.vel = Vec2::ZERO;
        }
        p
    }

    pub fn spark<R: Rng + ?Sized>(
        pos: Vec2,
        tint: Tint,
        speed: f32,
        life: f32,
        rng: &mut R,
    ) -> Self {
        Self::new(pos, tint, speed, life, ParticleKind::Spark, rng)
    }

    /// Expanding ring; `life` doubles as the ring's lifetime in ticks
    pub fn ring<R: Rng + ?Sized>(pos: Vec2, tint: Tint, life: f32, rng: &mut R) -> Self {
        Self::new(pos, tint, 0.0, life, ParticleKind::Ring, rng)
    }

    /// Particle with a fixed velocity instead of a random burst
    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn update(&mut self) {
        self.pos += self.vel;
        self.life -= 1.0;

        match self.kind {
            ParticleKind::Shockwave => {
                self.size += (self.target_size - self.size) * 0.15;
                if self.size > self.target_size * 0.95 {
                    self.life -= 2.0;
                }
            }
            ParticleKind::Ring => {
                self.size += 2.0;
                self.vel = Vec2::ZERO;
            }
            ParticleKind::Smoke => {
                self.vel *= 0.95;
                self.size += 0.5;
            }
            ParticleKind::Spark | ParticleKind::Square => {
                self.vel *= 0.92;
            }
        }
    }

    /// Remaining life as a 0..=1 fraction
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Number or label that pops up and falls with gravity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub vel: Vec2,
    pub text: String,
    pub tint: Tint,
    pub size: f32,
    pub life: i32,
    pub opacity: f32,
}

impl FloatingText {
    pub const LIFE: i32 = 60;
    const FADE_TICKS: i32 = 20;

    pub fn new<R: Rng + ?Sized>(
        pos: Vec2,
        text: impl Into<String>,
        tint: Tint,
        size: f32,
        rng: &mut R,
    ) -> Self {
        let vx = (rng.random::<f32>() - 0.5) * 4.0;
        let vy = -3.0 - rng.random::<f32>() * 3.0;
        Self {
            pos,
            vel: Vec2::new(vx, vy),
            text: text.into(),
            tint,
            size,
            life: Self::LIFE,
            opacity: 1.0,
        }
    }

    pub fn update(&mut self) {
        self.vel.y += 0.2;
        self.pos += self.vel;
        self.vel.x *= 0.95;
        self.life -= 1;
        if self.life < Self::FADE_TICKS {
            self.opacity = self.life.max(0) as f32 / Self::FADE_TICKS as f32;
        }
    }
}
