//! Rare special allies that drop in during intense fights
//!
//! At most one is on the field. Each arrives, fights for a fixed time and
//! leaves; damage is reported back as `Strike`s for the orchestrator to
//! apply.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, TargetRef, TargetView};
use super::effects::{Particle, Tint};
use super::events::SoundCue;
use super::vector::{VecExt, dir_to};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportKind {
    /// Chain lightning on up to three targets
    AzBox,
    /// Teleports between targets, slashing each
    WarBlade,
    /// Three-round bursts at the nearest target
    VirtuaCop,
    /// Brawler that slams into crowds
    Bagalis,
}

impl SupportKind {
    /// Per-tick arrival rolls, tried in this order
    pub const SPAWN_TABLE: [(SupportKind, f64); 4] = [
        (SupportKind::AzBox, 0.000025),
        (SupportKind::WarBlade, 0.000025),
        (SupportKind::VirtuaCop, 0.00005),
        (SupportKind::Bagalis, 0.00005),
    ];

    pub fn announcement(self) -> &'static str {
        match self {
            Self::AzBox => "SUPPORT INBOUND: AZBoxThunder",
            Self::WarBlade => "ULTIMATE ALLY: WarBlade",
            Self::VirtuaCop => "BACKUP: VirtuaCop",
            Self::Bagalis => "HEAVY SUPPORT: Bagalis",
        }
    }

    pub fn arrival_cue(self) -> SoundCue {
        match self {
            Self::Bagalis => SoundCue::BossSpawn,
            _ => SoundCue::PowerUp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportPhase {
    Arriving,
    Active,
    Leaving,
}

/// Damage dealt to one target this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub target: TargetRef,
    pub damage: f32,
}

#[derive(Debug, Default)]
pub struct SupportOutput {
    pub strikes: Vec<Strike>,
    pub bullet: Option<Bullet>,
    pub cue: Option<SoundCue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportAlly {
    pub kind: SupportKind,
    pub pos: Vec2,
    pub target_pos: Vec2,
    pub vel: Vec2,
    pub phase: SupportPhase,
    pub timer: u32,
    pub rotation: f32,
    pub fire_timer: u32,
    pub burst_count: u32,
    pub finished: bool,
    /// Lightning endpoints from the last zap
    #[serde(skip)]
    pub zaps: Vec<Vec2>,
}

impl SupportAlly {
    const AZBOX_DAMAGE: f32 = 50.0;
    const AZBOX_RANGE: f32 = 600.0;
    const BLADE_DAMAGE: f32 = 150.0;
    const COP_DAMAGE: f32 = 35.0;
    const COP_RANGE: f32 = 800.0;
    const SLAM_DAMAGE: f32 = 100.0;
    const BRAWL_CONTACT: f32 = 5.0;
    const BRAWL_RADIUS: f32 = 50.0;

    pub fn new(kind: SupportKind, player_pos: Vec2) -> Self {
        let (pos, target_pos) = match kind {
            SupportKind::AzBox => (player_pos - Vec2::new(0.0, 1000.0), player_pos),
            SupportKind::WarBlade => (player_pos - Vec2::new(0.0, 800.0), player_pos),
            SupportKind::VirtuaCop => (
                player_pos - Vec2::new(0.0, 800.0),
                player_pos + Vec2::new(100.0, -100.0),
            ),
            SupportKind::Bagalis => (player_pos - Vec2::new(0.0, 1000.0), player_pos),
        };
        Self {
            kind,
            pos,
            target_pos,
            vel: Vec2::ZERO,
            phase: SupportPhase::Arriving,
            timer: 0,
            rotation: 0.0,
            fire_timer: 0,
            burst_count: 0,
            finished: false,
            zaps: Vec::new(),
        }
    }

    fn activate(&mut self) {
        self.phase = SupportPhase::Active;
        self.timer = 0;
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        view: &TargetView<'_>,
        particles: &mut Vec<Particle>,
        rng: &mut R,
    ) -> SupportOutput {
        self.timer += 1;
        match self.kind {
            SupportKind::AzBox => self.update_azbox(view, particles, rng),
            SupportKind::WarBlade => self.update_blade(view, particles, rng),
            SupportKind::VirtuaCop => self.update_cop(view),
            SupportKind::Bagalis => self.update_bagalis(view, particles, rng),
        }
    }

    fn update_azbox<R: Rng + ?Sized>(
        &mut self,
        view: &TargetView<'_>,
        particles: &mut Vec<Particle>,
        rng: &mut R,
    ) -> SupportOutput {
        let mut out = SupportOutput::default();
        self.rotation += 0.1;
        match self.phase {
            SupportPhase::Arriving => {
                let diff = self.target_pos - self.pos;
                self.pos += diff * 0.1;
                if diff.length() < 10.0 {
                    self.activate();
                    for _ in 0..20 {
                        particles.push(Particle::spark(self.pos, Tint::Crit, 10.0, 5.0, rng));
                    }
                }
            }
            SupportPhase::Active => {
                self.pos.y += (self.timer as f32 * 0.1).sin() * 2.0;
                if self.timer % 5 == 0 {
                    let mut targets: Vec<(TargetRef, Vec2)> = view
                        .hostiles()
                        .filter(|(_, p)| p.distance(self.pos) < Self::AZBOX_RANGE)
                        .collect();
                    targets.shuffle(rng);
                    targets.truncate(3);
                    self.zaps = targets.iter().map(|(_, p)| *p).collect();
                    out.strikes = targets
                        .into_iter()
                        .map(|(target, _)| Strike { target, damage: Self::AZBOX_DAMAGE })
                        .collect();
                    if rng.random::<f32>() < 0.3 {
                        out.cue = Some(SoundCue::Dash);
                    }
                } else {
                    self.zaps.clear();
                }
                if self.timer > 900 {
                    self.phase = SupportPhase::Leaving;
                    self.timer = 0;
                }
            }
            SupportPhase::Leaving => {
                self.pos.y -= 20.0;
                if self.timer > 60 {
                    self.finished = true;
                }
            }
        }
        out
    }

    fn update_blade<R: Rng + ?Sized>(
        &mut self,
        view: &TargetView<'_>,
        particles: &mut Vec<Particle>,
        rng: &mut R,
    ) -> SupportOutput {
        use rand::seq::IndexedRandom;

        let mut out = SupportOutput::default();
        self.rotation += 0.5;
        match self.phase {
            SupportPhase::Arriving => {
                self.pos += (self.target_pos - self.pos) * 0.1;
                if self.pos.distance(self.target_pos) < 20.0 {
                    self.activate();
                    out.cue = Some(SoundCue::Dash);
                }
            }
            SupportPhase::Active => {
                if self.timer % 15 == 0 {
                    let targets: Vec<(TargetRef, Vec2)> = view.hostiles().collect();
                    if let Some(&(target, to)) = targets.choose(rng) {
                        let path = to - self.pos;
                        for i in 0..5 {
                            let at = self.pos + path * (i as f32 / 5.0);
                            particles.push(Particle::spark(at, Tint::Damage, 0.0, 20.0, rng));
                        }
                        self.pos = to;
                        out.strikes.push(Strike { target, damage: Self::BLADE_DAMAGE });
                        out.cue = Some(SoundCue::EnemyHit);
                        particles.push(Particle::spark(to, Tint::White, 5.0, 5.0, rng));
                    }
                }
                if self.timer > 600 {
                    self.phase = SupportPhase::Leaving;
                }
            }
            SupportPhase::Leaving => {
                self.pos.y -= 30.0;
                if self.timer > 650 {
                    self.finished = true;
                }
            }
        }
        out
    }

    fn update_cop(&mut self, view: &TargetView<'_>) -> SupportOutput {
        let mut out = SupportOutput::default();
        self.rotation += 0.05;
        let t = self.timer as f32 * 0.02;
        let ideal = view.player_pos + Vec2::new(t.cos(), t.sin()) * 120.0;

        match self.phase {
            SupportPhase::Arriving => {
                self.pos += (ideal - self.pos) * 0.05;
                if self.pos.distance(ideal) < 50.0 {
                    self.activate();
                }
            }
            SupportPhase::Active => {
                self.pos += (ideal - self.pos) * 0.1;
                self.fire_timer += 1;
                if self.fire_timer > 40 {
                    if self.fire_timer % 5 == 0 && self.burst_count < 3 {
                        self.burst_count += 1;
                        if let Some((_, to)) = view.nearest_hostile(self.pos, Self::COP_RANGE) {
                            let vel = dir_to(self.pos, to) * 15.0;
                            out.bullet = Some(
                                Bullet::new(self.pos, vel, Self::COP_DAMAGE)
                                    .with_radius(6.0)
                                    .with_life(100)
                                    .with_piercing(2),
                            );
                            out.cue = Some(SoundCue::Shoot);
                        }
                    }
                    if self.burst_count >= 3 {
                        self.burst_count = 0;
                        self.fire_timer = 0;
                    }
                }
                if self.timer > 1200 {
                    self.phase = SupportPhase::Leaving;
                }
            }
            SupportPhase::Leaving => {
                self.pos.y -= 15.0;
                if self.timer > 1260 {
                    self.finished = true;
                }
            }
        }
        out
    }

    fn update_bagalis<R: Rng + ?Sized>(
        &mut self,
        view: &TargetView<'_>,
        particles: &mut Vec<Particle>,
        rng: &mut R,
    ) -> SupportOutput {
        let mut out = SupportOutput::default();
        match self.phase {
            SupportPhase::Arriving => {
                self.pos.y += 25.0;
                if self.pos.y >= self.target_pos.y {
                    self.activate();
                    for _ in 0..30 {
                        particles.push(Particle::spark(self.pos, Tint::Heal, 10.0, 8.0, rng));
                    }
                    out.cue = Some(SoundCue::Explosion);
                }
            }
            SupportPhase::Active => {
                if self.timer % 60 == 0 {
                    self.vel = view
                        .nearest_hostile(self.pos, 600.0)
                        .map_or(Vec2::ZERO, |(_, to)| (to - self.pos).norm() * 15.0);
                }
                self.pos += self.vel;
                self.vel *= 0.9;

                let slamming = self.vel.length() > 5.0;
                for (target, at) in view.hostiles() {
                    if at.distance(self.pos) < Self::BRAWL_RADIUS {
                        let mut damage = Self::BRAWL_CONTACT;
                        if slamming {
                            damage += Self::SLAM_DAMAGE;
                            particles.push(Particle::spark(at, Tint::Ember, 5.0, 5.0, rng));
                        }
                        out.strikes.push(Strike { target, damage });
                    }
                }
                if self.timer > 1200 {
                    self.phase = SupportPhase::Leaving;
                }
            }
            SupportPhase::Leaving => {
                self.pos.y -= 20.0;
                if self.timer > 1260 {
                    self.finished = true;
                }
            }
        }
        out
    }
}
