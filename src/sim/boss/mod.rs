//! Wave chiefs and true bosses
//!
//! Every boss shares the same body (`Boss`) and carries its behaviour in
//! `BossKind`. Bosses never touch the orchestrator's collections: bullets
//! are returned from `update`, enemy spawns and area effects are queued on
//! the boss and drained after it updates.

mod chief;
mod cursor;
mod monolith;

pub use chief::{Affix, Affixes, SpeederPhase, WaveChief};
pub use cursor::{CursorPhase, CursorState};
pub use monolith::{MonolithPhase, MonolithState, minion_reduction};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::EntityId;
use super::bullet::Bullet;
use super::enemy::{Enemy, EnemyKind, SpawnRequest};
use super::pickup::AreaEffect;
use super::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BossKind {
    Chief(WaveChief),
    Cursor(CursorState),
    Monolith(MonolithState),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub size: f32,
    pub contact_damage: f32,
    pub hit_flash: u32,
    pub xp_value: u32,
    /// Fraction of incoming damage ignored this tick
    pub damage_reduction: f32,
    pub pending_spawns: Vec<SpawnRequest>,
    pub pending_area_effects: Vec<AreaEffect>,
    pub kind: BossKind,
}

impl Boss {
    fn with_kind(
        id: EntityId,
        pos: Vec2,
        hp: f32,
        size: f32,
        contact_damage: f32,
        xp_value: u32,
        kind: BossKind,
    ) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            hp,
            max_hp: hp,
            size,
            contact_damage,
            hit_flash: 0,
            xp_value,
            damage_reduction: 0.0,
            pending_spawns: Vec::new(),
            pending_area_effects: Vec::new(),
            kind,
        }
    }

    /// Elite that gates wave progression
    pub fn chief<R: Rng + ?Sized>(
        id: EntityId,
        pos: Vec2,
        kind: EnemyKind,
        player_level: u32,
        wave: u32,
        rng: &mut R,
    ) -> Self {
        let level = player_level as f32;
        let stats = WaveChief::body(kind);
        let hp = (800.0 + level * 60.0) * stats.hp_mult;
        let contact = (15.0 + level * 0.5).min(40.0);
        let chief = WaveChief::new(kind, stats.speed, Affixes::roll(wave, rng));
        Self::with_kind(id, pos, hp, stats.size, contact, 120, BossKind::Chief(chief))
    }

    pub fn cursor(id: EntityId, pos: Vec2, player_level: u32) -> Self {
        let hp = 4000.0 + player_level as f32 * 250.0;
        let xp = 5000 + player_level * 500;
        Self::with_kind(id, pos, hp, 60.0, 30.0, xp, BossKind::Cursor(CursorState::default()))
    }

    pub fn monolith(id: EntityId, pos: Vec2, player_level: u32) -> Self {
        let hp = 8000.0 + player_level as f32 * 500.0;
        let xp = 10000 + player_level * 500;
        Self::with_kind(id, pos, hp, 120.0, 50.0, xp, BossKind::Monolith(MonolithState::default()))
    }

    pub fn name(&self) -> String {
        match &self.kind {
            BossKind::Chief(c) => {
                let mut name = String::from("ELITE");
                for affix in c.affixes.iter() {
                    name.push(' ');
                    name.push_str(affix.label());
                }
                name.push(' ');
                name.push_str(&c.kind.name().to_uppercase());
                name
            }
            BossKind::Cursor(_) => "CURSOR".to_owned(),
            BossKind::Monolith(_) => "MONOLITH".to_owned(),
        }
    }

    pub fn is_monolith(&self) -> bool {
        matches!(self.kind, BossKind::Monolith(_))
    }

    /// Speeder chiefs shed flame while moving fast
    pub fn leaves_trail(&self) -> bool {
        matches!(&self.kind, BossKind::Chief(c) if c.kind == EnemyKind::Speeder)
            && self.vel.length() > 15.0
    }

    /// One AI step. `enemies` is mutable for chiefs that heal their escort.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        player: &Player,
        enemies: &mut [Enemy],
        rng: &mut R,
    ) -> Vec<Bullet> {
        self.hit_flash = self.hit_flash.saturating_sub(1);

        let mut kind = self.kind;
        let bullets = match &mut kind {
            BossKind::Chief(c) => c.update(self, player, enemies),
            BossKind::Cursor(c) => c.update(self, player, rng),
            BossKind::Monolith(m) => m.update(self, player, enemies, rng),
        };
        self.kind = kind;
        bullets
    }
}
