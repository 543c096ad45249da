//! Backend-agnostic rendering
//!
//! `draw` turns a `GameState` into a `Frame`: screen-space triangles plus
//! text labels. Any GPU or canvas backend can upload the vertex list as-is
//! (`Vertex` is `Pod`). Drawing never mutates the simulation.

pub mod shapes;
pub mod vertex;

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::Vec2;

use crate::consts::{TILE_SIZE, WORLD_SIZE};
use crate::settings::Settings;
use crate::sim::effects::ParticleKind;
use crate::sim::{BossKind, EnemyKind, GameState};
use vertex::{colors, enemy_color, tint_color, with_alpha};

pub use vertex::Vertex;

/// Text to draw on top of the geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub pos: Vec2,
    pub text: String,
    pub size: f32,
    pub color: [f32; 4],
}

/// One rendered frame
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub clear: [f32; 4],
    pub vertices: Vec<Vertex>,
    pub labels: Vec<Label>,
}

/// Polygon sides and base rotation per enemy kind
fn enemy_shape(kind: EnemyKind) -> (u32, f32) {
    use EnemyKind::*;
    match kind {
        Grunt | Armored | Brute => (4, FRAC_PI_4),
        Speeder | Lancer | ElectricSpeeder | Trailblazer => (3, 0.0),
        Seeker | Sniper | Beamer => (4, 0.0),
        Tank | Aegis | Carrier => (6, 0.0),
        Swarmer | Glitch => (3, FRAC_PI_2),
        Fractal | Vortex => (8, 0.0),
        Turret | MiniMonolith | Layer => (5, 0.0),
        _ => (20, 0.0),
    }
}

struct Painter<'a> {
    frame: &'a mut Frame,
    offset: Vec2,
    viewport: Vec2,
}

impl Painter<'_> {
    fn to_screen(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }

    /// Cull anything whose bounding circle is fully off screen
    fn visible(&self, world: Vec2, radius: f32) -> bool {
        let p = self.to_screen(world);
        p.x + radius >= 0.0
            && p.y + radius >= 0.0
            && p.x - radius <= self.viewport.x
            && p.y - radius <= self.viewport.y
    }

    fn label(&mut self, world: Vec2, text: impl Into<String>, size: f32, color: [f32; 4]) {
        let pos = self.to_screen(world);
        self.frame.labels.push(Label {
            pos,
            text: text.into(),
            size,
            color,
        });
    }
}

/// Render the whole scene from the camera's point of view
pub fn draw(state: &GameState, settings: &Settings) -> Frame {
    let mut frame = Frame {
        clear: colors::BACKGROUND,
        ..Default::default()
    };

    let shake = if settings.effective_screen_shake() && state.screen_shake > 0.0 {
        let t = state.time_ticks as f32;
        Vec2::new((t * 1.7).sin(), (t * 2.3).cos()) * state.screen_shake * 0.5
    } else {
        Vec2::ZERO
    };

    let mut p = Painter {
        frame: &mut frame,
        offset: state.camera + shake,
        viewport: state.viewport,
    };

    if settings.quality.grid_enabled() {
        draw_grid(&mut p);
    }
    draw_area_effects(&mut p, state);
    draw_orbs(&mut p, state);
    draw_enemies(&mut p, state);
    draw_bosses(&mut p, state);
    draw_player(&mut p, state);
    draw_allies(&mut p, state);
    draw_bullets(&mut p, state);
    if settings.max_particles() > 0 {
        draw_particles(&mut p, state);
    }
    draw_texts(&mut p, state);

    if settings.effective_flashes() && state.level_up_flash > 0.0 {
        let v = state.viewport;
        let flash = with_alpha(colors::TEXT, state.level_up_flash * 0.3);
        shapes::rect(&mut frame.vertices, Vec2::ZERO, v, flash);
    }
    frame
}

fn draw_grid(p: &mut Painter<'_>) {
    let start = (p.offset / TILE_SIZE).floor() * TILE_SIZE;
    let mut x = start.x.max(0.0);
    while x <= (p.offset.x + p.viewport.x).min(WORLD_SIZE) {
        let a = p.to_screen(Vec2::new(x, 0.0));
        let b = p.to_screen(Vec2::new(x, WORLD_SIZE));
        shapes::line(&mut p.frame.vertices, a, b, 1.0, colors::GRID);
        x += TILE_SIZE;
    }
    let mut y = start.y.max(0.0);
    while y <= (p.offset.y + p.viewport.y).min(WORLD_SIZE) {
        let a = p.to_screen(Vec2::new(0.0, y));
        let b = p.to_screen(Vec2::new(WORLD_SIZE, y));
        shapes::line(&mut p.frame.vertices, a, b, 1.0, colors::GRID);
        y += TILE_SIZE;
    }
}

fn draw_area_effects(p: &mut Painter<'_>, state: &GameState) {
    for effect in &state.area_effects {
        if !p.visible(effect.pos, effect.radius) {
            continue;
        }
        let c = p.to_screen(effect.pos);
        shapes::circle(&mut p.frame.vertices, c, effect.radius * 0.3, colors::BLACK_HOLE);
        let pulse = 1.0 + (state.global_pulse * 4.0).sin() * 0.05;
        let rim = with_alpha(colors::BLACK_HOLE_RIM, 0.6);
        shapes::ring(&mut p.frame.vertices, c, effect.radius * pulse, 2.0, rim);
    }
}

fn draw_orbs(p: &mut Painter<'_>, state: &GameState) {
    use crate::sim::pickup::OrbKind;
    for orb in &state.orbs {
        if !p.visible(orb.pos, orb.radius) {
            continue;
        }
        let color = match orb.kind {
            OrbKind::Xp => colors::ORB_XP,
            OrbKind::Health => colors::ORB_HEALTH,
        };
        let c = p.to_screen(orb.pos);
        shapes::polygon(&mut p.frame.vertices, c, orb.radius, 4, state.global_pulse, color);
    }
}

fn draw_enemies(p: &mut Painter<'_>, state: &GameState) {
    for e in &state.enemies {
        if !p.visible(e.pos, e.size) {
            continue;
        }
        let (sides, base) = enemy_shape(e.kind);
        let c = p.to_screen(e.pos);
        let spin = base + state.global_pulse * e.vel.length() * 0.2;
        let color = if e.is_low_health() && (state.time_ticks / 4) % 2 == 0 {
            colors::TEXT
        } else {
            enemy_color(e.kind)
        };
        let v = &mut p.frame.vertices;
        if e.kind == EnemyKind::Glitch {
            shapes::polygon_outline(v, c, e.size - 2.0, e.size, sides, spin, colors::TEXT);
        }
        if e.kind == EnemyKind::Ghost {
            shapes::polygon(v, c, e.size, sides, spin, with_alpha(color, 0.4));
        } else {
            shapes::polygon(v, c, e.size, sides, spin, color);
        }
    }
}

fn draw_bosses(p: &mut Painter<'_>, state: &GameState) {
    for boss in state.bosses.iter().chain(&state.chiefs) {
        let hidden = matches!(&boss.kind, BossKind::Cursor(c) if c.is_hidden());
        if hidden || !p.visible(boss.pos, boss.size * 2.0) {
            continue;
        }
        let c = p.to_screen(boss.pos);
        let base = match &boss.kind {
            BossKind::Chief(chief) => enemy_color(chief.kind),
            BossKind::Cursor(_) => colors::BOSS,
            BossKind::Monolith(_) => colors::MONOLITH,
        };
        let color = if boss.hit_flash > 0 { colors::TEXT } else { base };
        let v = &mut p.frame.vertices;
        match &boss.kind {
            BossKind::Chief(chief) => {
                let (sides, rot) = enemy_shape(chief.kind);
                shapes::polygon(v, c, boss.size, sides, rot, color);
                let (inner, outer) = (boss.size + 4.0, boss.size + 7.0);
                shapes::polygon_outline(v, c, inner, outer, sides, rot, colors::BOSS);
            }
            BossKind::Cursor(cursor) => {
                let aim = (cursor.predicted - boss.pos).normalize_or_zero();
                let rot = aim.y.atan2(aim.x);
                shapes::polygon(v, c, boss.size, 3, rot, color);
                if cursor.snipe_charge > 0 {
                    let target = cursor.predicted - p.offset;
                    shapes::line(v, c, target, 1.0, with_alpha(colors::BOSS, 0.5));
                }
            }
            BossKind::Monolith(m) => {
                shapes::polygon(v, c, boss.size, 4, m.rotation, color);
                let (inner, outer) = (boss.size * 1.2, boss.size * 1.25);
                shapes::polygon_outline(v, c, inner, outer, 4, -m.rotation, colors::MONOLITH);
            }
        }

        let bar_w = boss.size * 2.0;
        let frac = (boss.hp / boss.max_hp).clamp(0.0, 1.0);
        let top = c - Vec2::new(boss.size, boss.size + 20.0);
        shapes::rect(v, top, top + Vec2::new(bar_w, 5.0), colors::GRID);
        shapes::rect(v, top, top + Vec2::new(bar_w * frac, 5.0), colors::BOSS);
        let name = boss.name();
        p.label(boss.pos - Vec2::new(0.0, boss.size + 30.0), name, 14.0, colors::TEXT);
    }
}

fn draw_player(p: &mut Painter<'_>, state: &GameState) {
    let player = &state.player;
    let trail: Vec<Vec2> = player.trail.iter().map(|&t| p.to_screen(t)).collect();
    let v = &mut p.frame.vertices;
    shapes::trail(v, &trail, 12.0, colors::PLAYER);

    let c = player.pos - p.offset;
    let flicker = player.invulnerable > 0 && (state.time_ticks / 3) % 2 == 0;
    let color = if flicker { with_alpha(colors::PLAYER_HIT, 0.5) } else { colors::PLAYER };
    shapes::polygon(v, c, 14.0, 3, player.rotation, color);

    if player.has_perk(crate::sim::Perk::PlasmaAura) {
        let aura = with_alpha(tint_color(crate::sim::effects::Tint::Aura), 0.3);
        shapes::ring(v, c, crate::consts::AURA_RADIUS, 1.5, aura);
    }
}

fn draw_allies(p: &mut Painter<'_>, state: &GameState) {
    for ally in &state.allies {
        let c = p.to_screen(ally.pos);
        shapes::polygon(&mut p.frame.vertices, c, 6.0, 4, state.global_pulse, colors::ALLY);
    }
    if let Some(support) = &state.support {
        let c = p.to_screen(support.pos);
        shapes::polygon(&mut p.frame.vertices, c, 18.0, 6, support.rotation, colors::ALLY);
        for zap in &support.zaps {
            let z = p.to_screen(*zap);
            shapes::line(&mut p.frame.vertices, c, z, 2.0, colors::ORB_XP);
        }
    }
}

fn draw_bullets(p: &mut Painter<'_>, state: &GameState) {
    for b in &state.bullets {
        let r = b.visual_radius();
        if !p.visible(b.pos, r) {
            continue;
        }
        let color = if b.enemy {
            colors::ENEMY_BULLET
        } else if b.crit {
            colors::CRIT
        } else {
            colors::BULLET
        };
        let c = p.to_screen(b.pos);
        shapes::circle(&mut p.frame.vertices, c, r, color);
    }
}

fn draw_particles(p: &mut Painter<'_>, state: &GameState) {
    for part in &state.particles {
        if !p.visible(part.pos, part.size.max(1.0)) {
            continue;
        }
        let color = with_alpha(tint_color(part.tint), part.alpha());
        let c = p.to_screen(part.pos);
        let v = &mut p.frame.vertices;
        match part.kind {
            ParticleKind::Ring | ParticleKind::Shockwave => {
                shapes::ring(v, c, part.size, 2.0, color)
            }
            ParticleKind::Smoke => shapes::circle(v, c, part.size, with_alpha(color, 0.5)),
            ParticleKind::Square => {
                let h = Vec2::splat(part.size / 2.0);
                shapes::rect(v, c - h, c + h, color);
            }
            ParticleKind::Spark => shapes::polygon(v, c, part.size.max(1.0), 4, 0.0, color),
        }
    }
}

fn draw_texts(p: &mut Painter<'_>, state: &GameState) {
    for t in &state.texts {
        let color = with_alpha(tint_color(t.tint), t.opacity);
        p.label(t.pos, t.text.clone(), t.size, color);
    }
}
