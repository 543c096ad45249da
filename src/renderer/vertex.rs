//! Vertex types and the neon palette

use bytemuck::{Pod, Zeroable};

use crate::sim::EnemyKind;
use crate::sim::effects::Tint;

/// 2D vertex with position and color, laid out for direct GPU upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Bytes ready for a vertex buffer
    pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
        bytemuck::cast_slice(vertices)
    }
}

/// `0xRRGGBB` to linear-ish RGBA
pub const fn hex(rgb: u32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

pub fn with_alpha(mut color: [f32; 4], alpha: f32) -> [f32; 4] {
    color[3] *= alpha.clamp(0.0, 1.0);
    color
}

/// Colors for game elements
pub mod colors {
    use super::hex;

    pub const BACKGROUND: [f32; 4] = hex(0x050505);
    pub const GRID: [f32; 4] = hex(0x1a1a1a);
    pub const PLAYER: [f32; 4] = hex(0x00ff9d);
    pub const PLAYER_HIT: [f32; 4] = hex(0xffffff);
    pub const ALLY: [f32; 4] = hex(0x00ccff);
    pub const BULLET: [f32; 4] = hex(0x00ff9d);
    pub const ENEMY_BULLET: [f32; 4] = hex(0xff2a2a);
    pub const ORB_XP: [f32; 4] = hex(0x00ffff);
    pub const ORB_HEALTH: [f32; 4] = hex(0xff0055);
    pub const BOSS: [f32; 4] = hex(0xff0055);
    pub const MONOLITH: [f32; 4] = hex(0x4444ff);
    pub const BLACK_HOLE: [f32; 4] = [0.0, 0.0, 0.0, 0.9];
    pub const BLACK_HOLE_RIM: [f32; 4] = hex(0x9400d3);
    pub const TEXT: [f32; 4] = hex(0xffffff);
    pub const CRIT: [f32; 4] = hex(0xffff00);
    pub const DAMAGE: [f32; 4] = hex(0xff0055);
}

pub fn enemy_color(kind: EnemyKind) -> [f32; 4] {
    use EnemyKind::*;
    hex(match kind {
        Grunt => 0xff2a2a,
        Speeder => 0xffd000,
        Tank => 0xbd00ff,
        Seeker => 0xff8800,
        Swarmer => 0x39ff14,
        Brute => 0x8b0000,
        Sniper => 0xffffff,
        Exploder => 0xff4500,
        Waver => 0xff69b4,
        Teleporter => 0x00ffff,
        Turret => 0xffd700,
        Orbit => 0x00ced1,
        Armored => 0x708090,
        Ghost => 0x9400d3,
        Fractal => 0xff00ff,
        Mender => 0x00ff00,
        Lancer | ElectricSpeeder => 0xffff00,
        Vortex => 0x4b0082,
        Trailblazer => 0xff7f50,
        Layer => 0x808000,
        Beamer => 0xe0ffff,
        Aegis => 0x4682b4,
        // Drawn with a white outline so it reads on the background
        Glitch => 0x000000,
        Carrier => 0xa52a2a,
        MiniMonolith => 0x4444ff,
    })
}

pub fn tint_color(tint: Tint) -> [f32; 4] {
    match tint {
        Tint::Player | Tint::Dash => colors::PLAYER,
        Tint::Crit => colors::CRIT,
        Tint::Damage | Tint::Health => colors::DAMAGE,
        Tint::Hurt => hex(0xff2a2a),
        Tint::Heal => hex(0x00ff00),
        Tint::White => colors::TEXT,
        Tint::Explosion => hex(0xff4400),
        Tint::Ember => hex(0xffaa00),
        Tint::Blast => hex(0xffa500),
        Tint::Aura => hex(0xff00ff),
        Tint::Xp => colors::ORB_XP,
        Tint::Boss => colors::BOSS,
        Tint::Flame => hex(0xff5500),
        Tint::Monolith => colors::MONOLITH,
        Tint::Enemy(kind) => enemy_color(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(hex(0x000000), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_vertex_bytes() {
        let v = [Vertex::new(1.0, 2.0, colors::PLAYER)];
        assert_eq!(Vertex::as_bytes(&v).len(), std::mem::size_of::<Vertex>());
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }
}
