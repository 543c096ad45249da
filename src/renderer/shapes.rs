//! Shape generation for 2D primitives
//!
//! Everything tessellates to triangle lists appended to a caller-owned
//! buffer.

use std::f32::consts::TAU;

use glam::Vec2;

use super::vertex::Vertex;

fn tri(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

fn quad(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) {
    tri(out, a, b, c, color);
    tri(out, c, b, d, color);
}

/// Regular polygon; `sides` below 3 is treated as 3
pub fn polygon(
    out: &mut Vec<Vertex>,
    center: Vec2,
    radius: f32,
    sides: u32,
    rotation: f32,
    color: [f32; 4],
) {
    let sides = sides.max(3);
    for i in 0..sides {
        let a = rotation + i as f32 / sides as f32 * TAU;
        let b = rotation + (i + 1) as f32 / sides as f32 * TAU;
        tri(
            out,
            center,
            center + Vec2::from_angle(a) * radius,
            center + Vec2::from_angle(b) * radius,
            color,
        );
    }
}

/// Filled circle
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4]) {
    let segments = ((radius * 0.5) as u32).clamp(12, 48);
    polygon(out, center, radius, segments, 0.0, color);
}

/// Hollow polygon band between `inner` and `outer`
pub fn polygon_outline(
    out: &mut Vec<Vertex>,
    center: Vec2,
    inner: f32,
    outer: f32,
    sides: u32,
    rotation: f32,
    color: [f32; 4],
) {
    let sides = sides.max(3);
    for i in 0..sides {
        let d1 = Vec2::from_angle(rotation + i as f32 / sides as f32 * TAU);
        let d2 = Vec2::from_angle(rotation + (i + 1) as f32 / sides as f32 * TAU);
        quad(
            out,
            center + d1 * inner,
            center + d1 * outer,
            center + d2 * inner,
            center + d2 * outer,
            color,
        );
    }
}

/// Hollow circle
pub fn ring(out: &mut Vec<Vertex>, center: Vec2, radius: f32, thickness: f32, color: [f32; 4]) {
    let segments = ((radius * 0.5) as u32).clamp(16, 64);
    let half = thickness / 2.0;
    polygon_outline(out, center, (radius - half).max(0.0), radius + half, segments, 0.0, color);
}

/// Thick line segment
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
    let dir = (to - from).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);
    quad(out, from + perp, from - perp, to + perp, to - perp, color);
}

/// Axis-aligned filled rectangle
pub fn rect(out: &mut Vec<Vertex>, min: Vec2, max: Vec2, color: [f32; 4]) {
    quad(out, min, Vec2::new(max.x, min.y), Vec2::new(min.x, max.y), max, color);
}

/// Ribbon through `points`, fading out toward the oldest point
pub fn trail(out: &mut Vec<Vertex>, points: &[Vec2], width: f32, color: [f32; 4]) {
    if points.len() < 2 {
        return;
    }
    let n = points.len() as f32;
    for (i, pair) in points.windows(2).enumerate() {
        let t = (i + 1) as f32 / n;
        let mut c = color;
        c[3] *= t * 0.6;
        line(out, pair[0], pair[1], width * t, c);
    }
}
