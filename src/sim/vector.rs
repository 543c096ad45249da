//! Vector helpers on top of `glam::Vec2`
//!
//! Every simulation vector is a plain `Vec2` value; these helpers add the
//! dead-zone normalisation the movement code relies on.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

/// Magnitudes below this normalise to zero instead of blowing up
pub const NORM_EPSILON: f32 = 0.0001;

pub trait VecExt {
    /// Unit vector, or zero when the magnitude is below [`NORM_EPSILON`]
    fn norm(self) -> Vec2;
    /// Rescale to `max` if longer than `max`
    fn limit(self, max: f32) -> Vec2;
    /// Left-hand perpendicular `(-y, x)`
    fn perp_left(self) -> Vec2;
}

impl VecExt for Vec2 {
    #[inline]
    fn norm(self) -> Vec2 {
        let m = self.length();
        if m < NORM_EPSILON { Vec2::ZERO } else { self / m }
    }

    #[inline]
    fn limit(self, max: f32) -> Vec2 {
        if self.length() > max { self.norm() * max } else { self }
    }

    #[inline]
    fn perp_left(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }
}

/// Direction from `from` toward `to`, zero if they coincide
#[inline]
pub fn dir_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).norm()
}

/// Uniform random heading in `[0, 2π)`
#[inline]
pub fn random_angle<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random::<f32>() * TAU
}

/// Random unit vector
#[inline]
pub fn random_dir<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::from_angle(random_angle(rng))
}

/// Per-axis offset uniformly drawn from `[-span/2, span/2)`
#[inline]
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, span: f32) -> Vec2 {
    Vec2::new(
        (rng.random::<f32>() - 0.5) * span,
        (rng.random::<f32>() - 0.5) * span,
    )
}
