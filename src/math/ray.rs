//! Half-lines used for occlusion queries.

use glam::Vec3;

/// A ray with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; `direction` is normalized (zero stays zero).
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray starting at `origin` and heading towards `target`.
    pub fn from_origin_target(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, target - origin)
    }

    /// Point along the ray at distance `t`.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
