//! Bounding sphere primitive.

use glam::Vec3;

/// A sphere given by its center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere.
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Copy of this sphere with its center moved by `transform`.
    ///
    /// The radius is left untouched: collision shapes only carry rigid poses.
    #[inline]
    pub fn with_center_transformed(&self, transform: &glam::Mat4) -> Self {
        Self {
            center: transform.transform_point3(self.center),
            radius: self.radius,
        }
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0)
    }
}
