//! Axis-aligned bounding boxes.

use glam::{Mat4, Vec3};

/// Axis-aligned bounding box.
///
/// A box whose `min` exceeds its `max` on any axis is empty. Growing
/// [`Aabb::EMPTY`] with [`Aabb::add_point`] yields exactly the points added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The empty box: growing it by a point yields that point.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(-f32::MAX),
    };

    /// Same as [`Aabb::EMPTY`].
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Create a new AABB.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Degenerate box holding a single point.
    pub const fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Create an AABB from a set of points. No points gives [`Aabb::EMPTY`].
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.add_point(p);
        }
        aabb
    }

    /// Bounds of `box` once all eight of its corners are moved by `transform`.
    ///
    /// An empty box stays empty.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::from_points(self.corners().map(|c| transform.transform_point3(c)))
    }

    /// Grow the box to include `point`.
    #[inline]
    pub fn add_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Overlapping region of both boxes (possibly empty).
    pub fn intersection(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// True when this box lies entirely within `outer` (touching faces count).
    #[inline]
    pub fn is_inside(&self, outer: &Aabb) -> bool {
        self.intersection(outer) == *self
    }

    /// True when `inner` lies entirely within this box.
    #[inline]
    pub fn includes(&self, inner: &Aabb) -> bool {
        inner.is_inside(self)
    }

    /// True when the two boxes share at least one point.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Extent along x.
    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Extent along y.
    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Extent along z.
    #[inline]
    pub fn depth(&self) -> f32 {
        self.max.z - self.min.z
    }

    /// The eight corners, x varying fastest.
    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Nearest point of the box to `point`.
    #[inline]
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        point.max(self.min).min(self.max)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_empty_box_absorbs_first_point() {
        let mut aabb = Aabb::default();
        assert!(aabb.is_empty());

        aabb.add_point(Vec3::new(1.0, 2.0, 3.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb, Aabb::from_point(Vec3::new(1.0, 2.0, 3.0)));

        aabb.add_point(Vec3::new(-1.0, 0.0, 5.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn test_inside_and_includes() {
        let outer = unit();
        let inner = Aabb::new(Vec3::splat(-0.5), Vec3::new(1.0, 0.5, 0.5));
        let straddling = Aabb::new(Vec3::splat(0.5), Vec3::splat(1.5));

        assert!(inner.is_inside(&outer));
        assert!(outer.includes(&inner));
        assert!(!straddling.is_inside(&outer));
        assert!(outer.is_inside(&outer));
    }

    #[test]
    fn test_intersects_touching_faces() {
        let a = unit();
        let b = Aabb::new(Vec3::new(1.0, -1.0, -1.0), Vec3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Vec3::new(1.1, -1.0, -1.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_transformed_rotated_box() {
        let rotated = unit().transformed(&Mat4::from_rotation_z(std::f32::consts::FRAC_PI_4));
        let half_diag = std::f32::consts::SQRT_2;

        let eps = 1e-5;
        assert!((rotated.max.x - half_diag).abs() < eps);
        assert!((rotated.min.y + half_diag).abs() < eps);
        assert!((rotated.max.z - 1.0).abs() < eps);
    }

    #[test]
    fn test_empty_constructor_matches_constant() {
        const BOX: Aabb = Aabb::empty();
        assert_eq!(BOX, Aabb::EMPTY);
        assert_eq!(Aabb::default(), Aabb::EMPTY);
        assert!(!BOX.intersects(&unit()));
    }

    #[test]
    fn test_transformed_empty_stays_empty() {
        let moved = Aabb::EMPTY.transformed(&Mat4::from_translation(Vec3::X));
        assert!(moved.is_empty());
    }

    #[test]
    fn test_extents() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(4.0, 2.0, 1.0));
        assert_eq!(aabb.width(), 4.0);
        assert_eq!(aabb.height(), 2.0);
        assert_eq!(aabb.depth(), 1.0);
        assert_eq!(aabb.clamp(Vec3::new(9.0, -3.0, 0.5)), Vec3::new(4.0, 0.0, 0.5));
    }
}
