//! Intersection predicates between primitives.
//!
//! Discrete tests are strict: touching spheres or a sphere grazing a box face
//! do not collide. Box/box overlap uses closed intervals.

use glam::Vec3;

use super::{Aabb, Ray, Sphere};

const PARALLEL_EPSILON: f32 = 1e-7;

/// Sphere/sphere overlap: squared center distance below the squared radius sum.
#[inline]
pub fn sphere_sphere(a: &Sphere, b: &Sphere) -> bool {
    let min_dist = a.radius + b.radius;
    a.center.distance_squared(b.center) < min_dist * min_dist
}

/// Sphere/box overlap: squared distance from the center to the box below r².
#[inline]
pub fn sphere_aabb(sphere: &Sphere, aabb: &Aabb) -> bool {
    let nearest = aabb.clamp(sphere.center);
    sphere.center.distance_squared(nearest) < sphere.radius * sphere.radius
}

/// Box/box overlap on all three axes.
#[inline]
pub fn aabb_aabb(a: &Aabb, b: &Aabb) -> bool {
    a.min.x <= b.max.x
        && a.max.x >= b.min.x
        && a.min.y <= b.max.y
        && a.max.y >= b.min.y
        && a.min.z <= b.max.z
        && a.max.z >= b.min.z
}

/// Slab test. Returns the distance at which the ray enters the box, `0.0`
/// when it starts inside, or `None` when the box is missed or behind it.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    if aabb.is_empty() {
        return None;
    }

    let origin = ray.origin.to_array();
    let direction = ray.direction.to_array();
    let min = aabb.min.to_array();
    let max = aabb.max.to_array();

    let mut t_near = f32::MIN;
    let mut t_far = f32::MAX;

    for axis in 0..3 {
        if direction[axis].abs() < PARALLEL_EPSILON {
            // Parallel to this slab: the origin has to lie between its planes.
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / direction[axis];
        let mut t0 = (min[axis] - origin[axis]) * inv;
        let mut t1 = (max[axis] - origin[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        return None;
    }
    Some(t_near.max(0.0))
}

/// One-sided Möller-Trumbore test.
///
/// Only the face of `(p1, p2, p3)` that is counter-clockwise as seen from the
/// ray origin can be hit. Test the swapped winding too for a two-sided check.
pub fn ray_triangle(ray: &Ray, p1: Vec3, p2: Vec3, p3: Vec3) -> Option<Vec3> {
    let edge1 = p2 - p1;
    let edge2 = p3 - p1;

    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);
    // `det` scales with the triangle's area, so the parallel cut-off does too.
    if det <= 0.0 || det < PARALLEL_EPSILON * edge1.cross(edge2).length() {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray.origin - p1;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < 0.0 {
        return None;
    }
    Some(ray.point_at(t))
}

/// Real roots of `a·t² + b·t + c = 0`, smallest first.
///
/// `None` when the equation is not quadratic (`a == 0`) or has no real root.
pub fn quadratic_formula(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    if a == 0.0 {
        return None;
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_discriminant = discriminant.sqrt();
    let r0 = (-b - sqrt_discriminant) / (2.0 * a);
    let r1 = (-b + sqrt_discriminant) / (2.0 * a);
    Some(if r0 <= r1 { (r0, r1) } else { (r1, r0) })
}

/// Continuous sphere/sphere test over a normalized step `[0, 1]`.
///
/// Sphere A moves linearly from `a0` to `a1`, sphere B from `b0` to `b1`.
/// Reports a hit when they already overlap (or touch) at the start, or when
/// the relative motion brings the centers within `radius_a + radius_b` at
/// some `t` in `[0, 1]`, both ends inclusive.
pub fn swept_spheres(
    a0: Vec3,
    a1: Vec3,
    radius_a: f32,
    b0: Vec3,
    b1: Vec3,
    radius_b: f32,
) -> bool {
    let ab = b0 - a0;
    let va = a1 - a0;
    let vb = b1 - b0;
    let vab = vb - va;

    let radius = radius_a + radius_b;
    let radius_sq = radius * radius;
    let dist_sq = ab.dot(ab);

    if dist_sq <= radius_sq {
        return true;
    }

    let a = vab.dot(vab);
    if a > 0.0 {
        if let Some((u0, u1)) = quadratic_formula(a, 2.0 * vab.dot(ab), dist_sq - radius_sq) {
            return (0.0..=1.0).contains(&u0) || (0.0..=1.0).contains(&u1);
        }
    }

    false
}
