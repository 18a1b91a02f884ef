//! Geometric primitives and intersection predicates.
//!
//! Vectors and matrices come from [`glam`]; this module adds the bounded
//! shapes the collision and occlusion code is built from.

mod aabb;
pub mod intersect;
mod ray;
mod sphere;

pub use aabb::Aabb;
pub use intersect::{
    aabb_aabb, quadratic_formula, ray_aabb, ray_triangle, sphere_aabb, sphere_sphere,
    swept_spheres,
};
pub use ray::Ray;
pub use sphere::Sphere;
