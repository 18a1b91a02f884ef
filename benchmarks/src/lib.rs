//! Scene setup shared by the collision benchmarks.

use collision_core::{Aabb, CollisionShape, KdTriTree, Sphere, Vertex, VertexSet};
use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn place(shape: &mut CollisionShape, position: Vec3) {
    let m = Mat4::from_translation(position);
    shape.update_matrices(m, m.inverse());
}

/// `n` single-sphere shapes that moved by up to one unit during the last
/// step, scattered in a cube sized so roughly a tenth of pairs touch.
pub fn setup_moving_spheres(n: usize) -> Vec<CollisionShape> {
    let mut rng = StdRng::seed_from_u64(42);
    let extent = (n as f32).cbrt() * 4.0;

    (0..n)
        .map(|_| {
            let mut shape = CollisionShape::from_sphere(Sphere::new(Vec3::ZERO, 0.5));
            let from = Vec3::new(
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent..extent),
            );
            let step = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            place(&mut shape, from);
            place(&mut shape, from + step);
            shape
        })
        .collect()
}

/// A compound shape: `spheres` spheres along X plus one enclosing box.
pub fn setup_compound(spheres: usize, position: Vec3) -> CollisionShape {
    let mut shape = CollisionShape::new();
    for i in 0..spheres {
        shape.add_sphere(Sphere::new(Vec3::new(i as f32, 0.0, 0.0), 0.6));
    }
    shape.add_aabb(Aabb::new(
        Vec3::splat(-1.0),
        Vec3::new(spheres as f32, 1.0, 1.0),
    ));
    place(&mut shape, position);
    shape
}

/// A flat `n` x `n` grid of unit quads at z = 0, two triangles per cell.
pub fn grid_mesh(n: u16) -> VertexSet {
    let normal = [0.0, 0.0, 1.0];
    let mut vertices = Vec::with_capacity(usize::from(n + 1).pow(2));
    for y in 0..=n {
        for x in 0..=n {
            vertices.push(Vertex::new([f32::from(x), f32::from(y), 0.0], normal));
        }
    }

    let stride = n + 1;
    let mut indices = Vec::with_capacity(usize::from(n).pow(2) * 6);
    for y in 0..n {
        for x in 0..n {
            let i = y * stride + x;
            indices.extend_from_slice(&[i, i + 1, i + stride + 1, i, i + stride + 1, i + stride]);
        }
    }

    VertexSet::new(vertices, indices).expect("grid mesh indices are in range")
}

/// `layers` stacked grids, unoptimized.
pub fn setup_tree(grid: u16, layers: usize) -> KdTriTree {
    let mesh = grid_mesh(grid);
    let mut tree = KdTriTree::new();
    for layer in 0..layers {
        tree.add(
            &Mat4::from_translation(Vec3::new(0.0, 0.0, layer as f32 * 2.0)),
            &mesh,
        );
    }
    tree
}
