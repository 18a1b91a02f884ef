use anyhow::Context;
use collision_core::{
    Aabb, CollisionShape, KdTriTree, OcclusionBaker, OcclusionConfig, Sphere, Vertex, VertexSet,
};
use glam::{Mat4, Vec3};

const TICKS: usize = 6;
const DT: f32 = 1.0 / 60.0;

fn place(shape: &mut CollisionShape, position: Vec3) {
    let m = Mat4::from_translation(position);
    shape.update_matrices(m, m.inverse());
}

/// A fast bullet crossing a thin post, checked discretely and swept.
fn run_bullet() {
    let mut bullet = CollisionShape::from_sphere(Sphere::new(Vec3::ZERO, 0.1));
    let mut post = CollisionShape::new();
    post.add_sphere(Sphere::new(Vec3::ZERO, 0.2));
    post.add_aabb(Aabb::new(Vec3::new(-0.1, 0.0, -0.1), Vec3::new(0.1, 3.0, 0.1)));
    place(&mut post, Vec3::ZERO);

    let velocity = Vec3::new(120.0, 0.0, 0.0);
    let mut position = Vec3::new(-3.5, 0.0, 0.0);

    for tick in 0..TICKS {
        place(&mut bullet, position);
        let discrete = bullet.collides(&post);
        let swept = bullet.collides_over_time(&post);
        log::info!(
            "tick {tick}: bullet at x = {:6.2}, collides = {discrete}, over time = {swept}",
            position.x
        );
        position += velocity * DT;
    }
}

fn quad(min: Vec3, max: Vec3) -> anyhow::Result<VertexSet> {
    let n = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex::new([min.x, min.y, min.z], n),
        Vertex::new([max.x, min.y, min.z], n),
        Vertex::new([max.x, max.y, max.z], n),
        Vertex::new([min.x, max.y, max.z], n),
    ];
    Ok(VertexSet::new(vertices, vec![0, 1, 2, 0, 2, 3])?)
}

/// Unit cube with outward normals, split per face.
fn cube() -> anyhow::Result<VertexSet> {
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([1.0, 0.0, 0.0], [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]]),
        ([-1.0, 0.0, 0.0], [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]]),
        ([0.0, 1.0, 0.0], [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]]),
        ([0.0, -1.0, 0.0], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]]),
        ([0.0, 0.0, 1.0], [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]]),
        ([0.0, 0.0, -1.0], [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u16;
        vertices.extend(corners.iter().map(|&p| Vertex::new(p, normal)));
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    Ok(VertexSet::new(vertices, indices)?)
}

/// Bake occlusion for a floor with a crate standing on it.
fn run_bake() -> anyhow::Result<()> {
    let floor = quad(Vec3::new(-4.0, -4.0, 0.0), Vec3::new(4.0, 4.0, 0.0))
        .context("building floor mesh")?;
    let crate_mesh = cube().context("building crate mesh")?;
    let crate_world = Mat4::from_translation(Vec3::new(-0.5, -0.5, 0.0));

    let mut tree = KdTriTree::new();
    tree.add(&Mat4::IDENTITY, &floor);
    tree.add(&crate_world, &crate_mesh);
    tree.optimize(KdTriTree::DEFAULT_ITEMS_PER_NODE);
    let stats = tree.stats();
    log::info!(
        "occluder tree: {} triangles, {} nodes, depth {}",
        stats.triangles,
        stats.nodes,
        stats.depth
    );

    let baker = OcclusionBaker::new(&tree, OcclusionConfig::default());
    let baked = baker.bake_many(&[(Mat4::IDENTITY, &floor), (crate_world, &crate_mesh)]);
    for (name, occlusion) in ["floor", "crate"].into_iter().zip(baked) {
        let min = occlusion.iter().copied().fold(f32::INFINITY, f32::min);
        let max = occlusion.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mean = occlusion.iter().sum::<f32>() / occlusion.len().max(1) as f32;
        log::info!("{name}: openness min {min:.3}, max {max:.3}, mean {mean:.3}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run_bullet();
    run_bake()
}
