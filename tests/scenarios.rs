//! End-to-end scenarios across collision shapes, the kd-tree and the baker.

use collision_core::glam::{Mat4, Vec3};
use collision_core::{
    Aabb, CollisionShape, KdTriTree, OcclusionBaker, OcclusionConfig, Ray, Sphere, TimeSlot,
    Vertex, VertexSet,
};

fn at(x: f32, y: f32, z: f32) -> (Mat4, Mat4) {
    let m = Mat4::from_translation(Vec3::new(x, y, z));
    (m, m.inverse())
}

fn unit_ball() -> CollisionShape {
    CollisionShape::from_sphere(Sphere::new(Vec3::ZERO, 1.0))
}

/// A shape that sat at `from` last tick and is at `to` now.
fn moving_ball(from: Vec3, to: Vec3) -> CollisionShape {
    let mut shape = unit_ball();
    let (l2w, w2l) = at(from.x, from.y, from.z);
    shape.update_matrices(l2w, w2l);
    let (l2w, w2l) = at(to.x, to.y, to.z);
    shape.update_matrices(l2w, w2l);
    shape
}

fn quad_mesh(z: f32) -> VertexSet {
    let n = [0.0, 0.0, 1.0];
    VertexSet::new(
        vec![
            Vertex::new([0.0, 0.0, z], n),
            Vertex::new([1.0, 0.0, z], n),
            Vertex::new([1.0, 1.0, z], n),
            Vertex::new([0.0, 1.0, z], n),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Collision shapes
// ---------------------------------------------------------------------------

#[test]
fn static_separated_spheres_never_collide() {
    let a = moving_ball(Vec3::ZERO, Vec3::ZERO);
    let b = moving_ball(Vec3::new(5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0));

    assert!(!a.collides(&b));
    assert!(!a.collides_over_time(&b));
}

#[test]
fn moving_sphere_reaches_static_sphere() {
    let a = moving_ball(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0));
    let b = moving_ball(Vec3::new(4.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0));

    assert!(a.collides(&b));
    assert!(a.collides_over_time(&b));
    assert!(b.collides_over_time(&a));
}

#[test]
fn fast_sphere_tunnelling_is_caught_over_time() {
    let bullet = moving_ball(Vec3::new(-10.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
    let wall = moving_ball(Vec3::ZERO, Vec3::ZERO);

    assert!(!bullet.collides(&wall));
    assert!(bullet.collides_over_time(&wall));
}

#[test]
fn tangency_at_end_of_step_counts() {
    // Combined radius 2 is reached exactly at t = 1.
    let a = moving_ball(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
    let b = moving_ball(Vec3::new(4.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0));
    assert!(a.collides_over_time(&b));

    let short = moving_ball(Vec3::ZERO, Vec3::new(1.99, 0.0, 0.0));
    assert!(!short.collides_over_time(&b));
}

#[test]
fn overlap_now_implies_overlap_over_time() {
    for x in [0.0, 0.5, 1.0, 1.5, 1.99] {
        let a = moving_ball(Vec3::ZERO, Vec3::ZERO);
        let b = moving_ball(Vec3::new(x, 0.0, 0.0), Vec3::new(x, 0.0, 0.0));
        assert!(a.collides(&b), "x = {x}");
        assert!(a.collides_over_time(&b), "x = {x}");
    }
}

#[test]
fn mixed_shapes_are_symmetric() {
    let mut crate_box = CollisionShape::from_aabb(Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)));
    let (l2w, w2l) = at(3.0, 0.0, 0.0);
    crate_box.update_matrices(l2w, w2l);

    for x in [0.0, 1.5, 1.9, 2.5, 5.0] {
        let ball = moving_ball(Vec3::new(x, 0.0, 0.0), Vec3::new(x, 0.0, 0.0));
        assert_eq!(ball.collides(&crate_box), crate_box.collides(&ball), "x = {x}");
        assert_eq!(
            ball.collides_over_time(&crate_box),
            crate_box.collides_over_time(&ball),
            "x = {x}"
        );
    }
}

#[test]
fn first_update_fills_both_slots() {
    let mut shape = unit_ball();
    shape.add_aabb(Aabb::new(Vec3::ZERO, Vec3::ONE));
    let (l2w, w2l) = at(1.0, 2.0, 3.0);
    shape.update_matrices(l2w, w2l);

    assert_eq!(
        shape.world_spheres(TimeSlot::Previous),
        shape.world_spheres(TimeSlot::Current)
    );
    assert_eq!(
        shape.world_aabbs(TimeSlot::Previous),
        shape.world_aabbs(TimeSlot::Current)
    );
    assert_eq!(shape.world_spheres(TimeSlot::Current)[0].center, Vec3::new(1.0, 2.0, 3.0));
}

// ---------------------------------------------------------------------------
// Kd-tree
// ---------------------------------------------------------------------------

#[test]
fn single_quad_tree_has_no_children() {
    let mut tree = KdTriTree::new();
    tree.add(&Mat4::IDENTITY, &quad_mesh(0.0));
    tree.optimize(KdTriTree::DEFAULT_ITEMS_PER_NODE);

    assert!(tree.children().is_none());
    assert_eq!(tree.node_triangles().len(), 2);
}

#[test]
fn ray_outside_root_box_is_never_occluded() {
    let mut tree = KdTriTree::new();
    for i in 0..20 {
        tree.add(&Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0)), &quad_mesh(0.0));
    }
    tree.optimize(4);

    let ray = Ray::new(Vec3::new(100.0, 100.0, 100.0), Vec3::X);
    assert!(!tree.is_occluded(&ray));

    let ray = Ray::new(Vec3::new(5.5, 0.5, 10.0), Vec3::NEG_Z);
    assert!(tree.is_occluded(&ray));
}

// ---------------------------------------------------------------------------
// Occlusion
// ---------------------------------------------------------------------------

#[test]
fn shelf_darkens_the_floor_below_it() {
    let floor = quad_mesh(0.0);
    let mut tree = KdTriTree::new();
    tree.add(&Mat4::IDENTITY, &floor);
    // A shelf hovering low over the left half of the floor.
    tree.add(
        &(Mat4::from_translation(Vec3::new(-2.0, -2.0, 0.0))
            * Mat4::from_scale(Vec3::new(2.5, 5.0, 1.0))),
        &quad_mesh(0.05),
    );
    tree.optimize(KdTriTree::DEFAULT_ITEMS_PER_NODE);

    let config = OcclusionConfig {
        samples_per_triangle: 256,
        smoothing_passes: 0,
        ..OcclusionConfig::default()
    };
    let occlusion = OcclusionBaker::new(&tree, config).bake(&Mat4::IDENTITY, &floor);

    assert_eq!(occlusion.len(), floor.vertices().len());
    assert!(occlusion.iter().all(|v| (0.0..=1.0).contains(v)));
    assert!(occlusion.iter().any(|&v| v < 1.0));
}
