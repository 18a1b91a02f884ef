//! Composite sphere/box collision shapes with a two-sample pose history.

use glam::Mat4;

use crate::math::{aabb_aabb, sphere_aabb, sphere_sphere, swept_spheres, Aabb, Sphere};

/// One of the two poses a [`CollisionShape`] remembers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSlot {
    /// Pose at the start of the last simulation step.
    Previous,
    /// Pose now.
    Current,
}

impl TimeSlot {
    #[inline]
    const fn index(self) -> usize {
        match self {
            TimeSlot::Previous => 0,
            TimeSlot::Current => 1,
        }
    }
}

/// World-space state of a shape at one instant.
#[derive(Debug, Clone, PartialEq)]
struct Pose {
    local_to_world: Mat4,
    world_to_local: Mat4,
    spheres: Vec<Sphere>,
    aabbs: Vec<Aabb>,
}

impl Pose {
    fn identity() -> Self {
        Self {
            local_to_world: Mat4::IDENTITY,
            world_to_local: Mat4::IDENTITY,
            spheres: Vec::new(),
            aabbs: Vec::new(),
        }
    }

    fn push_sphere(&mut self, local: &Sphere) {
        self.spheres
            .push(local.with_center_transformed(&self.local_to_world));
    }

    fn push_aabb(&mut self, local: &Aabb) {
        self.aabbs.push(local.transformed(&self.local_to_world));
    }

    /// Move to a new placement, recomputing every cached primitive.
    fn place(
        &mut self,
        local_to_world: Mat4,
        world_to_local: Mat4,
        local_spheres: &[Sphere],
        local_aabbs: &[Aabb],
    ) {
        self.local_to_world = local_to_world;
        self.world_to_local = world_to_local;

        for (world, local) in self.spheres.iter_mut().zip(local_spheres) {
            *world = local.with_center_transformed(&local_to_world);
        }
        for (world, local) in self.aabbs.iter_mut().zip(local_aabbs) {
            *world = local.transformed(&local_to_world);
        }
    }
}

/// A rigid union of spheres and axis-aligned boxes.
///
/// Primitives are stored in local space and cached in world space for two
/// poses: where the shape was at the start of the last step and where it is
/// now. Discrete queries look at the current pose only; the continuous query
/// sweeps spheres between both poses.
///
/// Boxes stay axis-aligned in world space: a rotated box is replaced by the
/// bounds of its transformed corners.
#[derive(Debug, Clone)]
pub struct CollisionShape {
    local_spheres: Vec<Sphere>,
    local_aabbs: Vec<Aabb>,
    poses: [Pose; 2],
    first_update: bool,
}

impl CollisionShape {
    /// Create an empty shape placed at the identity.
    pub fn new() -> Self {
        Self {
            local_spheres: Vec::new(),
            local_aabbs: Vec::new(),
            poses: [Pose::identity(), Pose::identity()],
            first_update: true,
        }
    }

    /// Shape made of a single sphere.
    pub fn from_sphere(sphere: Sphere) -> Self {
        let mut shape = Self::new();
        shape.add_sphere(sphere);
        shape
    }

    /// Shape made of a single box.
    pub fn from_aabb(aabb: Aabb) -> Self {
        let mut shape = Self::new();
        shape.add_aabb(aabb);
        shape
    }

    /// Append a local-space sphere.
    ///
    /// Its world copies are placed with whatever matrices both poses hold
    /// right now (identity before the first update).
    pub fn add_sphere(&mut self, sphere: Sphere) {
        self.local_spheres.push(sphere);
        for pose in &mut self.poses {
            pose.push_sphere(&sphere);
        }
    }

    /// Append a local-space box, transformed like [`add_sphere`](Self::add_sphere).
    pub fn add_aabb(&mut self, aabb: Aabb) {
        self.local_aabbs.push(aabb);
        for pose in &mut self.poses {
            pose.push_aabb(&aabb);
        }
    }

    /// Advance the pose history by one step.
    ///
    /// The current pose becomes the previous one and the current pose is
    /// recomputed from the new matrices. The very first call behaves like
    /// [`set_matrices`](Self::set_matrices) so a freshly spawned shape does
    /// not sweep from the origin.
    pub fn update_matrices(&mut self, local_to_world: Mat4, world_to_local: Mat4) {
        if self.first_update {
            self.set_matrices(local_to_world, world_to_local);
            self.first_update = false;
            return;
        }

        let [previous, current] = &mut self.poses;
        previous.clone_from(current);
        current.place(
            local_to_world,
            world_to_local,
            &self.local_spheres,
            &self.local_aabbs,
        );

        tracing::trace!(
            spheres = self.local_spheres.len(),
            aabbs = self.local_aabbs.len(),
            "collision shape advanced"
        );
    }

    /// Place both poses at the same transform, e.g. after a teleport.
    pub fn set_matrices(&mut self, local_to_world: Mat4, world_to_local: Mat4) {
        let [previous, current] = &mut self.poses;
        current.place(
            local_to_world,
            world_to_local,
            &self.local_spheres,
            &self.local_aabbs,
        );
        previous.clone_from(current);

        tracing::trace!(
            spheres = self.local_spheres.len(),
            aabbs = self.local_aabbs.len(),
            "collision shape placed"
        );
    }

    /// Discrete overlap test between the current poses of both shapes.
    pub fn collides(&self, other: &CollisionShape) -> bool {
        let mine = self.pose(TimeSlot::Current);
        let theirs = other.pose(TimeSlot::Current);

        let spheres = mine
            .spheres
            .iter()
            .any(|a| theirs.spheres.iter().any(|b| sphere_sphere(a, b)));

        spheres || self.current_boxes_collide(other)
    }

    /// Continuous test over the last step.
    ///
    /// Sphere pairs are swept between the previous and current poses. Boxes
    /// are not swept: box/box and sphere/box pairs are tested on the current
    /// poses only, exactly as [`collides`](Self::collides) does.
    pub fn collides_over_time(&self, other: &CollisionShape) -> bool {
        let (a_prev, a_cur) = (
            &self.pose(TimeSlot::Previous).spheres,
            &self.pose(TimeSlot::Current).spheres,
        );
        let (b_prev, b_cur) = (
            &other.pose(TimeSlot::Previous).spheres,
            &other.pose(TimeSlot::Current).spheres,
        );

        let spheres = a_prev.iter().zip(a_cur).any(|(a0, a1)| {
            b_prev.iter().zip(b_cur).any(|(b0, b1)| {
                swept_spheres(a0.center, a1.center, a1.radius, b0.center, b1.center, b1.radius)
            })
        });

        spheres || self.current_boxes_collide(other)
    }

    /// Box/box, sphere/box and box/sphere tests on the current poses.
    fn current_boxes_collide(&self, other: &CollisionShape) -> bool {
        let mine = self.pose(TimeSlot::Current);
        let theirs = other.pose(TimeSlot::Current);

        mine.aabbs
            .iter()
            .any(|a| theirs.aabbs.iter().any(|b| aabb_aabb(a, b)))
            || mine
                .spheres
                .iter()
                .any(|s| theirs.aabbs.iter().any(|b| sphere_aabb(s, b)))
            || mine
                .aabbs
                .iter()
                .any(|b| theirs.spheres.iter().any(|s| sphere_aabb(s, b)))
    }

    #[inline]
    fn pose(&self, slot: TimeSlot) -> &Pose {
        &self.poses[slot.index()]
    }

    pub fn local_spheres(&self) -> &[Sphere] {
        &self.local_spheres
    }

    pub fn local_aabbs(&self) -> &[Aabb] {
        &self.local_aabbs
    }

    /// World-space spheres of the given pose, parallel to [`local_spheres`](Self::local_spheres).
    pub fn world_spheres(&self, slot: TimeSlot) -> &[Sphere] {
        &self.pose(slot).spheres
    }

    /// World-space boxes of the given pose, parallel to [`local_aabbs`](Self::local_aabbs).
    pub fn world_aabbs(&self, slot: TimeSlot) -> &[Aabb] {
        &self.pose(slot).aabbs
    }

    pub fn local_to_world(&self, slot: TimeSlot) -> Mat4 {
        self.pose(slot).local_to_world
    }

    pub fn world_to_local(&self, slot: TimeSlot) -> Mat4 {
        self.pose(slot).world_to_local
    }

    /// False until [`update_matrices`](Self::update_matrices) has run once.
    pub fn has_history(&self) -> bool {
        !self.first_update
    }
}

impl Default for CollisionShape {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Sphere> for CollisionShape {
    fn from(sphere: Sphere) -> Self {
        Self::from_sphere(sphere)
    }
}

impl From<Aabb> for CollisionShape {
    fn from(aabb: Aabb) -> Self {
        Self::from_aabb(aabb)
    }
}
