//! Median-split kd-tree over static triangles for ray occlusion queries.
//!
//! Triangles are first accumulated flat on the root with [`KdTriTree::add`],
//! then [`KdTriTree::optimize`] partitions them once. Each node keeps the
//! triangles that straddle its split plane; the rest move down into the two
//! half-boxes. After the build the tree is read-only and can be shared
//! between query threads.

use glam::{Mat4, Vec3};

use super::mesh::VertexSet;
use crate::math::{ray_aabb, ray_triangle, Aabb, Ray};

/// A world-space triangle with its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
    pub aabb: Aabb,
}

impl Triangle {
    pub fn new(p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self {
            p1,
            p2,
            p3,
            aabb: Aabb::from_points([p1, p2, p3]),
        }
    }

    /// Two-sided hit test.
    ///
    /// The winding of stored triangles is not normalized, so both orders are
    /// tried against the one-sided ray test.
    #[inline]
    pub fn is_hit_by(&self, ray: &Ray) -> bool {
        ray_triangle(ray, self.p1, self.p2, self.p3).is_some()
            || ray_triangle(ray, self.p1, self.p3, self.p2).is_some()
    }
}

/// Shape summary of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub leaves: usize,
    /// Longest root-to-leaf path counted in nodes (a lone root is 1).
    pub depth: usize,
    pub triangles: usize,
}

/// A node of the triangle kd-tree; the root is the tree itself.
#[derive(Debug, Clone)]
pub struct KdTriTree {
    aabb: Aabb,
    triangles: Vec<Triangle>,
    children: Option<Box<[KdTriTree; 2]>>,
}

impl KdTriTree {
    /// Leaf size used when callers have no better estimate.
    pub const DEFAULT_ITEMS_PER_NODE: usize = 50;

    /// Create an empty tree.
    pub fn new() -> Self {
        Self::with_aabb(Aabb::empty())
    }

    fn with_aabb(aabb: Aabb) -> Self {
        Self {
            aabb,
            triangles: Vec::new(),
            children: None,
        }
    }

    /// Append every triangle of `mesh`, moved to world space by `world`.
    ///
    /// The root box grows by every transformed vertex, referenced or not.
    /// Triangles stay on the root until the next [`optimize`](Self::optimize).
    pub fn add(&mut self, world: &Mat4, mesh: &VertexSet) {
        let positions: Vec<Vec3> = mesh
            .positions()
            .map(|p| world.transform_point3(p))
            .collect();

        for &p in &positions {
            self.aabb.add_point(p);
        }

        self.triangles.reserve(mesh.triangle_count());
        self.triangles.extend(mesh.triangles().map(|[i1, i2, i3]| {
            Triangle::new(
                positions[usize::from(i1)],
                positions[usize::from(i2)],
                positions[usize::from(i3)],
            )
        }));
    }

    /// Rebuild the tree so that no leaf holds more than `items_per_node`
    /// triangles, unless its triangles cannot be separated.
    ///
    /// Every triangle currently in the tree takes part, so calling this twice
    /// rebuilds from scratch.
    pub fn optimize(&mut self, items_per_node: usize) {
        let mut items = Vec::with_capacity(self.len());
        self.drain_into(&mut items);
        self.split(items, items_per_node);

        let stats = self.stats();
        tracing::debug!(
            triangles = stats.triangles,
            nodes = stats.nodes,
            leaves = stats.leaves,
            depth = stats.depth,
            items_per_node,
            "kd tree optimized"
        );
    }

    fn drain_into(&mut self, items: &mut Vec<Triangle>) {
        items.append(&mut self.triangles);
        if let Some(children) = self.children.take() {
            let [mut low, mut high] = *children;
            low.drain_into(items);
            high.drain_into(items);
        }
    }

    fn split(&mut self, mut items: Vec<Triangle>, items_per_node: usize) {
        if items.len() <= items_per_node {
            self.triangles = items;
            return;
        }

        // Cut at the median triangle rather than the box middle: balance
        // matters more than tight boxes here.
        let axis = self.split_axis();
        items.sort_by(|a, b| a.aabb.min[axis].total_cmp(&b.aabb.min[axis]));
        let cut = items[items.len() / 2].aabb.min[axis];

        let mut low_box = self.aabb;
        let mut high_box = self.aabb;
        low_box.max[axis] = cut;
        high_box.min[axis] = cut;

        let mut low = Vec::new();
        let mut high = Vec::new();
        let mut straddling = Vec::new();
        for triangle in items {
            if triangle.aabb.is_inside(&low_box) {
                low.push(triangle);
            } else if triangle.aabb.is_inside(&high_box) {
                high.push(triangle);
            } else {
                straddling.push(triangle);
            }
        }

        if low.is_empty() || high.is_empty() {
            straddling.append(&mut low);
            straddling.append(&mut high);
            self.triangles = straddling;
            return;
        }

        self.triangles = straddling;
        let mut children = Box::new([Self::with_aabb(low_box), Self::with_aabb(high_box)]);
        children[0].split(low, items_per_node);
        children[1].split(high, items_per_node);
        self.children = Some(children);
    }

    /// Longest extent of the node box: x, then y, then z on ties.
    fn split_axis(&self) -> usize {
        let (w, h, d) = (self.aabb.width(), self.aabb.height(), self.aabb.depth());
        if w > h && w > d {
            0
        } else if h > d {
            1
        } else {
            2
        }
    }

    /// True when `ray` hits any stored triangle, from either side.
    pub fn is_occluded(&self, ray: &Ray) -> bool {
        if ray_aabb(ray, &self.aabb).is_none() {
            return false;
        }

        if self.triangles.iter().any(|t| t.is_hit_by(ray)) {
            return true;
        }

        match &self.children {
            Some(children) => children[0].is_occluded(ray) || children[1].is_occluded(ray),
            None => false,
        }
    }

    /// Triangles whose bounds lie inside `selection`.
    pub fn box_content(&self, selection: &Aabb) -> Vec<&Triangle> {
        let mut out = Vec::new();
        self.collect_box(selection, &mut out, |sel, tri| sel.includes(&tri.aabb));
        out
    }

    /// Triangles whose bounds touch `selection`.
    pub fn box_intersection(&self, selection: &Aabb) -> Vec<&Triangle> {
        let mut out = Vec::new();
        self.collect_box(selection, &mut out, |sel, tri| sel.intersects(&tri.aabb));
        out
    }

    fn collect_box<'a, F>(&'a self, selection: &Aabb, out: &mut Vec<&'a Triangle>, keep: F)
    where
        F: Fn(&Aabb, &Triangle) -> bool + Copy,
    {
        if selection.includes(&self.aabb) {
            out.extend(self.triangles());
        } else if selection.intersects(&self.aabb) {
            out.extend(self.triangles.iter().filter(|t| keep(selection, t)));
            if let Some(children) = &self.children {
                children[0].collect_box(selection, out, keep);
                children[1].collect_box(selection, out, keep);
            }
        }
    }

    /// Every triangle in the tree: this node's own, then each child subtree.
    pub fn triangles(&self) -> Triangles<'_> {
        Triangles {
            pending: vec![self],
            current: [].iter(),
        }
    }

    /// Drop all triangles and reset the bounds.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Bounds of this node.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Triangles stored directly on this node.
    pub fn node_triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// The low and high halves, if this node was split.
    pub fn children(&self) -> Option<(&KdTriTree, &KdTriTree)> {
        self.children.as_deref().map(|[low, high]| (low, high))
    }

    /// Number of triangles in the whole subtree.
    pub fn len(&self) -> usize {
        self.triangles.len()
            + self
                .children()
                .map_or(0, |(low, high)| low.len() + high.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> TreeStats {
        match self.children() {
            None => TreeStats {
                nodes: 1,
                leaves: 1,
                depth: 1,
                triangles: self.triangles.len(),
            },
            Some((low, high)) => {
                let (a, b) = (low.stats(), high.stats());
                TreeStats {
                    nodes: 1 + a.nodes + b.nodes,
                    leaves: a.leaves + b.leaves,
                    depth: 1 + a.depth.max(b.depth),
                    triangles: self.triangles.len() + a.triangles + b.triangles,
                }
            }
        }
    }
}

impl Default for KdTriTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first iterator over the triangles of a [`KdTriTree`].
pub struct Triangles<'a> {
    pending: Vec<&'a KdTriTree>,
    current: std::slice::Iter<'a, Triangle>,
}

impl<'a> Iterator for Triangles<'a> {
    type Item = &'a Triangle;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(triangle) = self.current.next() {
                return Some(triangle);
            }
            let node = self.pending.pop()?;
            self.current = node.triangles.iter();
            if let Some((low, high)) = node.children() {
                self.pending.push(high);
                self.pending.push(low);
            }
        }
    }
}
