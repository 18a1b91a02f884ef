//! Per-vertex ambient occlusion baked against a [`KdTriTree`].
//!
//! Each triangle casts `samples_per_triangle` rays from random points on its
//! surface into random directions of its outer hemisphere. The fraction of
//! rays that escape the scene is spread over the triangle's vertices, then
//! smoothed across neighbouring triangles.
//!
//! Triangles are independent, so with the `parallel` feature they are sampled
//! on the rayon thread pool. Every triangle draws from its own seeded RNG and
//! the result does not depend on scheduling.

use std::collections::HashMap;

use glam::{Mat3, Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::math::Ray;
use crate::spatial::{KdTriTree, Vertex, VertexSet};

/// Settings for an occlusion bake.
#[derive(Debug, Clone)]
pub struct OcclusionConfig {
    /// Rays cast per triangle. Default: 64.
    pub samples_per_triangle: u32,
    /// Distance ray origins are lifted off the surface, in mesh space. Default: 0.01.
    pub surface_offset: f32,
    /// Neighbour-averaging passes after sampling. Default: 5.
    pub smoothing_passes: u32,
    /// Base seed; triangle `i` samples with `seed ^ i`. Default: 0.
    pub seed: u64,
}

impl Default for OcclusionConfig {
    fn default() -> Self {
        Self {
            samples_per_triangle: 64,
            surface_offset: 0.01,
            smoothing_passes: 5,
            seed: 0,
        }
    }
}

/// Bakes occlusion for meshes against an optimized occluder tree.
pub struct OcclusionBaker<'a> {
    tree: &'a KdTriTree,
    config: OcclusionConfig,
}

impl<'a> OcclusionBaker<'a> {
    pub fn new(tree: &'a KdTriTree, config: OcclusionConfig) -> Self {
        Self { tree, config }
    }

    pub fn config(&self) -> &OcclusionConfig {
        &self.config
    }

    /// Openness of every vertex of `mesh` placed at `world`: 1 when nothing
    /// blocks its hemisphere, 0 when everything does.
    ///
    /// Vertices no triangle references are reported as 0.
    pub fn bake(&self, world: &Mat4, mesh: &VertexSet) -> Vec<f32> {
        self.bake_many(&[(*world, mesh)]).pop().unwrap_or_default()
    }

    /// Bake several placed meshes together, one result per mesh.
    ///
    /// Vertices are merged across meshes as well as within them, so meshes
    /// that meet edge to edge (terrain blocks, split props) share values
    /// along the seam. Triangle `i` of the concatenated meshes samples with
    /// `seed ^ i`.
    pub fn bake_many(&self, meshes: &[(Mat4, &VertexSet)]) -> Vec<Vec<f32>> {
        let batch = Batch::new(meshes);
        let free = self.sample_triangles(&batch.sources);

        let vertex_count = batch.keys.len();
        let mut occlusion = spread_to_vertices(vertex_count, &batch.triangles, &free);
        batch.merge_coincident(&mut occlusion);

        for _ in 0..self.config.smoothing_passes {
            let means: Vec<f32> = batch
                .triangles
                .iter()
                .map(|tri| tri.iter().map(|&i| occlusion[i]).sum::<f32>() / 3.0)
                .collect();
            occlusion = spread_to_vertices(vertex_count, &batch.triangles, &means);
            batch.merge_coincident(&mut occlusion);
        }

        tracing::debug!(
            meshes = meshes.len(),
            vertices = vertex_count,
            triangles = batch.triangles.len(),
            samples = self.config.samples_per_triangle,
            "occlusion baked"
        );

        let mut rest = occlusion.as_slice();
        meshes
            .iter()
            .map(|(_, mesh)| {
                let (head, tail) = rest.split_at(mesh.vertices().len());
                rest = tail;
                head.to_vec()
            })
            .collect()
    }

    fn sample_triangles(&self, sources: &[TriangleSource<'_>]) -> Vec<f32> {
        #[cfg(feature = "parallel")]
        let free: Vec<f32> = sources
            .par_iter()
            .enumerate()
            .map(|(index, source)| self.sample_triangle(source, index))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let free = self.sample_triangles_serial(sources);
        free
    }

    #[cfg(any(test, not(feature = "parallel")))]
    fn sample_triangles_serial(&self, sources: &[TriangleSource<'_>]) -> Vec<f32> {
        sources
            .iter()
            .enumerate()
            .map(|(index, source)| self.sample_triangle(source, index))
            .collect()
    }

    /// Fraction of unoccluded rays leaving one triangle.
    fn sample_triangle(&self, source: &TriangleSource<'_>, index: usize) -> f32 {
        let samples = self.config.samples_per_triangle;
        if samples == 0 {
            return 1.0;
        }

        let [v0, v1, v2] = source.corners;
        let world = source.world;

        // Zero-area triangles get a zero normal and cast rays along their edge.
        let tangent = (v1 - v0).normalize_or_zero();
        let normal = tangent
            .cross((v2 - v1).normalize_or_zero())
            .normalize_or_zero();
        let bitangent = normal.cross(tangent).normalize_or_zero();
        let frame = Mat3::from_cols(tangent, bitangent, normal);
        let lift = normal * self.config.surface_offset;

        let mut rng = StdRng::seed_from_u64(self.config.seed ^ index as u64);
        let mut free = 0u32;

        for _ in 0..samples {
            // Uniform direction on the hemisphere around +Z, then into the frame.
            let u: f32 = rng.gen();
            let theta = std::f32::consts::TAU * rng.gen::<f32>();
            let (sin, cos) = theta.sin_cos();
            let mu = (1.0 - u * u).sqrt();
            let direction = frame * Vec3::new(mu * cos, mu * sin, u);

            // Uniform point on the triangle.
            let (mut s0, mut s1): (f32, f32) = (rng.gen(), rng.gen());
            if s0 + s1 > 1.0 {
                s0 = 1.0 - s0;
                s1 = 1.0 - s1;
            }
            let s2 = 1.0 - s0 - s1;
            let position = v0 * s0 + v1 * s1 + v2 * s2 + lift;

            let ray = Ray::new(
                world.transform_point3(position),
                world.transform_vector3(direction),
            );
            if !self.tree.is_occluded(&ray) {
                free += 1;
            }
        }

        free as f32 / samples as f32
    }
}

/// One triangle to sample: mesh-space corners and the mesh's placement.
struct TriangleSource<'m> {
    world: &'m Mat4,
    corners: [Vec3; 3],
}

/// The meshes of one bake concatenated into a single vertex range.
struct Batch<'m> {
    /// World-space position and normal bits per vertex.
    keys: Vec<[u32; 6]>,
    triangles: Vec<[usize; 3]>,
    sources: Vec<TriangleSource<'m>>,
}

impl<'m> Batch<'m> {
    fn new(meshes: &'m [(Mat4, &VertexSet)]) -> Self {
        let mut batch = Self {
            keys: Vec::new(),
            triangles: Vec::new(),
            sources: Vec::new(),
        };

        for (world, mesh) in meshes {
            let base = batch.keys.len();
            let vertices = mesh.vertices();
            batch.keys.extend(vertices.iter().map(|v| vertex_key(world, v)));

            for triangle in mesh.triangles() {
                let local = triangle.map(usize::from);
                batch.triangles.push(local.map(|i| base + i));
                batch.sources.push(TriangleSource {
                    world,
                    corners: local.map(|i| vertices[i].position()),
                });
            }
        }
        batch
    }

    /// Give vertices sharing a position and normal their mean value, so seams
    /// between split vertices do not show.
    fn merge_coincident(&self, values: &mut [f32]) {
        let mut referenced = vec![false; self.keys.len()];
        for &i in self.triangles.iter().flatten() {
            referenced[i] = true;
        }

        let mut groups: HashMap<[u32; 6], Vec<usize>> = HashMap::new();
        for (i, key) in self.keys.iter().enumerate() {
            if referenced[i] {
                groups.entry(*key).or_default().push(i);
            }
        }

        for members in groups.values().filter(|m| m.len() > 1) {
            let mean = members.iter().map(|&i| values[i]).sum::<f32>() / members.len() as f32;
            for &i in members {
                values[i] = mean;
            }
        }
    }
}

/// Average per-triangle values into the vertices each triangle references.
fn spread_to_vertices(vertex_count: usize, triangles: &[[usize; 3]], values: &[f32]) -> Vec<f32> {
    let mut sums = vec![0.0f32; vertex_count];
    let mut counts = vec![0u32; vertex_count];

    for (triangle, &value) in triangles.iter().zip(values) {
        for &i in triangle {
            sums[i] += value;
            counts[i] += 1;
        }
    }

    for (sum, &count) in sums.iter_mut().zip(&counts) {
        if count > 0 {
            *sum /= count as f32;
        }
    }
    sums
}

fn vertex_key(world: &Mat4, vertex: &Vertex) -> [u32; 6] {
    let position = world.transform_point3(vertex.position());
    let normal = world.transform_vector3(Vec3::from_array(vertex.normal));
    // `+ 0.0` folds -0.0 into 0.0 so equal floats hash equally.
    let [px, py, pz] = position.to_array().map(|v| (v + 0.0).to_bits());
    let [nx, ny, nz] = normal.to_array().map(|v| (v + 0.0).to_bits());
    [px, py, pz, nx, ny, nz]
}
