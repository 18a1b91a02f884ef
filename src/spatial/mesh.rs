//! Indexed triangle-list meshes fed to the spatial structures.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Errors raised while assembling a [`VertexSet`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("index count {0} is not a multiple of 3")]
    IndexCountNotTriangleList(usize),

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: usize },

    #[error("buffer of {len} bytes is not a whole number of {stride}-byte elements")]
    BufferSize { len: usize, stride: usize },
}

/// Vertex with position and normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// A vertex list with a 16-bit triangle-list index buffer.
///
/// Every index is in range and the index count is a multiple of three; both
/// are checked on construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexSet {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

impl VertexSet {
    /// Build a vertex set, validating the index buffer.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u16>) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::IndexCountNotTriangleList(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| usize::from(i) >= vertices.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }
        Ok(Self { vertices, indices })
    }

    /// Build a vertex set from packed native-endian buffers, as laid out in
    /// GPU vertex/index buffers.
    pub fn from_bytes(vertex_bytes: &[u8], index_bytes: &[u8]) -> Result<Self, MeshError> {
        let vertices = read_packed::<Vertex>(vertex_bytes)?;
        let indices = read_packed::<u16>(index_bytes)?;
        Self::new(vertices, indices)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Index triplets, one per triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [u16; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.iter().map(Vertex::position)
    }
}

fn read_packed<T: Pod>(bytes: &[u8]) -> Result<Vec<T>, MeshError> {
    let stride = std::mem::size_of::<T>();
    if bytes.len() % stride != 0 {
        return Err(MeshError::BufferSize {
            len: bytes.len(),
            stride,
        });
    }
    Ok(bytes
        .chunks_exact(stride)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}
