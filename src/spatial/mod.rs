//! Spatial partitioning over static triangle meshes.

pub mod kd_tri_tree;
pub mod mesh;

pub use kd_tri_tree::{KdTriTree, Triangle, Triangles, TreeStats};
pub use mesh::{MeshError, Vertex, VertexSet};
