//! Collision Core
//!
//! Swept sphere/box collision shapes and a triangle kd-tree for occlusion
//! queries.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **math** - Spheres, boxes, rays and the intersection routines between them
//! 2. **collision** - Compound shapes with a two-pose history for swept tests
//! 3. **spatial** - Indexed meshes and the kd-tree of world-space triangles
//! 4. **occlusion** - Per-vertex ambient occlusion baked against a kd-tree
//!    (sampling runs on rayon with feature = "parallel")

pub mod collision;
pub mod math;
pub mod occlusion;
pub mod spatial;

// Re-export commonly used types
pub use collision::{CollisionShape, TimeSlot};
pub use math::{Aabb, Ray, Sphere};
pub use occlusion::{OcclusionBaker, OcclusionConfig};
pub use spatial::{KdTriTree, MeshError, TreeStats, Triangle, Vertex, VertexSet};

// Re-export glam for convenience
pub use glam;
