//! Mesh generation for chunks.
//!
//! This module converts chunk data into per-side vertex and index buffers.
//! Two meshers are available: a face-culling mesher that emits one quad per
//! visible block face, and a greedy mesher that merges coplanar faces of the
//! same type into larger quads.
//!
//! # Architecture
//! - [`Mesh`]: The main structure representing a complete mesh with vertices and indices
//! - [`Face`]: Represents a single quad with its corners and properties
//! - [`greedy_sided`] / [`culled_sided`]: the two meshers
//!
//! # Usage
//! ```
//! use cgmath::Point3;
//! use voxel_globe::engine_state::{
//!     meshing::mesh::Mesh,
//!     voxels::{block::{block_side::BlockSide, block_type::BlockType}, chunk::Chunk},
//! };
//!
//! let chunk = Chunk::solid(&Point3::new(0, 0, 0), BlockType::STONE);
//! let mesh = Mesh::greedy_sided(&chunk, 0, &BlockSide::all());
//! assert_eq!(mesh.face_count(), 6);
//! ```

mod culling;
mod face;
mod greedy;
mod mesh;

pub use culling::culled_sided;
pub use face::Face;
pub use greedy::greedy_sided;
pub use mesh::*;
