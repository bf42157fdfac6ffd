//! Mesh data structures and operations for chunk meshes.
//!
//! This module provides the core data structures for working with chunk meshes.
//! It handles the conversion from faces to renderer-friendly vertex and index
//! buffers, kept separately per block side so whole sides can be skipped when
//! they face away from the camera.

use cgmath::Point3;

use crate::engine_state::{
    meshing::{vertex::Vertex, MeshingStrategy},
    voxels::{
        block::{block_side::BlockSide, Block},
        chunk::Chunk,
    },
};

use super::{culling, face::Face, greedy};

/// Represents a single side of a mesh with its associated vertices and indices.
///
/// Each `MeshSide` corresponds to one of the six possible block faces and contains
/// the vertex and index data needed to render that face.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSide {
    /// The vertex data for this mesh side
    pub vertices: Vec<Vertex>,
    /// The index data for this mesh side
    pub indices: Vec<u32>,
    /// The number of indices in this mesh side
    pub len: u32,
    /// Which block side this mesh represents
    pub side: BlockSide,
}

impl MeshSide {
    /// Creates a new, empty `MeshSide` for the specified block side.
    pub fn new(side: BlockSide) -> Self {
        MeshSide {
            vertices: Vec::new(),
            indices: Vec::new(),
            len: 0,
            side,
        }
    }

    /// Number of quads on this side.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Represents a complete mesh for a voxel chunk with all six possible sides.
///
/// The mesh contains separate vertex and index buffers for each side of the blocks,
/// allowing a renderer to skip the sides that face away from the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Array of mesh sides, indexed by `BlockSide` enum values.
    /// The order matches the `BlockSide` enum variant order.
    pub mesh: [MeshSide; 6],
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    /// Creates a new, empty mesh with all sides initialized.
    pub fn new() -> Self {
        Mesh {
            mesh: BlockSide::all().map(MeshSide::new),
        }
    }

    /// Builds the mesh of `chunk` with the given strategy.
    pub fn build(
        strategy: MeshingStrategy,
        chunk: &Chunk,
        index: u32,
        sides: &[BlockSide],
    ) -> Self {
        match strategy {
            MeshingStrategy::Greedy => Self::greedy_sided(chunk, index, sides),
            MeshingStrategy::Culled => Self::culled_sided(chunk, index, sides),
        }
    }

    /// Generates a mesh for the specified chunk using greedy meshing for the given sides.
    ///
    /// # Arguments
    /// * `chunk` - The chunk to generate the mesh for
    /// * `index` - The chunk coordinate index stamped into every vertex
    /// * `sides` - A list of block sides to generate mesh data for
    pub fn greedy_sided(chunk: &Chunk, index: u32, sides: &[BlockSide]) -> Self {
        greedy::greedy_sided(chunk, index, sides)
    }

    /// Generates a mesh with one quad per visible block face.
    pub fn culled_sided(chunk: &Chunk, index: u32, sides: &[BlockSide]) -> Self {
        culling::culled_sided(chunk, index, sides)
    }

    /// Appends one face to the side it belongs to.
    pub fn add_face(&mut self, face: &Face, chunk_coordinate_index: u32) {
        let mesh_side = &mut self.mesh[face.block_side as usize];
        let num_faces_generated = mesh_side.face_count() as u32;

        mesh_side
            .vertices
            .extend(Self::generate_face_vertices(face, chunk_coordinate_index));
        mesh_side
            .indices
            .extend(Self::generate_face_indices(num_faces_generated));
        mesh_side.len = mesh_side.indices.len() as u32;
    }

    fn to_vertex_position(point: Point3<usize>) -> Point3<i32> {
        Point3::new(point.x as i32, point.y as i32, point.z as i32)
    }

    /// Generates vertex data for a single face.
    ///
    /// # Arguments
    /// * `face` - The face to generate vertices for
    /// * `chunk_coordinate_index` - The index of the chunk this face belongs to
    ///
    /// # Returns
    /// The four corners of the face, ordered ll, lr, ul, ur, so they form two
    /// triangles when combined with the indices from `generate_face_indices`.
    /// Texture coordinates span the face's size, in blocks.
    pub fn generate_face_vertices(face: &Face, chunk_coordinate_index: u32) -> [Vertex; 4] {
        let texture_index = Block::new(face.block_type).texture_index(face.block_side);
        let (width, height) = face.dimensions();
        let (u_offset, v_offset) = (width as u8, height as u8);

        [
            Vertex::new(
                Self::to_vertex_position(face.ll),
                texture_index,
                0,
                v_offset,
                chunk_coordinate_index,
            ),
            Vertex::new(
                Self::to_vertex_position(face.lr),
                texture_index,
                u_offset,
                v_offset,
                chunk_coordinate_index,
            ),
            Vertex::new(
                Self::to_vertex_position(face.ul),
                texture_index,
                0,
                0,
                chunk_coordinate_index,
            ),
            Vertex::new(
                Self::to_vertex_position(face.ur),
                texture_index,
                u_offset,
                0,
                chunk_coordinate_index,
            ),
        ]
    }

    /// Generates index data for a face, adjusted by the number of previously generated faces.
    ///
    /// # Returns
    /// Six indices forming the triangles (ll, lr, ur) and (ll, ur, ul).
    pub fn generate_face_indices(num_faces_generated: u32) -> [u32; 6] {
        [
            (num_faces_generated * 4),
            1 + num_faces_generated * 4,
            3 + num_faces_generated * 4,
            (num_faces_generated * 4),
            3 + num_faces_generated * 4,
            2 + num_faces_generated * 4,
        ]
    }

    /// Gets the number of vertices for each side of the mesh.
    ///
    /// # Returns
    /// An array containing the vertex count for each `BlockSide` in the order defined by the `BlockSide` enum.
    pub fn get_vertex_lens(&self) -> [u64; 6] {
        self.mesh.each_ref().map(|side| side.vertices.len() as u64)
    }

    pub fn side(&self, side: BlockSide) -> &MeshSide {
        &self.mesh[side as usize]
    }

    /// Whether no side has any geometry.
    pub fn is_empty(&self) -> bool {
        self.mesh.iter().all(MeshSide::is_empty)
    }

    pub fn face_count(&self) -> usize {
        self.mesh.iter().map(MeshSide::face_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.face_count() * 2
    }
}
