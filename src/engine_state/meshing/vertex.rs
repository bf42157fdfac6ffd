//! Vertex data structures for voxel meshes.
//!
//! This module defines the vertex format produced by the meshers. The layout is
//! plain old data so a renderer can upload a `&[Vertex]` as bytes.

use cgmath::Point3;

/// A vertex of a chunk mesh.
///
/// Represents a single point in chunk-local space with associated texture and
/// chunk information.
///
/// # Memory Layout
/// - Position: 3x i32 (12 bytes)
/// - Texture Index: u32 (4 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Chunk Coordinate Index: u32 (4 bytes)
///
/// Total size: 28 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// X coordinate in chunk space
    x: i32,
    /// Y coordinate in chunk space
    y: i32,
    /// Z coordinate in chunk space
    z: i32,
    /// Index of the texture in the texture array
    texture_index: u32,
    /// Texture coordinates, in blocks. A merged quad repeats its texture.
    tex_coords: [f32; 2],
    /// Index of this vertex's chunk in the chunk coordinate table
    chunk_coordinate_index: u32,
}

impl Vertex {
    /// Creates a new vertex with the given parameters.
    ///
    /// # Arguments
    /// * `pos` - The position of the vertex in chunk space
    /// * `texture_index` - Index of the texture in the texture array
    /// * `u` - U texture coordinate (0-255)
    /// * `v` - V texture coordinate (0-255)
    /// * `chunk_coordinate_index` - Index into the chunk coordinate table
    pub fn new(
        pos: Point3<i32>,
        texture_index: usize,
        u: u8,
        v: u8,
        chunk_coordinate_index: u32,
    ) -> Self {
        Vertex {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            texture_index: texture_index as u32,
            tex_coords: [u as f32, v as f32],
            chunk_coordinate_index,
        }
    }

    pub fn position(&self) -> Point3<i32> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn texture_index(&self) -> u32 {
        self.texture_index
    }

    pub fn tex_coords(&self) -> [f32; 2] {
        self.tex_coords
    }

    pub fn chunk_coordinate_index(&self) -> u32 {
        self.chunk_coordinate_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_28_bytes_of_plain_data() {
        assert_eq!(std::mem::size_of::<Vertex>(), 28);
        let vertices = [Vertex::new(Point3::new(1, 2, 3), 4, 5, 6, 7)];
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&vertices).len(), 28);
        assert_eq!(vertices[0].position(), Point3::new(1, 2, 3));
        assert_eq!(vertices[0].tex_coords(), [5.0, 6.0]);
    }
}
