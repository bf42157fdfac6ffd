//! # Chunk Module
//!
//! This module provides the `Chunk` struct and related functionality for managing
//! 16x16x16 blocks of voxel data.
//!
//! ## Padded Storage
//!
//! Every chunk stores an 18x18x18 block array: the 16x16x16 interior plus a one
//! block thick ring holding copies of the touching layers of the six face
//! neighbours. Face visibility at chunk edges can therefore be decided without
//! going back to the world.
//!
//! - `blocks`: dense padded array, `i + 18 * j + 324 * k` (x fastest, then y, then z)
//! - `opaque_array`: a padded bit vector (1 bit per block) mirroring `is_opaque`
//!   of `blocks`
//!
//! A ring facing a neighbour that is not loaded holds air, so edge faces are
//! emitted until the neighbour arrives and the ring is refreshed.
//!
//! ### Performance Characteristics
//! - **Opacity Check**: O(1) - Just check the bit in `opaque_array`
//! - **Block Lookup**: O(1) - Direct index into `blocks`
//! - **Memory Usage**: 5832 bytes of blocks + 729 bytes of mask per chunk

use bitvec::prelude::BitVec;
use cgmath::Point3;

use chunk_creation::ChunkCreationIterator;
use chunk_iteration::ChunkBlockIterator;

use super::block::block_side::BlockSide;
use super::block::block_type::BlockType;
use super::block::Block;
use crate::error::EngineError;

pub mod chunk_creation;
pub mod chunk_iteration;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;
/// The dimension of a chunk including an extra layer of blocks on each side for neighbor lookups.
pub const CHUNK_DIMENSION_WRAPPED: usize = (CHUNK_DIMENSION + 2) as usize;
/// The number of blocks in a wrapped 2D chunk plane.
pub const CHUNK_PLANE_SIZE_WRAPPED: usize = CHUNK_DIMENSION_WRAPPED * CHUNK_DIMENSION_WRAPPED;
/// The total number of blocks in a wrapped chunk.
pub const CHUNK_SIZE_WRAPPED: usize = CHUNK_PLANE_SIZE_WRAPPED * CHUNK_DIMENSION_WRAPPED;
/// Smallest chunk coordinate whose blocks have `i32` world coordinates.
pub const MIN_CHUNK_COORDINATE: i32 = i32::MIN / CHUNK_DIMENSION;
/// Largest chunk coordinate whose blocks have `i32` world coordinates.
pub const MAX_CHUNK_COORDINATE: i32 = i32::MAX / CHUNK_DIMENSION;

/// Whether every block of the chunk at `position` has `i32` world coordinates.
pub fn is_chunk_in_bounds(position: Point3<i32>) -> bool {
    let range = MIN_CHUNK_COORDINATE..=MAX_CHUNK_COORDINATE;
    range.contains(&position.x) && range.contains(&position.y) && range.contains(&position.z)
}

/// Index into the padded arrays. Coordinates are padded, so the interior
/// spans `1..=CHUNK_DIMENSION` on every axis.
#[inline]
pub const fn padded_index(i: usize, j: usize, k: usize) -> usize {
    i + CHUNK_DIMENSION_WRAPPED * j + CHUNK_PLANE_SIZE_WRAPPED * k
}

/// Represents a 16x16x16 collection of voxel blocks in the world.
///
/// Chunks are the fundamental unit of world storage, meshing and streaming.
/// Each chunk knows its position in chunk coordinates and owns its padded
/// block data.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point3<i32>,

    /// Padded dense block storage, including the neighbour ring.
    pub(crate) blocks: Vec<Block>,

    /// One bit per padded cell, set when the block there is opaque.
    pub(crate) opaque_array: BitVec,

    /// Number of non-air blocks in the interior.
    pub(crate) solid_block_count: usize,
}

impl Chunk {
    /// An all-air chunk with an all-air neighbour ring.
    pub(crate) fn air(position: Point3<i32>) -> Self {
        let mut opaque_array = BitVec::with_capacity(CHUNK_SIZE_WRAPPED);
        opaque_array.resize(CHUNK_SIZE_WRAPPED, false);

        Chunk {
            position,
            blocks: vec![Block::AIR; CHUNK_SIZE_WRAPPED],
            opaque_array,
            solid_block_count: 0,
        }
    }

    /// Creates a new, completely empty chunk (all blocks are air).
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    pub fn empty(position: &Point3<i32>) -> Self {
        ChunkCreationIterator::new(*position).return_chunk()
    }

    /// Creates a new chunk completely filled with `block_type`.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `block_type` - The block type to fill with
    pub fn solid(position: &Point3<i32>, block_type: BlockType) -> Self {
        let mut cci = ChunkCreationIterator::new(*position);

        for _ in 0..CHUNK_SIZE {
            cci.push_block_type(block_type);
        }

        cci.return_chunk()
    }

    /// Creates a new chunk with a 3D checkerboard pattern.
    ///
    /// The pattern alternates between dirt and air, so no two dirt blocks
    /// share a face. The block at local `(0, 0, 0)` is dirt.
    pub fn checkerboard(position: &Point3<i32>) -> Self {
        let mut push_air = false;

        let mut cci = ChunkCreationIterator::new(*position);
        for i in 0..CHUNK_SIZE {
            if push_air {
                cci.push_block_type(BlockType::AIR);
            } else {
                cci.push_block_type(BlockType::DIRT);
            }

            push_air = !push_air;

            if (i + 1) % CHUNK_DIMENSION == 0 {
                push_air = !push_air
            }

            if (i + 1) % CHUNK_PLANE_SIZE == 0 {
                push_air = !push_air
            }
        }

        cci.return_chunk()
    }

    fn check_bounds(x: usize, y: usize, z: usize) -> Result<(), EngineError> {
        let dimension = CHUNK_DIMENSION as usize;
        if x >= dimension || y >= dimension || z >= dimension {
            return Err(EngineError::OutOfBounds { x, y, z });
        }
        Ok(())
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Errors
    /// `EngineError::OutOfBounds` if any coordinate is not in `0..CHUNK_DIMENSION`.
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> Result<Block, EngineError> {
        Self::check_bounds(x, y, z)?;
        Ok(self.blocks[padded_index(x + 1, y + 1, z + 1)])
    }

    /// Replaces the block at the specified chunk-relative coordinates.
    ///
    /// Keeps the opacity mask and the solid block count in step. Neighbouring
    /// chunks' rings are not touched here; `World::set_block` does that.
    ///
    /// # Errors
    /// `EngineError::OutOfBounds` if any coordinate is not in `0..CHUNK_DIMENSION`.
    pub fn set_block(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        block_type: BlockType,
    ) -> Result<(), EngineError> {
        Self::check_bounds(x, y, z)?;

        let index = padded_index(x + 1, y + 1, z + 1);
        let was_air = self.blocks[index].is_air();
        self.blocks[index] = Block::new(block_type);
        self.opaque_array.set(index, block_type.is_opaque());

        match (was_air, block_type.is_air()) {
            (true, false) => self.solid_block_count += 1,
            (false, true) => self.solid_block_count -= 1,
            _ => {}
        }
        Ok(())
    }

    /// Block at padded coordinates, ring included.
    #[inline]
    pub fn block_at_padded(&self, i: usize, j: usize, k: usize) -> Block {
        self.blocks[padded_index(i, j, k)]
    }

    /// Checks if the block at the specified padded coordinates is opaque.
    ///
    /// # Arguments
    /// * `cx` - X coordinate within the padded chunk
    /// * `cy` - Y coordinate within the padded chunk
    /// * `cz` - Z coordinate within the padded chunk
    #[inline]
    pub fn is_block_opaque(&self, cx: usize, cy: usize, cz: usize) -> bool {
        self.opaque_array[padded_index(cx, cy, cz)]
    }

    /// Number of non-air blocks in the interior.
    pub fn solid_block_count(&self) -> usize {
        self.solid_block_count
    }

    /// Whether the interior is all air.
    pub fn is_empty(&self) -> bool {
        self.solid_block_count == 0
    }

    /// Iterates over the non-air interior blocks in storage order.
    pub fn blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    /// Whether the face of the interior block at padded `(i, j, k)` on `side`
    /// is hidden by the block across it.
    #[inline]
    pub fn is_face_occluded(&self, i: usize, j: usize, k: usize, side: BlockSide) -> bool {
        let offset = side.offset();
        let ni = (i as i32 + offset.x) as usize;
        let nj = (j as i32 + offset.y) as usize;
        let nk = (k as i32 + offset.z) as usize;

        if self.is_block_opaque(ni, nj, nk) {
            return true;
        }
        self.block_at_padded(ni, nj, nk)
            .occludes_face_of(&self.block_at_padded(i, j, k))
    }

    /// Determines which faces of the block at (x,y,z) are hidden by their neighbour.
    ///
    /// Neighbours across the chunk edge are read from the padding ring.
    ///
    /// # Arguments
    /// * `x` - X coordinate within the chunk
    /// * `y` - Y coordinate within the chunk
    /// * `z` - Z coordinate within the chunk
    ///
    /// # Returns
    /// An array of 6 booleans in `BlockSide` order, `true` where the face is
    /// occluded and should not be meshed.
    pub fn generate_adjacent_blocks(&self, x: usize, y: usize, z: usize) -> [bool; 6] {
        //This accounts for the chunk wrapping
        let i = x + 1;
        let j = y + 1;
        let k = z + 1;

        let mut adjacency_data = [false; 6];
        for side in BlockSide::all() {
            adjacency_data[side as usize] = self.is_face_occluded(i, j, k, side);
        }
        adjacency_data
    }

    /// Padded coordinates of cell `(a, b)` in the layer at `fixed` along
    /// `side`'s axis. The two free axes keep x, y, z order.
    fn layer_cell(side: BlockSide, fixed: usize, a: usize, b: usize) -> (usize, usize, usize) {
        match side {
            BlockSide::FRONT | BlockSide::BACK => (fixed, a + 1, b + 1),
            BlockSide::BOTTOM | BlockSide::TOP => (a + 1, fixed, b + 1),
            BlockSide::LEFT | BlockSide::RIGHT => (a + 1, b + 1, fixed),
        }
    }

    fn is_negative_side(side: BlockSide) -> bool {
        matches!(side, BlockSide::FRONT | BlockSide::BOTTOM | BlockSide::LEFT)
    }

    /// Returns this chunk's own outermost interior layer on `side`, as
    /// `CHUNK_PLANE_SIZE` blocks.
    pub fn border_layer(&self, side: BlockSide) -> Vec<Block> {
        let dimension = CHUNK_DIMENSION as usize;
        let fixed = if Self::is_negative_side(side) { 1 } else { dimension };

        let mut layer = Vec::with_capacity(CHUNK_PLANE_SIZE as usize);
        for b in 0..dimension {
            for a in 0..dimension {
                let (i, j, k) = Self::layer_cell(side, fixed, a, b);
                layer.push(self.block_at_padded(i, j, k));
            }
        }
        layer
    }

    /// Overwrites the padding ring on `side` with `layer`, laid out as
    /// returned by `border_layer`.
    fn write_padding(&mut self, side: BlockSide, layer: &[Block]) {
        let dimension = CHUNK_DIMENSION as usize;
        let fixed = if Self::is_negative_side(side) {
            0
        } else {
            CHUNK_DIMENSION_WRAPPED - 1
        };

        for b in 0..dimension {
            for a in 0..dimension {
                let block = layer[a + dimension * b];
                let (i, j, k) = Self::layer_cell(side, fixed, a, b);
                let index = padded_index(i, j, k);
                self.blocks[index] = block;
                self.opaque_array.set(index, block.is_opaque());
            }
        }
    }

    /// Copies the layer of `neighbor` that touches this chunk into the
    /// padding ring on `side`.
    ///
    /// `neighbor` is expected to sit at `position + side.offset()`.
    pub fn copy_border_from(&mut self, neighbor: &Chunk, side: BlockSide) {
        let layer = neighbor.border_layer(side.opposite());
        self.write_padding(side, &layer);
    }

    /// Resets the padding ring on `side` to air.
    pub fn clear_border(&mut self, side: BlockSide) {
        let layer = vec![Block::AIR; CHUNK_PLANE_SIZE as usize];
        self.write_padding(side, &layer);
    }
}
