//! # Chunk Creation Module
//!
//! A builder that fills a chunk block by block in storage order while keeping
//! the padded block array, the opacity mask and the solid block count
//! consistent with each other.

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_type::BlockType, Block};

use super::{padded_index, Chunk, CHUNK_DIMENSION_WRAPPED, CHUNK_SIZE};

/// A builder for populating a chunk in x-fastest, then y, then z order.
///
/// Positions are tracked in padded (1-based) coordinates so pushes land
/// directly inside the padding ring.
pub struct ChunkCreationIterator {
    chunk: Chunk,
    /// Current X position within the padded chunk (1..CHUNK_DIMENSION_WRAPPED-1)
    local_x: usize,
    /// Current Y position within the padded chunk (1..CHUNK_DIMENSION_WRAPPED-1)
    local_y: usize,
    /// Current Z position within the padded chunk (1..CHUNK_DIMENSION_WRAPPED-1)
    local_z: usize,
    /// Number of blocks pushed so far
    pushed: usize,
}

impl ChunkCreationIterator {
    /// Creates a builder for an all-air chunk at the given chunk position.
    pub fn new(position: Point3<i32>) -> Self {
        ChunkCreationIterator {
            chunk: Chunk::air(position),
            local_x: 1,
            local_y: 1,
            local_z: 1,
            pushed: 0,
        }
    }

    /// Finalizes creation. Positions that were never pushed stay air.
    pub fn return_chunk(self) -> Chunk {
        self.chunk
    }

    /// Whether every interior position has been written.
    pub fn is_complete(&self) -> bool {
        self.pushed >= CHUNK_SIZE as usize
    }

    /// Writes a block at the current position and advances.
    ///
    /// Pushes past the last interior position are ignored.
    pub fn push_block_type(&mut self, block_type: BlockType) {
        if self.is_complete() {
            return;
        }

        let index = padded_index(self.local_x, self.local_y, self.local_z);
        self.chunk.blocks[index] = Block::new(block_type);
        self.chunk.opaque_array.set(index, block_type.is_opaque());
        if !block_type.is_air() {
            self.chunk.solid_block_count += 1;
        }
        self.pushed += 1;

        self.local_x += 1;
        if self.local_x == CHUNK_DIMENSION_WRAPPED - 1 {
            self.local_x = 1;
            self.local_y += 1;
            if self.local_y == CHUNK_DIMENSION_WRAPPED - 1 {
                self.local_y = 1;
                self.local_z += 1;
            }
        }
    }
}
