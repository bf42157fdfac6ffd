//! # Chunk Iteration Module
//!
//! An iterator over the non-air blocks of a chunk, in storage order
//! (x fastest, then y, then z).

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

use super::{padded_index, Chunk, CHUNK_DIMENSION, CHUNK_SIZE};

/// Iterates over `(local position, block)` for every non-air block.
///
/// Once as many blocks as the chunk's solid count have been yielded the
/// iterator stops without scanning the trailing air.
pub struct ChunkBlockIterator<'a> {
    chunk_ref: &'a Chunk,
    /// Linear interior offset of the next position to inspect
    current_offset: usize,
    /// Non-air blocks yielded so far
    yielded: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            current_offset: 0,
            yielded: 0,
        }
    }
}

impl<'a> Iterator for ChunkBlockIterator<'a> {
    type Item = (Point3<usize>, Block);

    fn next(&mut self) -> Option<Self::Item> {
        const DIMENSION: usize = CHUNK_DIMENSION as usize;

        while self.yielded < self.chunk_ref.solid_block_count()
            && self.current_offset < CHUNK_SIZE as usize
        {
            let offset = self.current_offset;
            self.current_offset += 1;

            let x = offset % DIMENSION;
            let y = (offset / DIMENSION) % DIMENSION;
            let z = offset / (DIMENSION * DIMENSION);
            let block = self.chunk_ref.blocks[padded_index(x + 1, y + 1, z + 1)];
            if !block.is_air() {
                self.yielded += 1;
                return Some((Point3::new(x, y, z), block));
            }
        }

        None
    }
}
