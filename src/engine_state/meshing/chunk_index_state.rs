//! Maps meshed chunk positions to compact indices.
//!
//! Every meshed chunk gets a small integer index that is stamped into its
//! vertices, so a renderer can keep one table of chunk coordinates and look
//! a vertex's chunk up by index. The pool of indices is bounded; freed indices
//! are handed out again.

use std::collections::{HashMap, VecDeque};

use cgmath::Point3;

/// Manages the mapping between chunk positions and chunk coordinate indices.
#[derive(Debug)]
pub struct ChunkIndexState {
    chunk_position_to_index: HashMap<Point3<i32>, u32>,
    available_chunk_indices: VecDeque<u32>,
}

impl ChunkIndexState {
    /// A pool of `capacity` indices, `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            chunk_position_to_index: HashMap::with_capacity(capacity),
            available_chunk_indices: (0..capacity as u32).collect(),
        }
    }

    /// Returns the indices of the given positions to the pool.
    pub fn unload_chunk_positions(&mut self, chunk_positions: &[Point3<i32>]) {
        for pos in chunk_positions.iter() {
            if let Some(available_index) = self.chunk_position_to_index.remove(pos) {
                self.available_chunk_indices.push_back(available_index);
            }
        }
    }

    /// Index for `position`, allocating one if it has none yet.
    ///
    /// Returns `None` when the pool is exhausted.
    pub fn load_chunk_position(&mut self, position: Point3<i32>) -> Option<u32> {
        if let Some(index) = self.chunk_position_to_index.get(&position) {
            return Some(*index);
        }

        let index = self.available_chunk_indices.pop_front()?;
        self.chunk_position_to_index.insert(position, index);
        Some(index)
    }

    pub fn can_allocate_index(&self) -> bool {
        !self.available_chunk_indices.is_empty()
    }

    pub fn get_index_for_position(&self, chunk_position: Point3<i32>) -> Option<u32> {
        self.chunk_position_to_index.get(&chunk_position).copied()
    }

    pub fn allocated_count(&self) -> usize {
        self.chunk_position_to_index.len()
    }
}
