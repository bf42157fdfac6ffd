//! # World Module
//!
//! This module provides the `World` struct which manages the loaded chunks of
//! the voxel world and keeps their neighbour rings in sync.
//!
//! ## Architecture
//!
//! The world is sparse: only chunks the streaming manager asked for are kept
//! in memory. Generation happens elsewhere (on worker threads); the world only
//! stores finished chunks.
//!
//! ## Border Synchronisation
//!
//! Each chunk carries a copy of the touching layer of its six face
//! neighbours. Inserting a chunk fills its ring from the loaded neighbours and
//! refreshes theirs. Editing a block on a chunk edge refreshes the neighbour
//! across that edge. Removing a chunk resets the facing layer of its
//! neighbours' rings to AIR.
//!
//! ## Performance Considerations
//!
//! - Chunks are stored in thread-safe containers to enable concurrent access
//! - Chunk lookup is O(1) using a hash map

use crate::core::MtResource;
use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType, Block};
use crate::engine_state::voxels::chunk::{Chunk, CHUNK_DIMENSION};
use crate::error::EngineError;
use cgmath::Point3;
use std::collections::HashMap;

/// Converts a world block position to the position of the chunk holding it.
pub fn world_to_chunk_position(world_pos: Point3<i32>) -> Point3<i32> {
    Point3::new(
        world_pos.x.div_euclid(CHUNK_DIMENSION),
        world_pos.y.div_euclid(CHUNK_DIMENSION),
        world_pos.z.div_euclid(CHUNK_DIMENSION),
    )
}

/// Converts a world block position to its local position inside its chunk.
pub fn world_to_local_position(world_pos: Point3<i32>) -> Point3<usize> {
    Point3::new(
        world_pos.x.rem_euclid(CHUNK_DIMENSION) as usize,
        world_pos.y.rem_euclid(CHUNK_DIMENSION) as usize,
        world_pos.z.rem_euclid(CHUNK_DIMENSION) as usize,
    )
}

/// Represents a voxel world composed of multiple chunks.
///
/// The world is stored as a sparse 3D grid of chunks, where each chunk is a 16x16x16
/// collection of blocks.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_globe::engine_state::voxels::{chunk::Chunk, world::World};
///
/// let mut world = World::new();
/// world.insert_chunk(Chunk::empty(&Point3::new(0, 0, 0)));
/// assert!(world.get_chunk_at(Point3::new(0, 0, 0)).is_some());
/// ```
#[derive(Default)]
pub struct World {
    /// A mapping from chunk coordinates to chunk data.
    /// Chunks are stored in a thread-safe reference-counted wrapper to allow
    /// shared access between systems.
    chunks: HashMap<Point3<i32>, MtResource<Chunk>>,
}

impl World {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        World {
            chunks: HashMap::new(),
        }
    }

    /// Stores `chunk`, replacing any chunk already at its position, and
    /// exchanges border layers with every loaded face neighbour.
    ///
    /// # Returns
    ///
    /// The positions of the neighbours whose rings were updated. Their meshes
    /// may now be stale.
    pub fn insert_chunk(&mut self, mut chunk: Chunk) -> Vec<Point3<i32>> {
        let position = chunk.position;
        let mut updated_neighbors = Vec::new();

        for side in BlockSide::all() {
            let neighbor_pos = position + side.offset();
            let Some(neighbor) = self.chunks.get(&neighbor_pos) else {
                continue;
            };

            chunk.copy_border_from(&neighbor.get(), side);
            neighbor.get_mut().copy_border_from(&chunk, side.opposite());
            updated_neighbors.push(neighbor_pos);
        }

        self.chunks.insert(position, MtResource::new(chunk));
        updated_neighbors
    }

    /// Removes the chunk at `position` and resets the ring of every loaded
    /// face neighbour on the side facing it back to AIR.
    ///
    /// # Returns
    ///
    /// The positions of the neighbours whose rings were cleared. Empty if no
    /// chunk was loaded at `position`.
    pub fn remove_chunk(&mut self, position: Point3<i32>) -> Vec<Point3<i32>> {
        if self.chunks.remove(&position).is_none() {
            return Vec::new();
        }

        let mut cleared_neighbors = Vec::new();
        for side in BlockSide::all() {
            let neighbor_pos = position + side.offset();
            if let Some(neighbor) = self.chunks.get(&neighbor_pos) {
                neighbor.get_mut().clear_border(side.opposite());
                cleared_neighbors.push(neighbor_pos);
            }
        }
        cleared_neighbors
    }

    /// Retrieves the chunk at the specified chunk coordinates.
    ///
    /// # Returns
    ///
    /// A clone of the `MtResource<Chunk>` if the chunk exists, or `None` if not.
    ///
    /// # Thread Safety
    ///
    /// The returned chunk is wrapped in a thread-safe reference-counted container,
    /// allowing it to be safely shared between systems and threads.
    pub fn get_chunk_at(&self, pos: Point3<i32>) -> Option<MtResource<Chunk>> {
        self.chunks.get(&pos).cloned()
    }

    pub fn contains_chunk(&self, pos: Point3<i32>) -> bool {
        self.chunks.contains_key(&pos)
    }

    /// Positions of every loaded chunk, in no particular order.
    pub fn loaded_positions(&self) -> Vec<Point3<i32>> {
        self.chunks.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The block at a world position, or `None` if its chunk is not loaded.
    pub fn get_block(&self, world_pos: Point3<i32>) -> Option<Block> {
        let chunk = self.chunks.get(&world_to_chunk_position(world_pos))?;
        let local = world_to_local_position(world_pos);
        chunk.get().get_block(local.x, local.y, local.z).ok()
    }

    /// Sets the block at a world position.
    ///
    /// # Returns
    ///
    /// Every chunk whose mesh must be rebuilt: the owner first, then each
    /// loaded neighbour whose ring mirrors the edited cell.
    ///
    /// # Errors
    ///
    /// `EngineError::ChunkNotLoaded` if the owning chunk is not loaded.
    pub fn set_block(
        &mut self,
        world_pos: Point3<i32>,
        block_type: BlockType,
    ) -> Result<Vec<Point3<i32>>, EngineError> {
        let chunk_pos = world_to_chunk_position(world_pos);
        let local = world_to_local_position(world_pos);
        let owner = self
            .chunks
            .get(&chunk_pos)
            .ok_or(EngineError::ChunkNotLoaded(chunk_pos))?
            .clone();

        owner.get_mut().set_block(local.x, local.y, local.z, block_type)?;
        let mut affected = vec![chunk_pos];

        let last = CHUNK_DIMENSION as usize - 1;
        for side in BlockSide::all() {
            let axis_coord = match side {
                BlockSide::FRONT | BlockSide::BACK => local.x,
                BlockSide::BOTTOM | BlockSide::TOP => local.y,
                BlockSide::LEFT | BlockSide::RIGHT => local.z,
            };
            let on_edge = match side {
                BlockSide::FRONT | BlockSide::BOTTOM | BlockSide::LEFT => axis_coord == 0,
                BlockSide::BACK | BlockSide::TOP | BlockSide::RIGHT => axis_coord == last,
            };
            if !on_edge {
                continue;
            }

            let neighbor_pos = chunk_pos + side.offset();
            if let Some(neighbor) = self.chunks.get(&neighbor_pos) {
                neighbor
                    .get_mut()
                    .copy_border_from(&owner.get(), side.opposite());
                affected.push(neighbor_pos);
            }
        }

        Ok(affected)
    }
}
