//! Mesh generation and management for chunks.
//!
//! This module turns chunk data into per-side meshes and keeps the most
//! recently meshed chunks in a bounded cache.
//!
//! # Architecture
//! - `MeshManager`: Main interface for mesh generation and caching
//! - `ChunkIndexState`: Tracks chunk positions and their chunk coordinate indices
//! - `mesh/`: Contains the core mesh generation algorithms
//! - `tasks/`: The worker task that builds meshes off the main thread
//!
//! # Caching
//! Meshes are kept in an LRU cache keyed by chunk position. Each cached mesh
//! owns one index from the bounded index pool; when the pool runs dry the least
//! recently used mesh is evicted and its index recycled.

use std::num::NonZeroUsize;
use std::sync::Arc;

use cgmath::Point3;
use chunk_index_state::ChunkIndexState;
use log::debug;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use web_time::Instant;

pub mod chunk_index_state;
pub mod mesh;
pub mod tasks;
pub mod vertex;

pub use mesh::Mesh;
pub use vertex::Vertex;

use crate::{
    config::MeshingConfig,
    engine_state::voxels::{block::block_side::BlockSide, chunk::Chunk},
};

/// Which mesher builds chunk meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshingStrategy {
    /// Merge coplanar faces of the same type into larger quads.
    #[default]
    Greedy,
    /// One quad per visible block face.
    Culled,
}

/// Snapshot of the mesh cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshStats {
    pub cached_meshes: usize,
    pub capacity: usize,
    pub total_faces: usize,
    pub total_vertices: usize,
    pub meshes_built: u64,
    pub evictions: u64,
}

/// Central manager for chunk meshes.
///
/// The `MeshManager` is responsible for:
/// - Converting chunk data into mesh geometry with the configured strategy
/// - Handing out chunk coordinate indices from a bounded pool
/// - Caching built meshes and evicting the least recently used ones
/// - Dropping meshes of unloaded chunks
pub struct MeshManager {
    strategy: MeshingStrategy,
    /// Tracks chunk positions and their corresponding chunk coordinate indices
    chunk_index_state: ChunkIndexState,
    /// LRU cache of meshed chunks
    least_recently_meshed_chunks: LruCache<Point3<i32>, Arc<Mesh>>,
    /// Positions evicted by `reserve_index` and not yet reported
    pending_evictions: Vec<Point3<i32>>,
    meshes_built: u64,
    evictions: u64,
}

impl MeshManager {
    /// Creates a new mesh manager holding at most `capacity` meshes.
    pub fn new(strategy: MeshingStrategy, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        MeshManager {
            strategy,
            chunk_index_state: ChunkIndexState::new(capacity.get()),
            least_recently_meshed_chunks: LruCache::new(capacity),
            pending_evictions: Vec::new(),
            meshes_built: 0,
            evictions: 0,
        }
    }

    pub fn from_config(config: &MeshingConfig) -> Self {
        Self::new(config.strategy, config.max_meshed_chunks)
    }

    pub fn strategy(&self) -> MeshingStrategy {
        self.strategy
    }

    /// Builds a mesh for a chunk. Does not touch any manager state, so it is
    /// safe to call on a worker without holding the manager lock.
    ///
    /// # Arguments
    ///
    /// * `strategy` - Which mesher to run
    /// * `chunk` - The chunk to mesh
    /// * `index` - The chunk coordinate index stamped into the vertices
    /// * `sides` - Which block sides to generate
    pub fn build_mesh(
        strategy: MeshingStrategy,
        chunk: &Chunk,
        index: u32,
        sides: &[BlockSide],
    ) -> Mesh {
        let start = Instant::now();
        let mesh = Mesh::build(strategy, chunk, index, sides);
        debug!(
            "Built {:?} mesh for chunk {:?} ({} faces) in {:?}",
            strategy,
            chunk.position,
            mesh.face_count(),
            start.elapsed()
        );
        mesh
    }

    /// Returns the chunk coordinate index of `position`, allocating one if
    /// needed.
    ///
    /// When the pool is exhausted the least recently used mesh is evicted to
    /// free an index. The evicted positions are reported by the next
    /// successful `store_mesh` call. Returns `None` only if every index is reserved by a
    /// chunk that has no mesh yet.
    pub fn reserve_index(&mut self, position: Point3<i32>) -> Option<u32> {
        if let Some(index) = self.chunk_index_state.get_index_for_position(position) {
            return Some(index);
        }

        while !self.chunk_index_state.can_allocate_index() {
            let (lru_chunk_position, _) = self.least_recently_meshed_chunks.pop_lru()?;
            self.chunk_index_state
                .unload_chunk_positions(&[lru_chunk_position]);
            self.pending_evictions.push(lru_chunk_position);
            self.evictions += 1;
            debug!("Evicted mesh of chunk {:?}", lru_chunk_position);
        }

        self.chunk_index_state.load_chunk_position(position)
    }

    /// Caches the mesh of `position`, replacing any previous one.
    ///
    /// `index` is the chunk coordinate index the mesh was built with. If
    /// `position` no longer owns that index (it was evicted after the
    /// reservation, and the index may already belong to another chunk) the
    /// mesh is dropped.
    ///
    /// # Returns
    ///
    /// `None` if the mesh was dropped. Otherwise every position whose mesh was
    /// evicted since the last successful call.
    pub fn store_mesh(
        &mut self,
        position: Point3<i32>,
        index: u32,
        mesh: Arc<Mesh>,
    ) -> Option<Vec<Point3<i32>>> {
        if self.chunk_index_state.get_index_for_position(position) != Some(index) {
            debug!(
                "Mesh of chunk {:?} built with index {} no longer owned; dropped",
                position, index
            );
            return None;
        }

        if let Some((evicted, _)) = self.least_recently_meshed_chunks.push(position, mesh) {
            if evicted != position {
                self.chunk_index_state.unload_chunk_positions(&[evicted]);
                self.pending_evictions.push(evicted);
                self.evictions += 1;
            }
        }
        self.meshes_built += 1;

        Some(std::mem::take(&mut self.pending_evictions))
    }

    /// The cached mesh of a chunk, without touching its recency.
    pub fn get_mesh(&self, chunk_position: Point3<i32>) -> Option<Arc<Mesh>> {
        self.least_recently_meshed_chunks.peek(&chunk_position).cloned()
    }

    /// Checks if a chunk has been meshed, marking it as recently used if so.
    pub fn is_chunk_meshed(&mut self, chunk_position: Point3<i32>) -> bool {
        self.least_recently_meshed_chunks
            .get(&chunk_position)
            .is_some()
    }

    pub fn index_for(&self, chunk_position: Point3<i32>) -> Option<u32> {
        self.chunk_index_state.get_index_for_position(chunk_position)
    }

    /// Drops the meshes and indices of the given chunks.
    pub fn unload_chunk_positions(&mut self, chunk_positions: &[Point3<i32>]) {
        for position in chunk_positions {
            self.least_recently_meshed_chunks.pop(position);
        }
        self.chunk_index_state
            .unload_chunk_positions(chunk_positions);
    }

    /// Positions with a cached mesh, most recently used first.
    pub fn meshed_positions(&self) -> Vec<Point3<i32>> {
        self.least_recently_meshed_chunks
            .iter()
            .map(|(position, _)| *position)
            .collect()
    }

    pub fn stats(&self) -> MeshStats {
        let (total_faces, total_vertices) = self
            .least_recently_meshed_chunks
            .iter()
            .fold((0, 0), |(faces, vertices), (_, mesh)| {
                let mesh_vertices: u64 = mesh.get_vertex_lens().iter().sum();
                (faces + mesh.face_count(), vertices + mesh_vertices as usize)
            });

        MeshStats {
            cached_meshes: self.least_recently_meshed_chunks.len(),
            capacity: self.least_recently_meshed_chunks.cap().get(),
            total_faces,
            total_vertices,
            meshes_built: self.meshes_built,
            evictions: self.evictions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn solid_mesh(position: Point3<i32>, index: u32) -> Arc<Mesh> {
        let chunk = Chunk::solid(&position, BlockType::STONE);
        Arc::new(MeshManager::build_mesh(
            MeshingStrategy::Greedy,
            &chunk,
            index,
            &BlockSide::all(),
        ))
    }

    fn stamped_index(mesh: &Mesh) -> Option<u32> {
        BlockSide::all().into_iter().find_map(|side| {
            mesh.side(side)
                .vertices
                .first()
                .map(|vertex| vertex.chunk_coordinate_index())
        })
    }

    #[test]
    fn stored_meshes_are_retrievable() {
        let mut manager = MeshManager::new(MeshingStrategy::Greedy, 4);
        let position = Point3::new(1, 2, 3);
        assert_eq!(manager.reserve_index(position), Some(0));
        assert_eq!(manager.store_mesh(position, 0, solid_mesh(position, 0)), Some(Vec::new()));

        assert!(manager.is_chunk_meshed(position));
        assert_eq!(manager.get_mesh(position).map(|m| m.face_count()), Some(6));
        assert_eq!(manager.stats().cached_meshes, 1);
        assert_eq!(manager.stats().total_faces, 6);
    }

    #[test]
    fn full_cache_evicts_least_recently_used() {
        let mut manager = MeshManager::new(MeshingStrategy::Culled, 2);
        let a = Point3::new(0, 0, 0);
        let b = Point3::new(1, 0, 0);
        let c = Point3::new(2, 0, 0);

        for position in [a, b] {
            let index = manager.reserve_index(position).unwrap();
            manager.store_mesh(position, index, solid_mesh(position, index));
        }
        // Touch a so b becomes the eviction candidate.
        assert!(manager.is_chunk_meshed(a));

        let index = manager.reserve_index(c);
        assert_eq!(index, Some(1));
        assert_eq!(manager.store_mesh(c, 1, solid_mesh(c, 1)), Some(vec![b]));
        assert!(!manager.is_chunk_meshed(b));
        assert_eq!(manager.stats().evictions, 1);
    }

    #[test]
    fn reservations_without_meshes_cannot_be_evicted() {
        let mut manager = MeshManager::new(MeshingStrategy::Greedy, 1);
        assert_eq!(manager.reserve_index(Point3::new(0, 0, 0)), Some(0));
        assert_eq!(manager.reserve_index(Point3::new(5, 0, 0)), None);
    }

    #[test]
    fn mesh_built_with_a_recycled_index_is_dropped() {
        let mut manager = MeshManager::new(MeshingStrategy::Greedy, 2);
        let a = Point3::new(0, 0, 0);
        let b = Point3::new(1, 0, 0);
        let c = Point3::new(2, 0, 0);

        for position in [a, c] {
            let index = manager.reserve_index(position).unwrap();
            manager.store_mesh(position, index, solid_mesh(position, index));
        }
        assert!(manager.is_chunk_meshed(c));

        // A remesh of a reserves its current index, then b takes it over.
        assert_eq!(manager.reserve_index(a), Some(0));
        assert_eq!(manager.reserve_index(b), Some(0));
        assert_eq!(manager.index_for(a), None);

        assert_eq!(manager.store_mesh(a, 0, solid_mesh(a, 0)), None);
        assert_eq!(manager.store_mesh(b, 0, solid_mesh(b, 0)), Some(vec![a]));

        assert!(manager.get_mesh(a).is_none());
        assert_eq!(manager.index_for(a), None);
        assert_eq!(manager.index_for(b), Some(0));
        assert_eq!(manager.index_for(c), Some(1));
        for position in manager.meshed_positions() {
            let mesh = manager.get_mesh(position).unwrap();
            assert_eq!(stamped_index(&mesh), manager.index_for(position));
        }
    }

    #[test]
    fn unloading_frees_index_and_mesh() {
        let mut manager = MeshManager::new(MeshingStrategy::Greedy, 1);
        let a = Point3::new(0, 0, 0);
        manager.reserve_index(a);
        manager.store_mesh(a, 0, solid_mesh(a, 0));
        manager.unload_chunk_positions(&[a]);

        assert!(manager.get_mesh(a).is_none());
        assert!(manager.meshed_positions().is_empty());
        assert_eq!(manager.reserve_index(Point3::new(9, 9, 9)), Some(0));
    }

    #[test]
    fn strategy_names_are_snake_case() {
        let strategy: MeshingStrategy = serde_json::from_str("\"culled\"").unwrap();
        assert_eq!(strategy, MeshingStrategy::Culled);
        assert_eq!(MeshingStrategy::default(), MeshingStrategy::Greedy);
    }
}
