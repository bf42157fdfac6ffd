//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which is responsible for
//! building the per-side vertex and index data of a chunk on a worker. This
//! keeps the main thread responsive while meshing runs.

use std::sync::Arc;

use cgmath::Point3;
use log::{debug, warn};

use crate::{
    core::{MtResource, MtSystem},
    engine_state::{
        meshing::{Mesh, MeshManager},
        streaming::ChunkStreamingManager,
        task_management::task::{Task, TaskEvent, TaskResult},
        voxels::{block::block_side::BlockSide, chunk::Chunk, world::World},
    },
};

use crate::core::injection_system::MtInjectionSystem;

/// A task that generates mesh data for a chunk in a background thread.
///
/// This task is responsible for:
/// 1. Reserving a chunk coordinate index for the chunk
/// 2. Generating vertex and index data for the specified chunk sides
/// 3. Handing the mesh back to the main thread for caching
pub struct ChunkMeshGenerationTask {
    /// Thread-safe reference to the mesh manager
    mesh_manager: MtSystem<MeshManager>,
    /// The chunk that needs mesh generation
    chunk: MtResource<Chunk>,
    /// Which block sides should have their meshes generated
    sides_to_generate: Vec<BlockSide>,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `mesh_manager` - Thread-safe reference to the mesh manager
    /// * `chunk` - The chunk that needs mesh generation
    /// * `sides_to_generate` - List of block sides to generate meshes for
    pub fn new(
        mesh_manager: MtSystem<MeshManager>,
        chunk: MtResource<Chunk>,
        sides_to_generate: Vec<BlockSide>,
    ) -> Self {
        ChunkMeshGenerationTask {
            mesh_manager,
            sides_to_generate,
            chunk,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    /// Builds the mesh on a worker thread.
    ///
    /// The mesh manager lock is released before the chunk is read, so the
    /// two locks are never held together.
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let position = self.chunk.get().position;

        let (strategy, index) = {
            let mut mesh_manager = self.mesh_manager.get_mut();
            (mesh_manager.strategy(), mesh_manager.reserve_index(position))
        };

        let mesh = index.map(|index| {
            let chunk = self.chunk.get();
            let mesh = MeshManager::build_mesh(strategy, &chunk, index, &self.sides_to_generate);
            (index, Arc::new(mesh))
        });

        Box::new(ChunkMeshGenerationTaskResult {
            position,
            chunk: self.chunk.clone(),
            mesh,
        })
    }

    fn failed(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkMeshGenerationFailure {
            position: self.chunk.get().position,
        })
    }
}

/// Handed back when meshing a chunk panicked.
///
/// Marks the mesh task finished and returns an index reserved for a chunk
/// that still has no cached mesh. The chunk keeps its previous mesh, if any,
/// until something requests a new one.
pub struct ChunkMeshGenerationFailure {
    position: Point3<i32>,
}

impl TaskResult for ChunkMeshGenerationFailure {
    fn handle_result(
        self: Box<Self>,
        mt_injection_system: &MtInjectionSystem,
    ) -> (Vec<Box<dyn Task>>, Vec<TaskEvent>) {
        warn!("Meshing of chunk {:?} failed; skipping it", self.position);
        if let Some(streaming) = mt_injection_system.get::<ChunkStreamingManager>() {
            streaming.get_mut().complete_mesh(self.position);
        }
        if let Some(mesh_manager) = mt_injection_system.get::<MeshManager>() {
            let mut mesh_manager = mesh_manager.get_mut();
            if mesh_manager.get_mesh(self.position).is_none() {
                mesh_manager.unload_chunk_positions(&[self.position]);
            }
        }
        (Vec::new(), Vec::new())
    }
}

/// The result of a chunk mesh generation task.
///
/// `mesh` is `None` when no chunk coordinate index could be reserved.
pub struct ChunkMeshGenerationTaskResult {
    position: Point3<i32>,
    /// The chunk the mesh was built from, to detect reloads in the meantime
    chunk: MtResource<Chunk>,
    /// The reserved chunk coordinate index and the mesh stamped with it
    mesh: Option<(u32, Arc<Mesh>)>,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Stores the mesh in the mesh cache, unless its chunk was unloaded or
    /// replaced while the mesh was being built.
    ///
    /// A mesh whose chunk lost its reserved index in the meantime is dropped
    /// and the chunk is queued for another mesh.
    ///
    /// # Returns
    /// No follow-up tasks. A `ChunkMeshed` event when the mesh was stored,
    /// followed by a `ChunkMeshEvicted` event per mesh evicted to make room.
    fn handle_result(
        self: Box<Self>,
        mt_injection_system: &MtInjectionSystem,
    ) -> (Vec<Box<dyn Task>>, Vec<TaskEvent>) {
        let (Some(world), Some(mesh_manager), Some(streaming)) = (
            mt_injection_system.get::<World>(),
            mt_injection_system.get::<MeshManager>(),
            mt_injection_system.get::<ChunkStreamingManager>(),
        ) else {
            warn!("Mesh of chunk {:?} dropped: engine services missing", self.position);
            return (Vec::new(), Vec::new());
        };

        streaming.get_mut().complete_mesh(self.position);

        let current_chunk = world.get().get_chunk_at(self.position);
        let Some(current_chunk) = current_chunk else {
            warn!("Discarding mesh of unloaded chunk {:?}", self.position);
            mesh_manager
                .get_mut()
                .unload_chunk_positions(&[self.position]);
            return (Vec::new(), Vec::new());
        };
        if !current_chunk.ptr_eq(&self.chunk) {
            warn!("Discarding mesh of replaced chunk {:?}", self.position);
            return (Vec::new(), Vec::new());
        }

        let Some((index, mesh)) = self.mesh else {
            warn!(
                "No chunk index available for {:?}; mesh requeued",
                self.position
            );
            streaming.get_mut().request_mesh(self.position);
            return (Vec::new(), Vec::new());
        };

        let stored = mesh_manager
            .get_mut()
            .store_mesh(self.position, index, mesh.clone());
        let Some(evicted) = stored else {
            warn!(
                "Chunk index {} of {:?} was recycled while meshing; mesh requeued",
                index, self.position
            );
            streaming.get_mut().request_mesh(self.position);
            return (Vec::new(), Vec::new());
        };
        debug!(
            "Stored mesh of chunk {:?} ({} faces)",
            self.position,
            mesh.face_count()
        );

        let mut events = vec![TaskEvent::ChunkMeshed {
            position: self.position,
            mesh,
        }];
        events.extend(evicted.into_iter().map(TaskEvent::ChunkMeshEvicted));

        (Vec::new(), events)
    }
}
