//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which handles asynchronous
//! generation of chunk data. This task is scheduled by the streamer when the
//! player moves and new chunks come into range.

use std::sync::Arc;

use cgmath::Point3;
use log::{debug, warn};

use crate::{
    core::injection_system::MtInjectionSystem,
    engine_state::{
        streaming::ChunkStreamingManager,
        task_management::task::{Task, TaskEvent, TaskResult},
        voxels::{chunk::Chunk, generation::TerrainGenerator, world::World},
    },
};

/// A task that generates chunk data asynchronously.
///
/// This task is responsible for:
/// 1. Generating the chunk data at the specified position on a worker
/// 2. Adding the chunk to the world on the main thread, if it is still wanted
/// 3. Requesting meshes for the chunk and the neighbours whose borders changed
pub struct ChunkGenerationTask {
    /// Shared, immutable terrain generator
    generator: Arc<TerrainGenerator>,
    /// The position of the chunk to generate (in chunk coordinates)
    position: Point3<i32>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `generator` - The terrain generator shared by all generation tasks
    /// * `position` - The chunk coordinates where the chunk should be generated
    pub fn new(generator: Arc<TerrainGenerator>, position: Point3<i32>) -> Self {
        ChunkGenerationTask {
            generator,
            position,
        }
    }
}

impl Task for ChunkGenerationTask {
    /// Generates the chunk. Touches no shared state.
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationTaskResult {
            chunk: self.generator.generate(self.position),
        })
    }

    fn failed(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationFailure {
            position: self.position,
        })
    }
}

/// Handed back when generating a chunk panicked.
///
/// Clears the chunk's pending mark. The position is not requeued, so it
/// stays missing until the streaming center moves again.
pub struct ChunkGenerationFailure {
    position: Point3<i32>,
}

impl TaskResult for ChunkGenerationFailure {
    fn handle_result(
        self: Box<Self>,
        mt_injection_system: &MtInjectionSystem,
    ) -> (Vec<Box<dyn Task>>, Vec<TaskEvent>) {
        warn!("Generation of chunk {:?} failed; skipping it", self.position);
        if let Some(streaming) = mt_injection_system.get::<ChunkStreamingManager>() {
            streaming.get_mut().complete_generation(self.position);
        }
        (Vec::new(), Vec::new())
    }
}

/// The result of a chunk generation task.
///
/// This contains the generated chunk data, which is moved into the world when
/// the result is handled.
pub struct ChunkGenerationTaskResult {
    chunk: Chunk,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Inserts the chunk into the world and requests the meshes it affects.
    ///
    /// Chunks that left the keep range while generating are dropped.
    ///
    /// # Returns
    /// No follow-up tasks; a `ChunkGenerated` event if the chunk was inserted.
    fn handle_result(
        self: Box<Self>,
        mt_injection_system: &MtInjectionSystem,
    ) -> (Vec<Box<dyn Task>>, Vec<TaskEvent>) {
        let position = self.chunk.position;
        let (Some(world), Some(streaming)) = (
            mt_injection_system.get::<World>(),
            mt_injection_system.get::<ChunkStreamingManager>(),
        ) else {
            warn!("Chunk {:?} dropped: engine services missing", position);
            return (Vec::new(), Vec::new());
        };

        if !streaming.get_mut().complete_generation(position) {
            warn!("Discarding chunk {:?}: no longer in range", position);
            return (Vec::new(), Vec::new());
        }

        let updated_neighbours = {
            let mut world = world.get_mut();
            if world.contains_chunk(position) {
                debug!("Chunk {:?} already loaded", position);
                return (Vec::new(), Vec::new());
            }
            world.insert_chunk(self.chunk)
        };

        let mut streaming = streaming.get_mut();
        streaming.request_mesh(position);
        for neighbour in updated_neighbours {
            streaming.request_mesh(neighbour);
        }

        (Vec::new(), vec![TaskEvent::ChunkGenerated(position)])
    }
}
