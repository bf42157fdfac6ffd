//! # Engine State Module
//!
//! The core engine module that ties the voxel world, meshing, streaming and
//! the worker pool together.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `camera_state` - Camera pose, projection and frustum
//! * `meshing` - Chunk meshers and the mesh cache
//! * `streaming` - Which chunks to load, mesh, unload and draw
//! * `task_management` - Manages asynchronous tasks and worker threads
//! * `voxels` - Handles voxel data, chunks, and world generation
//!
//! ## Architecture
//!
//! The world, the mesh manager and the streaming manager are long-lived
//! services registered in an `MtInjectionSystem`. Workers only generate and
//! mesh; every change to shared state happens while handling task results on
//! the main thread, inside `EngineState::frame`.
//!
//! ## Frame
//!
//! 1. Update the camera and the visible block sides
//! 2. On a chunk change, unload far chunks, remesh the neighbours they
//!    bordered and rebuild the load queue
//! 3. Publish the per-frame budget of generation and mesh tasks
//! 4. Handle completed tasks and hand queued tasks to idle workers
//! 5. Recompute the visible chunk set

use std::{collections::HashSet, sync::Arc, thread, time::Duration};

use camera_state::{CameraState, CameraUpdates};
use cgmath::{Point3, Rad};
use log::{debug, info};
use meshing::{
    tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask, Mesh, MeshManager, MeshStats,
};
use streaming::{
    visibility::{compute_visible_chunks, VisibleChunk},
    ChunkStreamingManager, StreamingStats,
};
use task_management::{task::TaskEvent, TaskManager};
use voxels::{
    block::{block_side::BlockSide, block_type::BlockType, Block},
    generation::TerrainGenerator,
    tasks::chunk_generation_task::ChunkGenerationTask,
    world::World,
};
use web_time::Instant;

use crate::{
    config::EngineConfig,
    core::{injection_system::MtInjectionSystem, MtSystem},
    error::EngineError,
};

pub mod camera_state;
pub mod meshing;
pub mod streaming;
pub mod task_management;
pub mod voxels;

/// Sleep between task polls in `wait_until_idle`.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// What happened during one call to `EngineState::frame`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Frames run so far, including this one
    pub frame: u64,
    pub player_chunk: Point3<i32>,
    pub chunks_unloaded: usize,
    pub generation_requests: usize,
    pub mesh_requests: usize,
    pub chunks_generated: usize,
    pub chunks_meshed: usize,
    pub loaded_chunks: usize,
    pub meshed_chunks: usize,
    pub visible_chunks: usize,
    /// Tasks queued or running after the frame
    pub pending_tasks: usize,
    pub frame_time: Duration,
}

/// Work published and completed by one pump of the task pipeline.
#[derive(Debug, Default)]
struct PumpStats {
    generation_requests: usize,
    mesh_requests: usize,
    chunks_generated: usize,
    chunks_meshed: usize,
}

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use cgmath::{Deg, Point3};
/// use voxel_globe::{config::EngineConfig, engine_state::EngineState};
///
/// let mut engine = EngineState::new(EngineConfig::default())?;
/// engine.frame(Point3::new(0.0, 20.0, 0.0), Deg(0.0), Deg(-10.0));
/// engine.wait_until_idle(Duration::from_secs(5));
/// for chunk in engine.visible_chunks() {
///     let _mesh = engine.get_mesh(chunk.position);
/// }
/// # Ok::<(), voxel_globe::error::EngineError>(())
/// ```
pub struct EngineState {
    config: EngineConfig,
    /// Camera state managing position and orientation
    camera_state: CameraState,
    /// Task manager for asynchronous operations
    task_manager: TaskManager,
    /// The voxel world containing all chunk data
    world: MtSystem<World>,
    mesh_manager: MtSystem<MeshManager>,
    streaming: MtSystem<ChunkStreamingManager>,
    generator: Arc<TerrainGenerator>,
    /// Block sides facing the view direction
    visible_sides: Vec<BlockSide>,
    visible_chunks: Vec<VisibleChunk>,
    /// Current chunk position of the player
    current_player_chunk_position: Option<Point3<i32>>,
    frame_count: u64,
}

impl EngineState {
    /// Creates a new engine state with all subsystems initialized.
    ///
    /// # Errors
    ///
    /// `EngineError::Config` if the configuration does not validate.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let mt_injection_system = MtInjectionSystem::new();
        let world = mt_injection_system.insert(World::new());
        let mesh_manager = mt_injection_system.insert(MeshManager::from_config(&config.meshing));
        let streaming =
            mt_injection_system.insert(ChunkStreamingManager::new(config.streaming.clone()));

        let task_manager = TaskManager::new(config.tasks.num_workers, mt_injection_system);
        let generator = Arc::new(TerrainGenerator::from_config(&config.world));

        info!(
            "Engine started: {} workers, {:?} generation (seed {}), {:?} meshing, render distance {}",
            task_manager.num_workers(),
            generator.method(),
            generator.seed(),
            config.meshing.strategy,
            config.streaming.render_distance
        );

        Ok(Self {
            camera_state: CameraState::new(&config.camera),
            config,
            task_manager,
            world,
            mesh_manager,
            streaming,
            generator,
            visible_sides: BlockSide::all().to_vec(),
            visible_chunks: Vec::new(),
            current_player_chunk_position: None,
            frame_count: 0,
        })
    }

    /// Runs one frame with the camera at the given pose.
    ///
    /// # Arguments
    ///
    /// * `position` - Camera position in world space
    /// * `yaw` - Horizontal rotation; 0 looks along +X
    /// * `pitch` - Vertical rotation, clamped short of straight up/down
    pub fn frame<Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        &mut self,
        position: Point3<f32>,
        yaw: Y,
        pitch: P,
    ) -> FrameStats {
        let start = Instant::now();
        self.frame_count += 1;

        let CameraUpdates {
            new_visible_sides,
            new_chunk_position,
        } = self.camera_state.set_pose(position, yaw, pitch);
        self.visible_sides = new_visible_sides;

        let mut chunks_unloaded = 0;
        if self.current_player_chunk_position != Some(new_chunk_position) {
            chunks_unloaded = self.recenter(new_chunk_position);
            self.current_player_chunk_position = Some(new_chunk_position);
        }

        let pump = self.pump_tasks();
        self.update_visible_chunks();

        let stats = FrameStats {
            frame: self.frame_count,
            player_chunk: new_chunk_position,
            chunks_unloaded,
            generation_requests: pump.generation_requests,
            mesh_requests: pump.mesh_requests,
            chunks_generated: pump.chunks_generated,
            chunks_meshed: pump.chunks_meshed,
            loaded_chunks: self.world.get().len(),
            meshed_chunks: self.mesh_manager.get().stats().cached_meshes,
            visible_chunks: self.visible_chunks.len(),
            pending_tasks: self.task_manager.pending_count(),
            frame_time: start.elapsed(),
        };
        debug!("Frame {}: {:?}", stats.frame, stats);
        stats
    }

    /// Moves the streaming center and unloads the chunks that fell out of range.
    ///
    /// Loaded chunks that bordered an unloaded one are remeshed, since their
    /// edge faces toward it are now exposed.
    ///
    /// # Returns
    /// The number of chunks unloaded.
    fn recenter(&mut self, center: Point3<i32>) -> usize {
        let loaded = self.world.get().loaded_positions();
        let to_unload = self.streaming.get_mut().update_center(center, &loaded);
        if to_unload.is_empty() {
            return 0;
        }

        let exposed: HashSet<Point3<i32>> = {
            let mut world = self.world.get_mut();
            let cleared: Vec<Point3<i32>> = to_unload
                .iter()
                .flat_map(|position| world.remove_chunk(*position))
                .collect();
            cleared
                .into_iter()
                .filter(|position| world.contains_chunk(*position))
                .collect()
        };
        self.mesh_manager
            .get_mut()
            .unload_chunk_positions(&to_unload);
        {
            let mut streaming = self.streaming.get_mut();
            for position in to_unload.iter() {
                streaming.forget(*position);
            }
            for position in exposed {
                streaming.request_mesh(position);
            }
        }

        debug!("Unloaded {} chunks around {:?}", to_unload.len(), center);
        to_unload.len()
    }

    /// Publishes budgeted generation and mesh work, then handles completed
    /// tasks and feeds queued ones to idle workers.
    fn pump_tasks(&mut self) -> PumpStats {
        let mut stats = PumpStats::default();

        let generation_batch = self.streaming.get_mut().next_generation_batch();
        stats.generation_requests = generation_batch.len();
        for position in generation_batch {
            self.task_manager.publish_task(Box::new(ChunkGenerationTask::new(
                self.generator.clone(),
                position,
            )));
        }

        let mesh_batch = self.streaming.get_mut().next_mesh_batch();
        for position in mesh_batch {
            let chunk = self.world.get().get_chunk_at(position);
            match chunk {
                Some(chunk) => {
                    self.task_manager
                        .publish_task(Box::new(ChunkMeshGenerationTask::new(
                            self.mesh_manager.clone(),
                            chunk,
                            BlockSide::all().to_vec(),
                        )));
                    stats.mesh_requests += 1;
                }
                None => {
                    debug!("Mesh request for unloaded chunk {:?} dropped", position);
                    self.streaming.get_mut().complete_mesh(position);
                }
            }
        }

        for event in self.task_manager.process_completed_tasks() {
            match event {
                TaskEvent::ChunkGenerated(_) => stats.chunks_generated += 1,
                TaskEvent::ChunkMeshed { .. } => stats.chunks_meshed += 1,
                TaskEvent::ChunkMeshEvicted(position) => {
                    debug!("Mesh of chunk {:?} was evicted", position)
                }
            }
        }
        self.task_manager.process_queued_tasks();

        stats
    }

    fn update_visible_chunks(&mut self) {
        let candidates: Vec<(Point3<i32>, Arc<Mesh>)> = {
            let mesh_manager = self.mesh_manager.get();
            mesh_manager
                .meshed_positions()
                .into_iter()
                .filter_map(|position| {
                    mesh_manager
                        .get_mesh(position)
                        .map(|mesh| (position, mesh))
                })
                .collect()
        };

        self.visible_chunks = compute_visible_chunks(
            &candidates,
            &self.camera_state.camera,
            &self.camera_state.frustum(),
            &self.config,
        );

        // Keep drawn meshes at the front of the LRU.
        let mut mesh_manager = self.mesh_manager.get_mut();
        for chunk in self.visible_chunks.iter() {
            mesh_manager.is_chunk_meshed(chunk.position);
        }
    }

    /// Sets a block and queues remeshes of every chunk the edit touches.
    ///
    /// # Returns
    /// The chunks queued for remeshing, owner first.
    ///
    /// # Errors
    /// `EngineError::ChunkNotLoaded` if the block's chunk is not loaded.
    pub fn set_block(
        &mut self,
        world_pos: Point3<i32>,
        block_type: BlockType,
    ) -> Result<Vec<Point3<i32>>, EngineError> {
        let affected = self.world.get_mut().set_block(world_pos, block_type)?;

        let mut streaming = self.streaming.get_mut();
        for position in affected.iter() {
            streaming.request_mesh(*position);
        }
        Ok(affected)
    }

    /// The block at a world position, if its chunk is loaded.
    pub fn get_block(&self, world_pos: Point3<i32>) -> Option<Block> {
        self.world.get().get_block(world_pos)
    }

    /// Chunks to draw this frame, front to back.
    pub fn visible_chunks(&self) -> &[VisibleChunk] {
        &self.visible_chunks
    }

    /// Block sides facing the view direction.
    pub fn visible_sides(&self) -> &[BlockSide] {
        &self.visible_sides
    }

    pub fn get_mesh(&self, chunk_position: Point3<i32>) -> Option<Arc<Mesh>> {
        self.mesh_manager.get().get_mesh(chunk_position)
    }

    pub fn world(&self) -> &MtSystem<World> {
        &self.world
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn camera_state(&self) -> &CameraState {
        &self.camera_state
    }

    pub fn mesh_stats(&self) -> MeshStats {
        self.mesh_manager.get().stats()
    }

    pub fn streaming_stats(&self) -> StreamingStats {
        self.streaming.get().stats()
    }

    /// Whether streaming has nothing left to do and no task is queued or running.
    pub fn is_idle(&self) -> bool {
        self.streaming.get().is_idle() && self.task_manager.is_idle()
    }

    /// Pumps tasks without moving the camera until the engine is idle.
    ///
    /// # Returns
    /// `true` if the engine went idle, `false` if `timeout` ran out first.
    pub fn wait_until_idle(&mut self, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            self.pump_tasks();
            if self.is_idle() {
                self.update_visible_chunks();
                debug!("Engine idle after {:?}", start.elapsed());
                return true;
            }
            if start.elapsed() >= timeout {
                self.update_visible_chunks();
                return false;
            }
            thread::sleep(IDLE_POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::generation::ChunkGenerationMethod;
    use cgmath::Deg;

    fn small_config(method: ChunkGenerationMethod) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.world.generation_method = method;
        config.streaming.render_distance = 1;
        config.streaming.vertical_render_distance = 0;
        config.streaming.unload_margin = 0;
        config.tasks.num_workers = 2;
        config.meshing.max_meshed_chunks = 16;
        config
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = small_config(ChunkGenerationMethod::Solid);
        config.streaming.max_mesh_requests_per_frame = 0;
        assert!(matches!(
            EngineState::new(config),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn first_frame_requests_generation_budget() {
        let mut config = small_config(ChunkGenerationMethod::Solid);
        config.streaming.max_generation_requests_per_frame = 2;
        let mut engine = EngineState::new(config).unwrap();

        let stats = engine.frame(Point3::new(8.0, 8.0, 8.0), Deg(0.0), Deg(0.0));
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.player_chunk, Point3::new(0, 0, 0));
        assert_eq!(stats.generation_requests, 2);
        assert!(engine.wait_until_idle(Duration::from_secs(10)));
        assert_eq!(engine.world().get().len(), 5);
    }

    #[test]
    fn unloading_a_neighbour_exposes_the_facing_edge() {
        let mut config = small_config(ChunkGenerationMethod::Solid);
        config.meshing.strategy = meshing::MeshingStrategy::Culled;
        let mut engine = EngineState::new(config).unwrap();
        let origin = Point3::new(0, 0, 0);

        engine.frame(Point3::new(8.0, 8.0, 8.0), Deg(0.0), Deg(0.0));
        assert!(engine.wait_until_idle(Duration::from_secs(10)));
        // Only the top and bottom layers face unloaded chunks.
        assert_eq!(engine.get_mesh(origin).unwrap().face_count(), 2 * 256);

        let stats = engine.frame(Point3::new(24.0, 8.0, 8.0), Deg(0.0), Deg(0.0));
        assert_eq!(stats.chunks_unloaded, 3);
        assert!(engine.wait_until_idle(Duration::from_secs(10)));

        assert!(!engine.world().get().contains_chunk(Point3::new(-1, 0, 0)));
        assert_eq!(engine.get_mesh(origin).unwrap().face_count(), 5 * 256);
    }

    #[test]
    fn set_block_outside_loaded_world_fails() {
        let mut engine = EngineState::new(small_config(ChunkGenerationMethod::Empty)).unwrap();
        let result = engine.set_block(Point3::new(0, 0, 0), BlockType::STONE);
        assert!(matches!(result, Err(EngineError::ChunkNotLoaded(_))));
    }
}
