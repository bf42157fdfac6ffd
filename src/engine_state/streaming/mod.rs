//! # Chunk Streaming
//!
//! Decides which chunks are generated, meshed and unloaded as the player moves.
//!
//! The streamer keeps a load queue of missing chunk positions around the
//! player, sorted nearest first. Each frame the engine pulls a bounded batch of
//! generation and mesh requests from it, so a teleport never stalls a frame.
//! Chunks are only unloaded once they drift beyond the render distance plus an
//! unload margin, which keeps a player walking back and forth over a chunk
//! border from thrashing the world.

use std::collections::{HashSet, VecDeque};

use cgmath::Point3;
use log::debug;

use crate::{config::StreamingConfig, engine_state::voxels::chunk::is_chunk_in_bounds};

pub mod visibility;

/// Counters describing outstanding streaming work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamingStats {
    /// Positions waiting to be handed out for generation
    pub queued_generations: usize,
    /// Positions handed out for generation and not yet completed
    pub pending_generations: usize,
    /// Positions waiting to be handed out for meshing
    pub queued_meshes: usize,
    /// Positions handed out for meshing and not yet completed
    pub pending_meshes: usize,
}

/// Tracks the player's chunk and the chunk work that follows from it.
#[derive(Debug)]
pub struct ChunkStreamingManager {
    config: StreamingConfig,
    center: Option<Point3<i32>>,
    load_queue: VecDeque<Point3<i32>>,
    pending_generation: HashSet<Point3<i32>>,
    mesh_requests: HashSet<Point3<i32>>,
    pending_meshes: HashSet<Point3<i32>>,
}

/// Offset from `center` to `position`, widened so any two chunk positions fit.
fn offset(center: Point3<i32>, position: Point3<i32>) -> (i64, i64, i64) {
    (
        i64::from(position.x) - i64::from(center.x),
        i64::from(position.y) - i64::from(center.y),
        i64::from(position.z) - i64::from(center.z),
    )
}

fn distance_key(center: Point3<i32>, position: Point3<i32>) -> (i64, i32, i32, i32) {
    let (dx, dy, dz) = offset(center, position);
    let distance_squared = dx
        .saturating_mul(dx)
        .saturating_add(dy.saturating_mul(dy))
        .saturating_add(dz.saturating_mul(dz));
    (distance_squared, position.x, position.y, position.z)
}

impl ChunkStreamingManager {
    pub fn new(config: StreamingConfig) -> Self {
        ChunkStreamingManager {
            config,
            center: None,
            load_queue: VecDeque::new(),
            pending_generation: HashSet::new(),
            mesh_requests: HashSet::new(),
            pending_meshes: HashSet::new(),
        }
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// The chunk the streamer is centred on, once `update_center` has run.
    pub fn center(&self) -> Option<Point3<i32>> {
        self.center
    }

    /// Every chunk position within the render cylinder around `center`,
    /// nearest first. Ties are broken by coordinate. Positions past the edge
    /// of the block grid are left out.
    ///
    /// # Example
    /// ```
    /// use cgmath::Point3;
    /// use voxel_globe::{config::StreamingConfig, engine_state::streaming::ChunkStreamingManager};
    ///
    /// let config = StreamingConfig { render_distance: 1, vertical_render_distance: 0, ..Default::default() };
    /// let streamer = ChunkStreamingManager::new(config);
    /// let positions = streamer.desired_positions(Point3::new(0, 0, 0));
    /// assert_eq!(positions.len(), 5);
    /// assert_eq!(positions[0], Point3::new(0, 0, 0));
    /// ```
    pub fn desired_positions(&self, center: Point3<i32>) -> Vec<Point3<i32>> {
        let radius = self.config.render_distance;
        let vertical = self.config.vertical_render_distance;

        let radius_squared = i64::from(radius) * i64::from(radius);
        let mut positions = Vec::new();
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                if i64::from(dx) * i64::from(dx) + i64::from(dz) * i64::from(dz) > radius_squared {
                    continue;
                }
                for dy in -vertical..=vertical {
                    let position = (
                        center.x.checked_add(dx),
                        center.y.checked_add(dy),
                        center.z.checked_add(dz),
                    );
                    if let (Some(x), Some(y), Some(z)) = position {
                        let position = Point3::new(x, y, z);
                        if is_chunk_in_bounds(position) {
                            positions.push(position);
                        }
                    }
                }
            }
        }

        positions.sort_by_key(|position| distance_key(center, *position));
        positions
    }

    /// Whether a chunk at `position` may stay loaded around the current center.
    pub fn is_within_keep_range(&self, position: Point3<i32>) -> bool {
        let Some(center) = self.center else {
            return true;
        };
        let (dx, dy, dz) = offset(center, position);
        let radius = i64::from(self.config.render_distance) + i64::from(self.config.unload_margin);
        let vertical =
            i64::from(self.config.vertical_render_distance) + i64::from(self.config.unload_margin);

        dy.abs() <= vertical
            && dx.abs() <= radius
            && dz.abs() <= radius
            && dx * dx + dz * dz <= radius * radius
    }

    /// Re-centres the streamer on the player's chunk.
    ///
    /// The load queue is rebuilt from desired positions that are neither
    /// loaded nor already being generated.
    ///
    /// # Returns
    /// The loaded positions that fell out of the keep range and should be
    /// unloaded. Empty if the center did not change.
    pub fn update_center(
        &mut self,
        center: Point3<i32>,
        loaded: &[Point3<i32>],
    ) -> Vec<Point3<i32>> {
        if self.center == Some(center) {
            return Vec::new();
        }
        self.center = Some(center);

        let loaded_set: HashSet<Point3<i32>> = loaded.iter().copied().collect();
        self.load_queue = self
            .desired_positions(center)
            .into_iter()
            .filter(|position| {
                !loaded_set.contains(position) && !self.pending_generation.contains(position)
            })
            .collect();

        let to_unload: Vec<Point3<i32>> = loaded
            .iter()
            .copied()
            .filter(|position| !self.is_within_keep_range(*position))
            .collect();

        debug!(
            "Streaming center moved to {:?}: {} chunks queued, {} to unload",
            center,
            self.load_queue.len(),
            to_unload.len()
        );

        to_unload
    }

    /// Hands out at most `max_generation_requests_per_frame` positions to
    /// generate, nearest first, and marks them pending.
    pub fn next_generation_batch(&mut self) -> Vec<Point3<i32>> {
        let count = self
            .config
            .max_generation_requests_per_frame
            .min(self.load_queue.len());
        let batch: Vec<Point3<i32>> = self.load_queue.drain(..count).collect();
        self.pending_generation.extend(batch.iter().copied());
        batch
    }

    /// Clears the pending mark of a generated chunk.
    ///
    /// # Returns
    /// Whether the chunk is still wanted, i.e. inside the keep range.
    pub fn complete_generation(&mut self, position: Point3<i32>) -> bool {
        self.pending_generation.remove(&position);
        self.is_within_keep_range(position)
    }

    /// Queues a (re)mesh of `position`. Repeated requests collapse into one.
    pub fn request_mesh(&mut self, position: Point3<i32>) {
        self.mesh_requests.insert(position);
    }

    /// Hands out at most `max_mesh_requests_per_frame` positions to mesh,
    /// nearest to the center first.
    ///
    /// A position whose previous mesh is still being built stays queued until
    /// `complete_mesh` is called for it, so meshes of one chunk are never
    /// built concurrently.
    pub fn next_mesh_batch(&mut self) -> Vec<Point3<i32>> {
        let center = self.center.unwrap_or(Point3::new(0, 0, 0));
        let mut ready: Vec<Point3<i32>> = self
            .mesh_requests
            .iter()
            .copied()
            .filter(|position| !self.pending_meshes.contains(position))
            .collect();
        ready.sort_by_key(|position| distance_key(center, *position));
        ready.truncate(self.config.max_mesh_requests_per_frame);

        for position in ready.iter() {
            self.mesh_requests.remove(position);
            self.pending_meshes.insert(*position);
        }
        ready
    }

    /// Marks the mesh task of `position` as finished.
    pub fn complete_mesh(&mut self, position: Point3<i32>) {
        self.pending_meshes.remove(&position);
    }

    /// Drops all bookkeeping for an unloaded position.
    pub fn forget(&mut self, position: Point3<i32>) {
        self.load_queue.retain(|queued| *queued != position);
        self.pending_generation.remove(&position);
        self.mesh_requests.remove(&position);
        self.pending_meshes.remove(&position);
    }

    /// Nothing is queued or in flight.
    pub fn is_idle(&self) -> bool {
        self.load_queue.is_empty()
            && self.pending_generation.is_empty()
            && self.mesh_requests.is_empty()
            && self.pending_meshes.is_empty()
    }

    pub fn stats(&self) -> StreamingStats {
        StreamingStats {
            queued_generations: self.load_queue.len(),
            pending_generations: self.pending_generation.len(),
            queued_meshes: self.mesh_requests.len(),
            pending_meshes: self.pending_meshes.len(),
        }
    }
}
