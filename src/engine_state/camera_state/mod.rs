//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - Chunk visibility determination based on camera position
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `Projection`: Manages the camera's projection matrix
//! - `Frustum`: Clipping planes used to cull chunks outside the view

use cgmath::{Point3, Rad};

use crate::config::CameraConfig;

use super::voxels::{
    block::block_side::BlockSide,
    chunk::{CHUNK_DIMENSION, MAX_CHUNK_COORDINATE, MIN_CHUNK_COORDINATE},
};

pub mod camera;
pub mod frustum;

use camera::{Camera, Projection};
use frustum::Frustum;

/// Owns the camera and its projection.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    pub projection: Projection,
}

impl CameraState {
    /// Creates a camera at the origin looking along +X.
    pub fn new(config: &CameraConfig) -> Self {
        CameraState {
            camera: Camera::new(Point3::new(0.0, 0.0, 0.0), cgmath::Deg(0.0), cgmath::Deg(0.0)),
            projection: Projection::from_config(config),
        }
    }

    /// Moves and points the camera.
    ///
    /// # Returns
    /// The block sides facing the view direction and the chunk the camera is in.
    pub fn set_pose<Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        &mut self,
        position: Point3<f32>,
        yaw: Y,
        pitch: P,
    ) -> CameraUpdates {
        self.camera.position = position;
        self.camera.set_orientation(yaw, pitch);

        let normalized_player_direction_vec = self.camera.get_view_vec();
        let new_visible_sides = BlockSide::get_visible_sides(normalized_player_direction_vec);

        CameraUpdates {
            new_visible_sides,
            new_chunk_position: self.chunk_position(),
        }
    }

    /// The chunk containing the camera.
    pub fn chunk_position(&self) -> Point3<i32> {
        chunk_containing(self.camera.position)
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_matrix(self.projection.calc_matrix() * self.camera.calc_matrix())
    }
}

/// The chunk containing a world-space point.
///
/// Points beyond the edge of the `i32` block grid map to the outermost chunk
/// on that axis.
pub fn chunk_containing(position: Point3<f32>) -> Point3<i32> {
    let axis = |value: f32| {
        ((value / CHUNK_DIMENSION as f32).floor() as i32)
            .clamp(MIN_CHUNK_COORDINATE, MAX_CHUNK_COORDINATE)
    };
    Point3::new(axis(position.x), axis(position.y), axis(position.z))
}

/// Represents updates to the camera's state that affect game world interaction.
///
/// This is returned by `CameraState::set_pose()`.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraUpdates {
    /// Block faces that are currently visible based on camera orientation
    pub new_visible_sides: Vec<BlockSide>,
    /// The current chunk position of the camera in world coordinates
    pub new_chunk_position: Point3<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;

    #[test]
    fn chunk_position_floors_negative_coordinates() {
        let mut state = CameraState::new(&CameraConfig::default());
        let updates = state.set_pose(Point3::new(-0.5, 15.9, 16.0), Deg(0.0), Deg(0.0));
        assert_eq!(updates.new_chunk_position, Point3::new(-1, 0, 1));
    }

    #[test]
    fn chunk_position_stops_at_the_edge_of_the_block_grid() {
        let mut state = CameraState::new(&CameraConfig::default());
        let updates = state.set_pose(Point3::new(3.0e9, -3.0e9, f32::MAX), Deg(0.0), Deg(0.0));
        assert_eq!(
            updates.new_chunk_position,
            Point3::new(MAX_CHUNK_COORDINATE, MIN_CHUNK_COORDINATE, MAX_CHUNK_COORDINATE)
        );
        assert_eq!(
            chunk_containing(Point3::new(-1.0e12, 0.0, 1.0e12)),
            Point3::new(MIN_CHUNK_COORDINATE, 0, MAX_CHUNK_COORDINATE)
        );
    }

    #[test]
    fn looking_along_x_sees_front_faces() {
        let mut state = CameraState::new(&CameraConfig::default());
        let updates = state.set_pose(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        assert!(updates.new_visible_sides.contains(&BlockSide::FRONT));
        assert!(!updates.new_visible_sides.contains(&BlockSide::BACK));
    }
}
