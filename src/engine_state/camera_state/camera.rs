//! # Camera Implementation
//!
//! This module contains the core camera implementation including:
//! - Camera representation and transformations
//! - Projection matrix handling
//!
//! ## Key Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `Projection`: Manages perspective projection settings

use cgmath::*;
use std::f32::consts::FRAC_PI_2;

use crate::config::CameraConfig;

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Represents a first-person camera in 3D space.
///
/// # Fields
/// - `position`: The camera's position in world space
/// - `yaw`: Horizontal rotation (around Y axis) in radians; 0 looks along +X
/// - `pitch`: Vertical rotation in radians, clamped just short of straight up/down
/// - `view_x_vec`: Normalized vector pointing where the camera looks
/// - `view_y_vec`: Normalized vector pointing to the camera's up
/// - `view_z_vec`: Normalized vector pointing to the camera's right
#[derive(Debug, Clone)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation (around X axis) in radians
    pub pitch: Rad<f32>,
    /// Normalized vector pointing where the camera looks
    pub view_x_vec: Vector3<f32>,
    /// Normalized vector pointing to the camera's up
    pub view_y_vec: Vector3<f32>,
    /// Normalized vector pointing to the camera's right
    pub view_z_vec: Vector3<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Example
    /// ```
    /// use cgmath::{Deg, Point3};
    /// use voxel_globe::engine_state::camera_state::camera::Camera;
    ///
    /// let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
    /// assert!((camera.get_view_vec().x - 1.0).abs() < 1e-6);
    /// ```
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: Rad(0.0),
            pitch: Rad(0.0),
            view_x_vec: Vector3::unit_x(),
            view_y_vec: Vector3::unit_y(),
            view_z_vec: Vector3::unit_z(),
        };
        camera.set_orientation(yaw, pitch);
        camera
    }

    /// Points the camera, clamping pitch, and recomputes the view vectors.
    pub fn set_orientation<Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(&mut self, yaw: Y, pitch: P) {
        self.yaw = yaw.into();
        self.pitch = pitch.into();

        // Clamp pitch to prevent gimbal lock
        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }

        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();

        self.view_x_vec = Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize();
        self.view_y_vec =
            Vector3::new(-pitch_sin * yaw_cos, pitch_cos, -pitch_sin * yaw_sin).normalize();
        self.view_z_vec = Vector3::new(-yaw_sin, 0.0, yaw_cos).normalize();
    }

    /// Gets the camera's forward direction vector.
    pub fn get_view_vec(&self) -> Vector3<f32> {
        self.view_x_vec
    }

    /// Calculates the view matrix for this camera.
    ///
    /// The view matrix transforms world coordinates to view (camera) space.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.view_x_vec, Vector3::unit_y())
    }
}

/// Represents a camera's projection matrix and related parameters.
///
/// It manages the aspect ratio, field of view, and near/far clipping planes.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            aspect: config.aspect_ratio,
            fovy: Deg(config.fovy_degrees).into(),
            znear: config.znear,
            zfar: config.zfar,
        }
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn zfar(&self) -> f32 {
        self.zfar
    }

    /// Calculates the OpenGL-style perspective matrix (clip z in `[-w, w]`).
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}
