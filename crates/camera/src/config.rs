use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;

/// Reasons a camera configuration is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("viewport must be at least 1x1, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },
    #[error("direction and up must be non-zero and not parallel")]
    DegenerateBasis,
    #[error("field of view must be in (0, 180) degrees, got {0}")]
    FieldOfView(f32),
    #[error("clip planes must satisfy 0 < near < far, got near={near} far={far}")]
    ClipPlanes { near: f32, far: f32 },
}

/// Serializable camera parameters. The field of view is in degrees here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub fov_degrees: f32,
    pub width: u32,
    pub height: u32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            fov_degrees: 60.0,
            width: 640,
            height: 480,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    /// Reject parameters that would give the camera a singular or undefined
    /// matrix.
    pub fn validate(&self) -> Result<(), CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::EmptyViewport {
                width: self.width,
                height: self.height,
            });
        }
        let cross = self.direction.cross(self.up);
        let scale = self.direction.length_squared() * self.up.length_squared();
        if !cross.is_finite() || cross.length_squared() <= f32::EPSILON * scale {
            return Err(CameraError::DegenerateBasis);
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(CameraError::FieldOfView(self.fov_degrees));
        }
        if !(self.near > 0.0 && self.far > self.near && self.far.is_finite()) {
            return Err(CameraError::ClipPlanes {
                near: self.near,
                far: self.far,
            });
        }
        Ok(())
    }

    /// Viewport with both dimensions clamped to at least one pixel.
    pub fn clamped_viewport(&self) -> (u32, u32) {
        (self.width.max(1), self.height.max(1))
    }

    /// Validate, then build a camera.
    pub fn build(&self) -> Result<Camera, CameraError> {
        self.validate()?;
        let (width, height) = self.clamped_viewport();
        Ok(Camera::new(
            self.position,
            self.direction,
            self.up,
            self.fov_degrees.to_radians(),
            width,
            height,
            self.near,
            self.far,
        ))
    }

    /// Capture a camera's current parameters.
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            position: camera.position(),
            direction: camera.direction(),
            up: camera.up(),
            fov_degrees: camera.fov().to_degrees(),
            width: camera.width(),
            height: camera.height(),
            near: camera.near(),
            far: camera.far(),
        }
    }
}
