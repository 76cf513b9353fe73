//! Camera model.
//!
//! Owns viewer position, orientation and projection parameters, caches the
//! derived matrices, and converts points between world, clip, NDC and screen
//! space.
//!
//! # Invariants
//! - Every setter that changes a parameter drops all cached matrices; setting
//!   an equal value keeps them.
//! - Conversions never clip. Points at or behind the eye come out off-screen
//!   (or non-finite when `w == 0`) and are left to the rasterizer.
//! - The camera does not validate its parameters; use [`CameraConfig`] to
//!   reject or clamp bad input first.

mod camera;
mod config;

pub use camera::Camera;
pub use config::{CameraConfig, CameraError};

pub fn crate_info() -> &'static str {
    "softraster-camera v0.1.0"
}
