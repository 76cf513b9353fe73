//! Rendering: drives scene nodes through a camera into the rasterizer.
//!
//! # Invariants
//! - A frame reads world geometry from the scene; it never writes node state.
//! - The target framebuffer always matches the camera viewport.
//! - Triangles that are degenerate, culled, behind the camera or off screen
//!   are counted, never reported as errors.

mod config;
mod renderer;
mod shader;

pub use config::{ConfigError, PipelineConfig};
pub use renderer::{FrameStats, RenderError, Renderer, SoftwareRenderer, TextSummaryRenderer};
pub use shader::Shader;

pub fn crate_info() -> &'static str {
    "softraster-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
