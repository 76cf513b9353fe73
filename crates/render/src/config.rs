use std::path::Path;

use serde::{Deserialize, Serialize};
use softraster_camera::{Camera, CameraConfig, CameraError};
use softraster_common::CullMode;

use crate::shader::Shader;

/// Errors from loading, saving or applying a pipeline configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("camera config rejected: {0}")]
    Camera(#[from] CameraError),
}

/// Everything needed to set up a frame pipeline, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub camera: CameraConfig,
    pub cull: CullMode,
    /// Packed `0xAARRGGBB` background.
    pub clear_color: u32,
    pub shader: Shader,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            cull: CullMode::CounterClockwise,
            clear_color: 0xFF10_1018,
            shader: Shader::Flat,
        }
    }
}

impl PipelineConfig {
    pub fn build_camera(&self) -> Result<Camera, ConfigError> {
        Ok(self.camera.build()?)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.camera.validate()?;
        Ok(config)
    }
}
