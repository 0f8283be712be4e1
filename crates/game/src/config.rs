use glam::Vec3;
use prism_render::{CameraSettings, DrawMode, Lighting};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Prism".into(),
            width: 1280,
            height: 720,
        }
    }
}

impl WindowConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Startup settings for the demo. Every field has a default, so a config
/// file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub camera: CameraSettings,
    pub camera_position: Vec3,
    pub clear_color: [f32; 4],
    pub draw_mode: DrawMode,
    /// Scattered entities added on top of the showcase set at startup.
    pub initial_entities: usize,
    /// Entities added or removed per overlay click.
    pub batch_size: usize,
    pub seed: u64,
    pub spawn_center: Vec3,
    pub spawn_half_extent: Vec3,
    pub lighting: Lighting,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraSettings::default(),
            camera_position: Vec3::new(0.0, 0.0, -5.0),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            draw_mode: DrawMode::Immediate,
            initial_entities: 100,
            batch_size: 100,
            seed: 0x5eed,
            spawn_center: Vec3::new(0.0, 0.0, 20.0),
            spawn_half_extent: Vec3::new(15.0, 8.0, 15.0),
            lighting: Lighting::default(),
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parse YAML, dropping lights beyond the shader slot limits.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(text)?;
        config.lighting = config.lighting.clamped();
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
