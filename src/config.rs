use crate::layout::tree::AxisMode;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    MissingFile(PathBuf),

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Application configuration loaded from a TOML file.
///
/// Every field has a default, so an empty file (or no file at all) is a
/// valid configuration. CLI flags override file values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

/// Layout section: axis mode and spacing parameters for the tree solver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Default axis orientation when the CLI does not pass `--axis`.
    pub axis: AxisMode,

    /// Ellipse width in user units.
    pub node_width: f32,

    /// Ellipse height in user units.
    pub node_height: f32,

    /// Multiplier applied to the node size to obtain row/column spacing.
    pub spacing_factor: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            axis: AxisMode::default(),
            node_width: 150.0,
            node_height: 75.0,
            spacing_factor: 2.0,
        }
    }
}

/// Render section: rasterization parameters, used for PNG output only.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Raster scale factor relative to the SVG user units.
    pub scale: f32,

    /// Background color behind the rasterized diagram.
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: "white".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|_| ConfigError::MissingFile(path.to_path_buf()))?;

        Ok(toml::from_str(&content)?)
    }
}
