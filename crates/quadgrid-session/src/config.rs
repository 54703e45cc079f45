//! JSON session configuration.

use quadgrid_decode::{GridSpec, GridSpecError, PackParams, SampleParams};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_corners_path() -> String {
    "./assets/data/nodes.bin".to_string()
}

fn default_zoom_step() -> f32 {
    0.1
}

fn default_corner_radius() -> f32 {
    3.0
}

fn default_cell_marker_radius() -> f32 {
    2.0
}

/// Everything a session needs besides its assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub image_path: String,
    /// 32-byte corner record read at init and written on save.
    #[serde(default = "default_corners_path")]
    pub corners_path: String,
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub sampling: SampleParams,
    #[serde(default)]
    pub pack: PackParams,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,
    #[serde(default = "default_corner_radius")]
    pub corner_radius: f32,
    #[serde(default = "default_cell_marker_radius")]
    pub cell_marker_radius: f32,
    /// Fixed jitter seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Also compute the Sobel gradient of the luminance matrix.
    #[serde(default)]
    pub compute_gradient: bool,
}

impl SessionConfig {
    pub fn new(image_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            corners_path: default_corners_path(),
            grid: GridSpec::default(),
            sampling: SampleParams::default(),
            pack: PackParams::default(),
            zoom_step: default_zoom_step(),
            corner_radius: default_corner_radius(),
            cell_marker_radius: default_cell_marker_radius(),
            seed: None,
            compute_gradient: false,
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GridSpecError> {
        self.grid.validate(&self.pack)?;
        self.sampling.validate()
    }
}
