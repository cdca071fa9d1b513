//! Terrain Configuration
//!
//! Mesh batching, material colors and picking tolerance.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MapFileError;

/// Presentation and picking parameters shared by the mesher and raycaster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Cells per tile edge; each tile becomes one mesh part.
    pub tile_size: u32,
    /// Diffuse RGBA of the shaded surface
    pub surface_color: [f32; 4],
    /// Diffuse RGBA of the wireframe grid
    pub grid_color: [f32; 4],
    /// Elevation slack around a cell's corner range before a marched ray
    /// point is tested against that cell's triangles.
    pub pick_tolerance: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tile_size: 50,
            surface_color: [0.7, 0.7, 0.8, 1.0],
            grid_color: [1.0, 0.0, 0.0, 1.0],
            pick_tolerance: 3.0,
        }
    }
}

impl TerrainConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, MapFileError> {
        let data = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&data)?)
    }
}
