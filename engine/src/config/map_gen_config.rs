//! Map Generation Configuration
//!
//! Parameters for [`crate::terrain::RandomMap`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MapFileError;

/// Size, base elevation and crater density of a generated map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomMapConfig {
    /// Cells along the column axis
    pub width: u32,
    /// Cells along the row axis
    pub height: u32,
    /// Elevation of the untouched plain
    pub base_height: i32,
    /// Small crater count; `None` uses `sqrt(width * height)`.
    /// One big crater is added per ten small ones.
    pub craters: Option<u32>,
    /// Generator seed (0 is treated as 1)
    pub seed: u32,
}

impl Default for RandomMapConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            base_height: 5,
            craters: None,
            seed: 1,
        }
    }
}

impl RandomMapConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, MapFileError> {
        let data = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&data)?)
    }

    /// Small crater count after applying the area-based default.
    pub fn crater_count(&self) -> u32 {
        self.craters
            .unwrap_or_else(|| ((self.width as f64) * (self.height as f64)).sqrt() as u32)
    }
}
