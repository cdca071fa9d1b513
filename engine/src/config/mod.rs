//! Config Module
//!
//! Centralized configuration for terrain presentation and map generation.
//! Both structs deserialize from JSON; missing fields fall back to `Default`.

pub mod map_gen_config;
pub mod terrain_config;

pub use map_gen_config::RandomMapConfig;
pub use terrain_config::TerrainConfig;
