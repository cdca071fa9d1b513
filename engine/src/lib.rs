//! Harvest Moon Engine Library
//!
//! Heightmap terrain for a cratered moon surface. The engine owns plain
//! data (integer elevations, per-cell object codes, derived control points)
//! and hands geometry to the host renderer through the [`terrain::MeshSink`]
//! trait. It never draws, loads textures, or handles input itself.
//!
//! # Modules
//!
//! - [`terrain`] - Height field editing, control points, meshing, picking
//! - [`camera`] - Screen-to-world picking rays
//! - [`config`] - JSON-loadable terrain and generator settings
//! - [`persist`] - Binary map files
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use harvest_moon_engine::camera::Ray;
//! use harvest_moon_engine::terrain::{GameMap, MeshBuffers};
//!
//! let mut map = GameMap::new(20, 20, 5);
//! map.crater(10, 10, 6, 3, 7, 3);
//! map.update_control_points();
//!
//! let mut surface = MeshBuffers::new();
//! map.build_surface_mesh(&mut surface);
//! assert_eq!(surface.primitive_count(), 20 * 20 * 4);
//!
//! let hit = map.pick(&Ray::new(Vec3::new(2.5, 20.0, 2.5), Vec3::NEG_Y));
//! assert!(hit.is_some());
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod persist;
pub mod terrain;

pub use camera::Ray;
pub use config::{RandomMapConfig, TerrainConfig};
pub use error::{MapFileError, TerrainError, TerrainResult};
pub use terrain::{
    ControlPointCache, GameMap, HeightField, MeshSink, ObjectCatalog, ObjectLayer, RandomMap,
    TerrainMesher, TerrainRaycaster,
};
