//! Terrain Module
//!
//! Heightmap terrain for the moon surface: slope-limited elevation editing,
//! per-cell control points, tiled mesh emission and ray picking.
//!
//! Data flows one way: edits mutate the [`HeightField`], the
//! [`ControlPointCache`] is refreshed explicitly, and the mesher and
//! raycaster read only the cache.

pub mod control_points;
pub mod game_map;
pub mod height_field;
pub mod mesher;
pub mod object_layer;
pub mod random_map;
pub mod raycast;

pub use control_points::{ControlPointCache, center_height};
pub use game_map::GameMap;
pub use height_field::{HeightField, MAX_DIMENSION};
pub use mesher::{
    MeshBuffers, MeshMaterial, MeshPart, MeshSink, PrimitiveKind, TerrainMesher, TerrainVertex,
};
pub use object_layer::{ObjectCatalog, ObjectLayer};
pub use random_map::{RandomMap, SimpleRng};
pub use raycast::TerrainRaycaster;
