//! Terrain Mesher
//!
//! Walks the control point cache in square tiles and emits geometry through a
//! [`MeshSink`]. Two variants are produced from the same points:
//! - Surface: four flat-shaded triangles per cell fanning through the centre
//! - Grid: the four edges of every cell as line segments
//!
//! Tiling only groups cells into parts so each stays under the renderer's
//! per-part vertex limit; the emitted shape is identical for any tile size.

use glam::Vec3;

use super::control_points::{ControlPointCache, NE, NW, SE, SW};
use crate::config::TerrainConfig;

/// Primitive type of a mesh part.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Triangles,
    Lines,
}

/// Flat material attached to a mesh part.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshMaterial {
    /// Diffuse RGBA color.
    pub diffuse: [f32; 4],
}

/// Consumer of mesh descriptions, implemented by the host renderer.
///
/// Vertex indices passed to `emit_triangle` and `emit_line` are the values
/// returned by `emit_vertex` within the current part.
pub trait MeshSink {
    fn begin_part(&mut self, name: &str, primitive: PrimitiveKind, material: &MeshMaterial);
    fn emit_vertex(&mut self, position: Vec3, normal: Vec3) -> u32;
    fn emit_triangle(&mut self, a: u32, b: u32, c: u32);
    fn emit_line(&mut self, a: u32, b: u32);
    fn end_part(&mut self);
}

/// Vertex layout of [`MeshBuffers`], ready for upload as raw bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 24]);

/// One mesh part collected by [`MeshBuffers`].
#[derive(Clone, Debug)]
pub struct MeshPart {
    pub name: String,
    pub primitive: PrimitiveKind,
    pub material: MeshMaterial,
    pub vertices: Vec<TerrainVertex>,
    /// Triangle lists hold 3 indices per primitive, line lists 2.
    pub indices: Vec<u32>,
}

impl MeshPart {
    /// Number of triangles or lines in the part.
    pub fn primitive_count(&self) -> usize {
        match self.primitive {
            PrimitiveKind::Triangles => self.indices.len() / 3,
            PrimitiveKind::Lines => self.indices.len() / 2,
        }
    }

    /// Raw vertex bytes for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// In-memory sink that keeps every emitted part.
#[derive(Clone, Debug, Default)]
pub struct MeshBuffers {
    pub parts: Vec<MeshPart>,
    open: Option<MeshPart>,
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.vertices.len()).sum()
    }

    pub fn primitive_count(&self) -> usize {
        self.parts.iter().map(MeshPart::primitive_count).sum()
    }
}

impl MeshSink for MeshBuffers {
    fn begin_part(&mut self, name: &str, primitive: PrimitiveKind, material: &MeshMaterial) {
        self.end_part();
        self.open = Some(MeshPart {
            name: name.to_string(),
            primitive,
            material: *material,
            vertices: Vec::new(),
            indices: Vec::new(),
        });
    }

    fn emit_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        match self.open.as_mut() {
            Some(part) => {
                part.vertices.push(TerrainVertex {
                    position: position.into(),
                    normal: normal.into(),
                });
                part.vertices.len() as u32 - 1
            }
            None => 0,
        }
    }

    fn emit_triangle(&mut self, a: u32, b: u32, c: u32) {
        if let Some(part) = self.open.as_mut() {
            part.indices.extend_from_slice(&[a, b, c]);
        }
    }

    fn emit_line(&mut self, a: u32, b: u32) {
        if let Some(part) = self.open.as_mut() {
            part.indices.extend_from_slice(&[a, b]);
        }
    }

    fn end_part(&mut self) {
        if let Some(part) = self.open.take() {
            self.parts.push(part);
        }
    }
}

/// Tile-by-tile emitter of surface and grid meshes.
#[derive(Clone, Debug)]
pub struct TerrainMesher {
    tile_size: u32,
    surface_material: MeshMaterial,
    grid_material: MeshMaterial,
}

impl Default for TerrainMesher {
    fn default() -> Self {
        Self::new(&TerrainConfig::default())
    }
}

impl TerrainMesher {
    pub fn new(config: &TerrainConfig) -> Self {
        Self {
            tile_size: config.tile_size.max(1),
            surface_material: MeshMaterial {
                diffuse: config.surface_color,
            },
            grid_material: MeshMaterial {
                diffuse: config.grid_color,
            },
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Emit the shaded surface: one triangle part per tile.
    pub fn build_surface_mesh(&self, cache: &ControlPointCache, sink: &mut dyn MeshSink) {
        self.for_each_tile(cache, |tile_row, tile_column, rows, columns| {
            sink.begin_part(
                &format!("surface_{tile_row}_{tile_column}"),
                PrimitiveKind::Triangles,
                &self.surface_material,
            );
            for row in rows {
                for column in columns.clone() {
                    for [a, b, c] in cache.cell_triangles(row, column) {
                        triangle(a, b, c, sink);
                    }
                }
            }
            sink.end_part();
        });
    }

    /// Emit the wireframe grid: one line part per tile, cell centres excluded.
    pub fn build_grid_mesh(&self, cache: &ControlPointCache, sink: &mut dyn MeshSink) {
        self.for_each_tile(cache, |tile_row, tile_column, rows, columns| {
            sink.begin_part(
                &format!("grid_{tile_row}_{tile_column}"),
                PrimitiveKind::Lines,
                &self.grid_material,
            );
            for row in rows {
                for column in columns.clone() {
                    let p = cache.cell(row, column);
                    let ring = [p[NW], p[NE], p[SE], p[SW]];
                    for i in 0..ring.len() {
                        let a = sink.emit_vertex(ring[i], Vec3::Y);
                        let b = sink.emit_vertex(ring[(i + 1) % ring.len()], Vec3::Y);
                        sink.emit_line(a, b);
                    }
                }
            }
            sink.end_part();
        });
    }

    /// Number of tiles along rows and columns for `cache`.
    pub fn tile_counts(&self, cache: &ControlPointCache) -> (u32, u32) {
        (
            cache.height().div_ceil(self.tile_size),
            cache.width().div_ceil(self.tile_size),
        )
    }

    fn for_each_tile<F>(&self, cache: &ControlPointCache, mut emit: F)
    where
        F: FnMut(u32, u32, std::ops::Range<u32>, std::ops::Range<u32>),
    {
        let (tile_rows, tile_columns) = self.tile_counts(cache);
        for tile_row in 0..tile_rows {
            let row_start = tile_row * self.tile_size;
            let rows = row_start..(row_start + self.tile_size).min(cache.height());
            for tile_column in 0..tile_columns {
                let column_start = tile_column * self.tile_size;
                let columns = column_start..(column_start + self.tile_size).min(cache.width());
                emit(tile_row, tile_column, rows.clone(), columns);
            }
        }
        log::debug!(
            "[TerrainMesher] Emitted {} tiles of up to {} cells per edge",
            tile_rows * tile_columns,
            self.tile_size
        );
    }
}

/// Flat normal of triangle `(a, b, c)`: `normalize((a - c) x (b - c))`.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (a - c).cross(b - c).normalize_or_zero()
}

fn triangle(a: Vec3, b: Vec3, c: Vec3, sink: &mut dyn MeshSink) {
    let normal = face_normal(a, b, c);
    let ia = sink.emit_vertex(a, normal);
    let ib = sink.emit_vertex(b, normal);
    let ic = sink.emit_vertex(c, normal);
    sink.emit_triangle(ia, ib, ic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::HeightField;

    fn mesher_with_tile(tile_size: u32) -> TerrainMesher {
        TerrainMesher::new(&TerrainConfig {
            tile_size,
            ..Default::default()
        })
    }

    #[test]
    fn test_vertex_size() {
        // position [f32;3] = 12 + normal [f32;3] = 12 => 24
        assert_eq!(std::mem::size_of::<TerrainVertex>(), 24);
    }

    #[test]
    fn test_flat_surface_normals_point_up() {
        let cache = ControlPointCache::from_field(&HeightField::new(2, 2, 0));
        let mut buffers = MeshBuffers::new();
        TerrainMesher::default().build_surface_mesh(&cache, &mut buffers);

        assert_eq!(buffers.parts.len(), 1);
        assert_eq!(buffers.primitive_count(), 2 * 2 * 4);
        for v in &buffers.parts[0].vertices {
            assert_eq!(v.normal, [0.0, 1.0, 0.0], "flat terrain normal should be +Y");
        }
    }

    #[test]
    fn test_surface_tiles_partition_cells() {
        let cache = ControlPointCache::from_field(&HeightField::new(7, 5, 0));
        let mesher = mesher_with_tile(3);
        let mut buffers = MeshBuffers::new();
        mesher.build_surface_mesh(&cache, &mut buffers);

        // ceil(5/3) = 2 tile rows, ceil(7/3) = 3 tile columns.
        assert_eq!(mesher.tile_counts(&cache), (2, 3));
        assert_eq!(buffers.parts.len(), 6);
        assert_eq!(buffers.parts[0].name, "surface_0_0");
        assert_eq!(buffers.parts[0].primitive_count(), 3 * 3 * 4);
        // Last tile covers rows 3..5 and columns 6..7.
        assert_eq!(buffers.parts[5].primitive_count(), 2 * 4);
        assert_eq!(buffers.primitive_count(), 7 * 5 * 4);
    }

    #[test]
    fn test_tile_size_does_not_change_geometry() {
        let mut field = HeightField::new(6, 6, 0);
        field.raise(3, 3, 2);
        let cache = ControlPointCache::from_field(&field);

        let collect = |tile| {
            let mut buffers = MeshBuffers::new();
            mesher_with_tile(tile).build_surface_mesh(&cache, &mut buffers);
            let mut all: Vec<[f32; 3]> = buffers
                .parts
                .iter()
                .flat_map(|p| p.vertices.iter().map(|v| v.position))
                .collect();
            all.sort_by(|a, b| a.partial_cmp(b).unwrap());
            all
        };

        assert_eq!(collect(1), collect(50));
    }

    #[test]
    fn test_grid_mesh_emits_cell_rings() {
        let mut field = HeightField::new(2, 1, 0);
        field.raise(0, 0, 1);
        let cache = ControlPointCache::from_field(&field);
        let mut buffers = MeshBuffers::new();
        TerrainMesher::default().build_grid_mesh(&cache, &mut buffers);

        let part = &buffers.parts[0];
        assert_eq!(part.primitive, PrimitiveKind::Lines);
        assert_eq!(part.primitive_count(), 2 * 4);
        assert_eq!(part.material.diffuse, [1.0, 0.0, 0.0, 1.0]);
        // First line of the first cell runs NW -> NE.
        assert_eq!(part.vertices[0].position, [0.0, 1.0, 0.0]);
        assert_eq!(part.vertices[1].position, [0.0, 0.0, 1.0]);
        // Centres never appear in the grid.
        assert!(part.vertices.iter().all(|v| v.position[0].fract() == 0.0));
    }

    #[test]
    fn test_face_normal_orientation() {
        let n = face_normal(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.5, 0.0, 0.5),
        );
        assert!((n - Vec3::Y).length() < 1e-6, "got {n:?}");
    }

    #[test]
    fn test_empty_map_emits_nothing() {
        let cache = ControlPointCache::from_field(&HeightField::new(0, 0, 0));
        let mut buffers = MeshBuffers::new();
        TerrainMesher::default().build_surface_mesh(&cache, &mut buffers);
        assert!(buffers.parts.is_empty());
    }
}
