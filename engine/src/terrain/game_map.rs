//! Game Map
//!
//! One terrain instance: the height field, its object layer, the derived
//! control points, and the catalog the object codes refer to.
//!
//! Editing follows a two-phase protocol. Raise/lower/crater only touch the
//! height field; call [`GameMap::update_control_points`] afterwards, before
//! building meshes or picking. Reads of a stale cache are logged, not fixed.

use glam::Vec3;

use super::control_points::ControlPointCache;
use super::height_field::HeightField;
use super::mesher::{MeshSink, TerrainMesher};
use super::object_layer::{ObjectCatalog, ObjectLayer};
use super::raycast::TerrainRaycaster;
use crate::camera::raycast::Ray;
use crate::config::TerrainConfig;
use crate::error::{TerrainError, TerrainResult};

#[derive(Clone, Debug)]
pub struct GameMap {
    field: HeightField,
    objects: ObjectLayer,
    control_points: ControlPointCache,
    catalog: ObjectCatalog,
    mesher: TerrainMesher,
    raycaster: TerrainRaycaster,
}

impl GameMap {
    /// Flat map at `base_height` with the default catalog and configuration.
    /// Control points are already current.
    pub fn new(width: u32, height: u32, base_height: i32) -> Self {
        Self::with_config(
            HeightField::new(width, height, base_height),
            ObjectCatalog::default(),
            &TerrainConfig::default(),
        )
    }

    /// Map over an existing height field with an empty object layer.
    pub fn with_config(field: HeightField, catalog: ObjectCatalog, config: &TerrainConfig) -> Self {
        let objects = ObjectLayer::new(field.width(), field.height(), &catalog);
        let control_points = ControlPointCache::from_field(&field);
        Self {
            field,
            objects,
            control_points,
            catalog,
            mesher: TerrainMesher::new(config),
            raycaster: TerrainRaycaster::new(config),
        }
    }

    /// Assemble a map from separately loaded layers.
    ///
    /// Fails when the layers disagree on cell dimensions.
    pub fn from_parts(
        field: HeightField,
        objects: ObjectLayer,
        catalog: ObjectCatalog,
        config: &TerrainConfig,
    ) -> TerrainResult<Self> {
        if field.width() != objects.width() || field.height() != objects.height() {
            return Err(TerrainError::invalid_argument(format!(
                "object layer is {}x{} but height field is {}x{}",
                objects.width(),
                objects.height(),
                field.width(),
                field.height()
            )));
        }
        let control_points = ControlPointCache::from_field(&field);
        Ok(Self {
            field,
            objects,
            control_points,
            catalog,
            mesher: TerrainMesher::new(config),
            raycaster: TerrainRaycaster::new(config),
        })
    }

    pub fn width(&self) -> u32 {
        self.field.width()
    }

    pub fn height(&self) -> u32 {
        self.field.height()
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn objects(&self) -> &ObjectLayer {
        &self.objects
    }

    pub fn catalog(&self) -> &ObjectCatalog {
        &self.catalog
    }

    pub fn control_points(&self) -> &ControlPointCache {
        &self.control_points
    }

    /// Elevation of grid vertex `(row, column)`. Panics outside the grid.
    pub fn height_at(&self, row: i32, column: i32) -> i32 {
        self.field.height_at(row, column)
    }

    pub fn raise(&mut self, row: i32, column: i32, to_level: i32) {
        self.field.raise(row, column, to_level);
    }

    pub fn lower(&mut self, row: i32, column: i32, to_level: i32) {
        self.field.lower(row, column, to_level);
    }

    pub fn crater(
        &mut self,
        row: i32,
        column: i32,
        outer_radius: i32,
        inner_radius: i32,
        peak: i32,
        floor: i32,
    ) {
        self.field
            .crater(row, column, outer_radius, inner_radius, peak, floor);
    }

    /// Recompute the control points after height edits.
    pub fn update_control_points(&mut self) {
        self.control_points.refresh(&self.field);
    }

    /// True when the control points reflect the latest height edits.
    pub fn is_current(&self) -> bool {
        self.control_points.is_current(&self.field)
    }

    pub fn is_flat(&self, row: i32, column: i32) -> bool {
        self.field.is_flat(row, column)
    }

    /// Object code at cell `(row, column)`; `None` outside the grid.
    pub fn object_at(&self, row: i32, column: i32) -> Option<u8> {
        self.cell_in_bounds(row, column)
            .then(|| self.objects.object_id(row as u32, column as u32))
    }

    /// Place an object on a free, flat cell. Code 0 clears the cell.
    pub fn place_object(&mut self, row: i32, column: i32, object_id: u8) -> TerrainResult<()> {
        if !self.catalog.contains(object_id) {
            return Err(TerrainError::invalid_argument(format!(
                "object code {object_id} is outside the catalog of {} kinds",
                self.catalog.len()
            )));
        }
        if !self.cell_in_bounds(row, column) {
            return Err(TerrainError::CellOutOfBounds { row, column });
        }
        let (r, c) = (row as u32, column as u32);
        if object_id == 0 {
            self.objects.clear(r, c);
            return Ok(());
        }

        let current = self.objects.object_id(r, c);
        if current != 0 {
            return Err(TerrainError::CellOccupied {
                row,
                column,
                object_id: current,
            });
        }
        if !self.field.is_flat(row, column) {
            return Err(TerrainError::CellNotFlat { row, column });
        }

        self.objects.set_object(r, c, object_id)?;
        log::debug!(
            "[GameMap] Placed {} at ({}, {})",
            self.catalog.asset(object_id).unwrap_or("?"),
            row,
            column
        );
        Ok(())
    }

    /// Remove and return the object on a cell, if any.
    pub fn remove_object(&mut self, row: i32, column: i32) -> Option<u8> {
        let id = self.object_at(row, column).filter(|&id| id != 0)?;
        self.objects.clear(row as u32, column as u32);
        Some(id)
    }

    pub fn build_surface_mesh(&self, sink: &mut dyn MeshSink) {
        self.warn_if_stale("surface mesh");
        self.mesher.build_surface_mesh(&self.control_points, sink);
    }

    pub fn build_grid_mesh(&self, sink: &mut dyn MeshSink) {
        self.warn_if_stale("grid mesh");
        self.mesher.build_grid_mesh(&self.control_points, sink);
    }

    /// First terrain point hit by `ray`.
    pub fn pick(&self, ray: &Ray) -> Option<Vec3> {
        self.warn_if_stale("pick");
        self.raycaster
            .intersect(ray, &self.field, &self.control_points)
    }

    /// Cell under the first terrain point hit by `ray`.
    pub fn pick_cell(&self, ray: &Ray) -> Option<(u32, u32)> {
        let hit = self.pick(ray)?;
        let row = (hit.x.floor() as i64).clamp(0, self.height() as i64 - 1);
        let column = (hit.z.floor() as i64).clamp(0, self.width() as i64 - 1);
        Some((row as u32, column as u32))
    }

    fn cell_in_bounds(&self, row: i32, column: i32) -> bool {
        row >= 0 && column >= 0 && (row as u32) < self.height() && (column as u32) < self.width()
    }

    fn warn_if_stale(&self, what: &str) {
        if !self.is_current() {
            log::warn!(
                "[GameMap] {} uses control points older than the height field; call update_control_points first",
                what
            );
        }
    }
}
