//! Control Point Cache
//!
//! Five points per cell derived from the height field: the four corners
//! (NW, NE, SE, SW) at their grid positions plus an interpolated centre.
//! Both the mesher and the raycaster read these points so the rendered
//! surface and the picked surface are always the same triangles.
//!
//! The cache is not reactive. After any edit to the [`HeightField`] call
//! [`ControlPointCache::refresh`] before meshing or picking again.

use glam::Vec3;

use super::height_field::HeightField;

/// Points stored per cell.
pub const POINTS_PER_CELL: usize = 5;

/// Slot of each control point within a cell's five entries.
pub const NW: usize = 0;
pub const NE: usize = 1;
pub const SE: usize = 2;
pub const SW: usize = 3;
pub const CENTER: usize = 4;

/// Derived per-cell corner and centre points.
#[derive(Clone, Debug, Default)]
pub struct ControlPointCache {
    width: u32,
    height: u32,
    points: Vec<Vec3>,
    min_height: i32,
    max_height: i32,
    revision: Option<u64>,
}

impl ControlPointCache {
    /// Build a cache that is already current for `field`.
    pub fn from_field(field: &HeightField) -> Self {
        let mut cache = Self::default();
        cache.refresh(field);
        cache
    }

    /// Recompute every cell's control points from `field` in one pass.
    pub fn refresh(&mut self, field: &HeightField) {
        let (width, height) = (field.width(), field.height());
        self.width = width;
        self.height = height;
        self.points.clear();
        self.points
            .reserve(width as usize * height as usize * POINTS_PER_CELL);

        let mut min_height = i32::MAX;
        let mut max_height = i32::MIN;

        for row in 0..height as i32 {
            for column in 0..width as i32 {
                let h00 = field.height_at(row, column);
                let h01 = field.height_at(row, column + 1);
                let h11 = field.height_at(row + 1, column + 1);
                let h10 = field.height_at(row + 1, column);

                min_height = min_height.min(h00.min(h01).min(h11).min(h10));
                max_height = max_height.max(h00.max(h01).max(h11).max(h10));

                let (r, c) = (row as f32, column as f32);
                self.points.extend([
                    Vec3::new(r, h00 as f32, c),
                    Vec3::new(r, h01 as f32, c + 1.0),
                    Vec3::new(r + 1.0, h11 as f32, c + 1.0),
                    Vec3::new(r + 1.0, h10 as f32, c),
                    Vec3::new(r + 0.5, center_height(h00, h01, h11, h10), c + 0.5),
                ]);
            }
        }

        if self.points.is_empty() {
            min_height = 0;
            max_height = 0;
        }
        self.min_height = min_height;
        self.max_height = max_height;
        self.revision = Some(field.revision());

        log::debug!(
            "[ControlPointCache] Refreshed {}x{} cells, elevation {}..={}",
            width,
            height,
            min_height,
            max_height
        );
    }

    /// True when the cache was last refreshed from `field` at its current revision.
    pub fn is_current(&self, field: &HeightField) -> bool {
        self.revision == Some(field.revision())
            && self.width == field.width()
            && self.height == field.height()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Lowest corner elevation seen by the last refresh.
    pub fn min_height(&self) -> i32 {
        self.min_height
    }

    /// Highest corner elevation seen by the last refresh.
    pub fn max_height(&self) -> i32 {
        self.max_height
    }

    /// All control points, five consecutive entries per cell, row-major.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// The five control points of cell `(row, column)`. Panics outside the grid.
    pub fn cell(&self, row: u32, column: u32) -> &[Vec3] {
        let start = (row as usize * self.width as usize + column as usize) * POINTS_PER_CELL;
        &self.points[start..start + POINTS_PER_CELL]
    }

    /// The four triangles fanning from the cell's corners through its centre:
    /// `(NW, NE, C)`, `(NE, SE, C)`, `(SE, SW, C)`, `(SW, NW, C)`.
    pub fn cell_triangles(&self, row: u32, column: u32) -> [[Vec3; 3]; 4] {
        let p = self.cell(row, column);
        [
            [p[NW], p[NE], p[CENTER]],
            [p[NE], p[SE], p[CENTER]],
            [p[SE], p[SW], p[CENTER]],
            [p[SW], p[NW], p[CENTER]],
        ]
    }

    /// Lowest and highest corner elevation of one cell.
    pub fn cell_range(&self, row: u32, column: u32) -> (f32, f32) {
        let p = self.cell(row, column);
        let corners = [p[NW].y, p[NE].y, p[SE].y, p[SW].y];
        corners
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &y| (lo.min(y), hi.max(y)))
    }
}

/// Centre elevation of a cell from its corners (NW, NE, SE, SW).
///
/// Assumes the corners differ by at most one, which the height field
/// guarantees. Three or more raised corners fill the centre up, fewer than
/// two leave it low. With exactly two raised corners, equal NW/SE diagonals
/// continue the ridge at the high level; any other pair is a saddle split
/// halfway. The ridge case is a visual choice and must stay as is.
pub fn center_height(nw: i32, ne: i32, se: i32, sw: i32) -> f32 {
    let corners = [nw, ne, se, sw];
    let low = corners.iter().copied().min().unwrap_or(nw);
    let high = corners.iter().copied().max().unwrap_or(nw);
    let raised = corners.iter().filter(|&&h| h > low).count();

    if raised > 2 {
        high as f32
    } else if raised < 2 {
        low as f32
    } else if nw == se {
        high as f32
    } else {
        (high + low) as f32 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_height_flat() {
        assert_eq!(center_height(2, 2, 2, 2), 2.0);
    }

    #[test]
    fn test_center_height_single_raised_corner_stays_low() {
        assert_eq!(center_height(3, 2, 2, 2), 2.0);
        assert_eq!(center_height(2, 2, 3, 2), 2.0);
    }

    #[test]
    fn test_center_height_three_raised_corners_fill() {
        assert_eq!(center_height(3, 3, 3, 2), 3.0);
        assert_eq!(center_height(2, 3, 3, 3), 3.0);
    }

    #[test]
    fn test_center_height_saddle_splits_evenly() {
        // NW=3, NE=3, SE=2, SW=2: one raised edge, diagonals differ.
        assert_eq!(center_height(3, 3, 2, 2), 2.5);
        assert_eq!(center_height(-1, 0, 0, -1), -0.5);
    }

    #[test]
    fn test_center_height_diagonal_ridge_goes_high() {
        // NW=SE=3, NE=SW=2.
        assert_eq!(center_height(3, 2, 3, 2), 3.0);
        // NW=SE=2 is still "diagonal equal" and also takes the high value.
        assert_eq!(center_height(2, 3, 2, 3), 3.0);
    }

    #[test]
    fn test_refresh_layout_and_range() {
        let mut field = HeightField::new(3, 2, 0);
        field.raise(1, 1, 1);
        let cache = ControlPointCache::from_field(&field);

        assert_eq!(cache.points().len(), 3 * 2 * POINTS_PER_CELL);
        assert_eq!(cache.min_height(), 0);
        assert_eq!(cache.max_height(), 1);

        // Cell (0, 0): only SE corner (vertex 1,1) is raised.
        let p = cache.cell(0, 0);
        assert_eq!(p[NW], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(p[NE], Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(p[SE], Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(p[SW], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p[CENTER], Vec3::new(0.5, 0.0, 0.5));
        assert_eq!(cache.cell_range(0, 0), (0.0, 1.0));
    }

    #[test]
    fn test_staleness_tracking() {
        let mut field = HeightField::new(4, 4, 0);
        let mut cache = ControlPointCache::default();
        assert!(!cache.is_current(&field));

        cache.refresh(&field);
        assert!(cache.is_current(&field));

        field.raise(2, 2, 1);
        assert!(!cache.is_current(&field));
        assert_eq!(cache.max_height(), 0, "cache must not change until refreshed");

        cache.refresh(&field);
        assert!(cache.is_current(&field));
        assert_eq!(cache.max_height(), 1);
    }
}
