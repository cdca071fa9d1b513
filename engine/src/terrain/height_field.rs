//! Height Field
//!
//! Integer elevation grid with `(width + 1) * (height + 1)` vertices shared by
//! the `width x height` cells. Every edit keeps 8-adjacent vertices within one
//! unit of each other by propagating a one-step slope outward from the edited
//! vertex until it meets terrain that already satisfies it.

/// Offsets to the eight neighbours of a grid vertex.
const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Largest cell count along either axis, so every vertex coordinate fits `i32`.
pub const MAX_DIMENSION: u32 = i32::MAX as u32 - 1;

/// Mutable elevation grid with the bounded-slope invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeightField {
    width: i32,
    height: i32,
    heights: Vec<i32>,
    revision: u64,
}

impl HeightField {
    /// Create a field of `width x height` cells with every vertex at `base_elevation`.
    ///
    /// # Panics
    /// If either dimension exceeds [`MAX_DIMENSION`].
    pub fn new(width: u32, height: u32, base_elevation: i32) -> Self {
        let (Some(w), Some(h)) = (dimension(width), dimension(height)) else {
            panic!("height field {width}x{height} exceeds the {MAX_DIMENSION} cell limit");
        };
        let len = (width as usize + 1) * (height as usize + 1);
        Self {
            width: w,
            height: h,
            heights: vec![base_elevation; len],
            revision: 0,
        }
    }

    /// Rebuild a field from a row-major vertex array.
    ///
    /// Returns `None` when a dimension exceeds [`MAX_DIMENSION`] or `heights`
    /// does not hold `(width + 1) * (height + 1)` entries. The slope invariant
    /// is not re-checked.
    pub fn from_heights(width: u32, height: u32, heights: Vec<i32>) -> Option<Self> {
        let (w, h) = (dimension(width)?, dimension(height)?);
        let expected = (width as usize + 1).checked_mul(height as usize + 1)?;
        if heights.len() != expected {
            return None;
        }
        Some(Self {
            width: w,
            height: h,
            heights,
            revision: 0,
        })
    }

    /// Number of cells along the column axis.
    pub fn width(&self) -> u32 {
        self.width as u32
    }

    /// Number of cells along the row axis.
    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Row-major vertex elevations.
    pub fn heights(&self) -> &[i32] {
        &self.heights
    }

    /// Bumped by every edit that changed at least one vertex.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Elevation of grid vertex `(row, column)`.
    ///
    /// Requires `0 <= row <= height` and `0 <= column <= width`; other inputs
    /// panic or read a wrapped vertex.
    pub fn height_at(&self, row: i32, column: i32) -> i32 {
        self.heights[self.index(row, column)]
    }

    /// Checked variant of [`HeightField::height_at`].
    pub fn get(&self, row: i32, column: i32) -> Option<i32> {
        self.contains(row, column)
            .then(|| self.heights[self.index(row, column)])
    }

    /// True when `(row, column)` names a grid vertex.
    pub fn contains(&self, row: i32, column: i32) -> bool {
        row >= 0 && row <= self.height && column >= 0 && column <= self.width
    }

    /// True when all four corners of cell `(row, column)` share one elevation.
    /// Cells outside the grid are never flat.
    pub fn is_flat(&self, row: i32, column: i32) -> bool {
        if row < 0 || row >= self.height || column < 0 || column >= self.width {
            return false;
        }
        let h = self.height_at(row, column);
        h == self.height_at(row, column + 1)
            && h == self.height_at(row + 1, column + 1)
            && h == self.height_at(row + 1, column)
    }

    pub fn min_height(&self) -> i32 {
        self.heights.iter().copied().min().unwrap_or(0)
    }

    pub fn max_height(&self) -> i32 {
        self.heights.iter().copied().max().unwrap_or(0)
    }

    /// Raise vertex `(row, column)` to `to_level`, lifting neighbours so no
    /// slope exceeds one unit. Never lowers anything.
    pub fn raise(&mut self, row: i32, column: i32, to_level: i32) {
        self.propagate(row, column, to_level, Direction::Up);
    }

    /// Lower vertex `(row, column)` to `to_level`, dropping neighbours so no
    /// slope exceeds one unit. Never raises anything.
    pub fn lower(&mut self, row: i32, column: i32, to_level: i32) {
        self.propagate(row, column, to_level, Direction::Down);
    }

    /// Carve a crater centred on vertex `(row, column)`.
    ///
    /// Every vertex strictly inside `outer_radius` is raised to `peak`, then
    /// every vertex strictly inside `inner_radius` is lowered to `floor`. The
    /// two passes always run in that order, whatever the radii. A negative
    /// radius selects no vertices.
    pub fn crater(
        &mut self,
        row: i32,
        column: i32,
        outer_radius: i32,
        inner_radius: i32,
        peak: i32,
        floor: i32,
    ) {
        for (r, c) in disc(row, column, outer_radius, self.height, self.width) {
            self.raise(r, c, peak);
        }
        for (r, c) in disc(row, column, inner_radius, self.height, self.width) {
            self.lower(r, c, floor);
        }
    }

    /// Pairs of 8-adjacent vertices whose elevations differ by more than one.
    ///
    /// Empty for any field built by `new` and edited only through
    /// raise/lower/crater.
    pub fn slope_violations(&self) -> impl Iterator<Item = ((i32, i32), (i32, i32))> + '_ {
        (0..=self.height).flat_map(move |row| {
            (0..=self.width).flat_map(move |column| {
                // Forward half of the neighbourhood, so each pair is seen once.
                [(0, 1), (1, -1), (1, 0), (1, 1)]
                    .into_iter()
                    .filter_map(move |(dr, dc)| {
                        let (nr, nc) = (row + dr, column + dc);
                        if !self.contains(nr, nc) {
                            return None;
                        }
                        let diff = (self.height_at(row, column) - self.height_at(nr, nc)).abs();
                        (diff > 1).then_some(((row, column), (nr, nc)))
                    })
            })
        })
    }

    fn index(&self, row: i32, column: i32) -> usize {
        (row * (self.width + 1) + column) as usize
    }

    /// Worklist flood shared by raise and lower.
    ///
    /// A vertex is only written when it is strictly below (raise) or above
    /// (lower) the requested level, so the fixed point does not depend on
    /// the order neighbours are visited.
    fn propagate(&mut self, row: i32, column: i32, to_level: i32, direction: Direction) {
        let mut pending = vec![(row, column, to_level)];
        let mut changed = false;

        while let Some((r, c, level)) = pending.pop() {
            if !self.contains(r, c) {
                continue;
            }
            let idx = self.index(r, c);
            let current = self.heights[idx];
            let settled = match direction {
                Direction::Up => current >= level,
                Direction::Down => current <= level,
            };
            if settled {
                continue;
            }

            self.heights[idx] = level;
            changed = true;

            let next = match direction {
                Direction::Up => level - 1,
                Direction::Down => level + 1,
            };
            pending.extend(NEIGHBOURS.iter().map(|(dr, dc)| (r + dr, c + dc, next)));
        }

        if changed {
            self.revision += 1;
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Up,
    Down,
}

fn dimension(cells: u32) -> Option<i32> {
    i32::try_from(cells).ok().filter(|_| cells <= MAX_DIMENSION)
}

/// Grid vertices with squared distance strictly below `radius²` from the
/// centre, clipped to `0..=max_row` x `0..=max_column`.
fn disc(
    row: i32,
    column: i32,
    radius: i32,
    max_row: i32,
    max_column: i32,
) -> impl Iterator<Item = (i32, i32)> {
    // i64 throughout: |dr| and |dc| never exceed |radius|, so the squares fit.
    let (row, column, radius) = (i64::from(row), i64::from(column), i64::from(radius));
    let radius_sq = radius * radius;
    let rows = (row - radius).max(0)..=(row + radius).min(i64::from(max_row));
    let columns = (column - radius).max(0)..=(column + radius).min(i64::from(max_column));
    rows.flat_map(move |r| {
        columns.clone().filter_map(move |c| {
            let (dr, dc) = (r - row, c - column);
            (dr * dr + dc * dc < radius_sq).then_some((r as i32, c as i32))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_flat_at_base() {
        let field = HeightField::new(4, 3, 7);
        assert_eq!(field.heights().len(), 5 * 4);
        assert!(field.heights().iter().all(|&h| h == 7));
        assert!(field.is_flat(0, 0));
        assert!(field.is_flat(2, 3));
        assert!(!field.is_flat(3, 0), "row 3 is past the last cell");
    }

    #[test]
    fn test_raise_single_vertex_builds_pyramid() {
        let mut field = HeightField::new(10, 10, 0);
        field.raise(5, 5, 3);

        assert_eq!(field.height_at(5, 5), 3);
        assert_eq!(field.height_at(4, 4), 2);
        assert_eq!(field.height_at(5, 7), 1);
        assert_eq!(field.height_at(8, 5), 0);
        assert_eq!(field.slope_violations().count(), 0);
    }

    #[test]
    fn test_lower_single_vertex_digs_pit() {
        let mut field = HeightField::new(10, 10, 0);
        field.lower(5, 5, -2);

        assert_eq!(field.height_at(5, 5), -2);
        assert_eq!(field.height_at(6, 6), -1);
        assert_eq!(field.height_at(7, 7), 0);
        assert_eq!(field.slope_violations().count(), 0);
    }

    #[test]
    fn test_out_of_bounds_edits_are_noops() {
        let mut field = HeightField::new(4, 4, 1);
        let before = field.clone();

        field.raise(-1, 2, 10);
        field.raise(2, 5, 10);
        field.lower(5, 0, -10);

        assert_eq!(field, before);
        assert_eq!(field.revision(), 0);
    }

    #[test]
    fn test_raise_below_current_level_is_noop() {
        let mut field = HeightField::new(4, 4, 5);
        field.raise(2, 2, 3);
        field.lower(2, 2, 8);
        assert!(field.heights().iter().all(|&h| h == 5));
        assert_eq!(field.revision(), 0);
    }

    #[test]
    fn test_raise_at_edge_is_clipped() {
        let mut field = HeightField::new(4, 4, 0);
        field.raise(0, 0, 2);
        assert_eq!(field.height_at(0, 0), 2);
        assert_eq!(field.height_at(1, 1), 1);
        assert_eq!(field.height_at(2, 2), 0);
    }

    #[test]
    fn test_revision_bumps_only_on_change() {
        let mut field = HeightField::new(4, 4, 0);
        field.raise(1, 1, 1);
        assert_eq!(field.revision(), 1);
        field.raise(1, 1, 1);
        assert_eq!(field.revision(), 1);
    }

    #[test]
    fn test_negative_radius_crater_does_nothing() {
        let mut field = HeightField::new(8, 8, 0);
        field.crater(4, 4, -3, -2, 5, -5);
        assert!(field.heights().iter().all(|&h| h == 0));
    }

    #[test]
    fn test_crater_inner_larger_than_outer_keeps_pass_order() {
        let mut field = HeightField::new(20, 20, 0);
        field.crater(10, 10, 2, 4, 3, -1);

        // The lowering pass runs last, so the whole inner disc ends at the floor.
        for (r, c) in disc(10, 10, 4, 20, 20) {
            assert_eq!(field.height_at(r, c), -1, "vertex ({r}, {c})");
        }
        assert_eq!(field.slope_violations().count(), 0);
    }

    #[test]
    fn test_huge_and_far_craters_stay_on_the_grid() {
        let mut field = HeightField::new(8, 8, 0);
        field.crater(i32::MIN, i32::MAX, i32::MAX, i32::MAX, 5, -5);
        assert!(field.heights().iter().all(|&h| h == 0));

        field.crater(4, 4, i32::MAX, 0, 3, 0);
        assert!(field.heights().iter().all(|&h| h == 3));

        field.crater(-100_000, 4, 200_000, 100_009, 3, 1);
        assert!(field.heights().iter().all(|&h| h == 1));
    }

    #[test]
    fn test_disc_is_clipped_to_the_grid() {
        assert_eq!(disc(0, 0, 2, 4, 4).count(), 4);
        assert_eq!(disc(0, 0, 2, 0, 0).collect::<Vec<_>>(), vec![(0, 0)]);
        assert_eq!(disc(10, 10, 3, 4, 4).count(), 0);
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        assert!(HeightField::from_heights(u32::MAX, 0, vec![0]).is_none());
        assert!(HeightField::from_heights(MAX_DIMENSION + 1, 0, vec![0]).is_none());
    }

    #[test]
    #[should_panic(expected = "cell limit")]
    fn test_new_panics_past_dimension_limit() {
        let _ = HeightField::new(u32::MAX, 0, 0);
    }

    #[test]
    fn test_from_heights_rejects_wrong_length() {
        assert!(HeightField::from_heights(2, 2, vec![0; 8]).is_none());
        let field = HeightField::from_heights(2, 2, (0..9).collect()).unwrap();
        assert_eq!(field.height_at(1, 2), 5);
        assert_eq!(field.get(3, 0), None);
    }
}
