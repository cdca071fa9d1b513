//! Terrain Raycaster
//!
//! Finds where a ray first meets the terrain surface.
//!
//! The ray is clipped against the terrain's bounding box and then marched
//! cell boundary by cell boundary (3D DDA). Cells whose corner elevations are
//! near the ray's elevation at that point get an exact ray/triangle test
//! against the same four fan triangles the mesher emits.

use glam::Vec3;

use super::control_points::ControlPointCache;
use super::height_field::HeightField;
use crate::camera::raycast::Ray;
use crate::config::TerrainConfig;

/// Tolerance for barycentric edge tests, so hits on shared edges and
/// vertices are not lost between two triangles.
const EDGE_EPSILON: f32 = 1e-5;

/// Picks points on the terrain surface.
#[derive(Clone, Copy, Debug)]
pub struct TerrainRaycaster {
    /// How far (in elevation units) a marched point may sit outside a cell's
    /// corner range and still have that cell tested.
    pub tolerance: f32,
}

impl Default for TerrainRaycaster {
    fn default() -> Self {
        Self::new(&TerrainConfig::default())
    }
}

impl TerrainRaycaster {
    pub fn new(config: &TerrainConfig) -> Self {
        Self {
            tolerance: config.pick_tolerance,
        }
    }

    /// First point where `ray` hits the surface described by `cache`.
    ///
    /// `field` supplies the grid footprint; `cache` must have been refreshed
    /// from it. Returns `None` when the ray misses the terrain.
    pub fn intersect(
        &self,
        ray: &Ray,
        field: &HeightField,
        cache: &ControlPointCache,
    ) -> Option<Vec3> {
        let (rows, columns) = (field.height() as i32, field.width() as i32);
        if rows == 0 || columns == 0 || ray.direction == Vec3::ZERO {
            return None;
        }

        let box_min = Vec3::new(0.0, cache.min_height() as f32 - 1.0, 0.0);
        let box_max = Vec3::new(rows as f32, cache.max_height() as f32 + 1.0, columns as f32);

        // Restart the ray where it enters the box. Boundary parameters are
        // then small, so a distant origin does not swallow the cell steps.
        let (t_enter, t_exit) = slab_range(ray.origin, ray.direction, box_min, box_max)?;
        if t_exit < 0.0 {
            return None;
        }
        let ray = &Ray {
            origin: ray.at(t_enter.max(0.0)).clamp(box_min, box_max),
            direction: ray.direction,
        };

        // Mirror every axis with a negative direction so all steps go forward.
        // Mirroring keeps the ray parameter t, so real points are still
        // `ray.at(t)`; only boundary crossings are computed in mirrored space.
        let mut origin = ray.origin;
        let mut direction = ray.direction;
        let mut lo = box_min;
        let mut hi = box_max;
        for axis in 0..3 {
            if direction[axis] < 0.0 {
                origin[axis] = -origin[axis];
                direction[axis] = -direction[axis];
                let (a, b) = (-hi[axis], -lo[axis]);
                lo[axis] = a;
                hi[axis] = b;
            }
        }

        let (t_enter, t_exit) = slab_range(origin, direction, lo, hi)?;
        let mut t = t_enter.max(0.0);
        if t >= t_exit {
            return None;
        }

        // Parameter of the next integer boundary on each axis.
        let entry = origin + direction * t;
        let mut next_boundary = Vec3::splat(f32::INFINITY);
        let mut step = Vec3::splat(f32::INFINITY);
        for axis in 0..3 {
            if direction[axis] > 0.0 {
                let boundary = entry[axis].floor() + 1.0;
                next_boundary[axis] = (boundary - origin[axis]) / direction[axis];
                step[axis] = 1.0 / direction[axis];
            }
        }

        while t < t_exit {
            let axis = min_axis(next_boundary);
            let segment_end = next_boundary[axis].min(t_exit);

            // Sampling the middle of the segment avoids ambiguity on boundaries.
            let sample = ray.at((t + segment_end) * 0.5);
            let row = sample.x.floor() as i32;
            let column = sample.z.floor() as i32;

            if row >= 0 && row < rows && column >= 0 && column < columns {
                let (lo_h, hi_h) = cache.cell_range(row as u32, column as u32);
                if sample.y >= lo_h - self.tolerance && sample.y <= hi_h + self.tolerance {
                    if let Some(hit) = self.intersect_cell(ray, cache, row as u32, column as u32) {
                        return Some(hit);
                    }
                }
            }

            t = t.max(segment_end);
            next_boundary[axis] += step[axis];
        }

        None
    }

    /// Closest hit between `ray` and the four triangles of one cell.
    pub fn intersect_cell(
        &self,
        ray: &Ray,
        cache: &ControlPointCache,
        row: u32,
        column: u32,
    ) -> Option<Vec3> {
        cache
            .cell_triangles(row, column)
            .iter()
            .filter_map(|[a, b, c]| ray_triangle(ray, *a, *b, *c))
            .min_by(|x, y| x.total_cmp(y))
            .map(|t| ray.at(t))
    }
}

/// Slab-method entry and exit parameters. `None` if the ray's line never
/// overlaps the box; touching a face or edge yields `t_enter == t_exit`.
fn slab_range(origin: Vec3, direction: Vec3, lo: Vec3, hi: Vec3) -> Option<(f32, f32)> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        if direction[axis] == 0.0 {
            if origin[axis] < lo[axis] || origin[axis] > hi[axis] {
                return None;
            }
            continue;
        }
        let t0 = (lo[axis] - origin[axis]) / direction[axis];
        let t1 = (hi[axis] - origin[axis]) / direction[axis];
        t_min = t_min.max(t0.min(t1));
        t_max = t_max.min(t0.max(t1));
    }
    (t_min <= t_max).then_some((t_min, t_max))
}

fn min_axis(v: Vec3) -> usize {
    if v.x <= v.y && v.x <= v.z {
        0
    } else if v.y <= v.z {
        1
    } else {
        2
    }
}

/// Möller–Trumbore ray/triangle test, two-sided.
///
/// Returns the ray parameter of the hit, which is never negative.
pub fn ray_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < 1e-9 {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if u < -EDGE_EPSILON || u > 1.0 + EDGE_EPSILON {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < -EDGE_EPSILON || u + v > 1.0 + EDGE_EPSILON {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}
