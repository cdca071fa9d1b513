//! Raycast Module
//!
//! Builds world-space picking rays from a camera and a screen point. The
//! terrain raycaster consumes these rays to find the cell under the cursor.

use glam::Vec3;

/// A half-line `origin + t * direction` for `t >= 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction, or zero for a degenerate ray.
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; `direction` is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from `from` through `to`.
    pub fn between(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Point at parameter `t`.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Calculate ray direction from screen UV coordinates
///
/// # Arguments
/// * `camera_pos` - Camera position in world space
/// * `camera_target` - Point the camera is looking at
/// * `uv` - Normalized screen coordinates (0-1, 0-1) where (0,0) is bottom-left
/// * `aspect_ratio` - Screen aspect ratio (width / height)
/// * `fov` - Vertical field of view in radians
///
/// # Returns
/// Normalized ray direction in world space
pub fn get_ray_direction(
    camera_pos: Vec3,
    camera_target: Vec3,
    uv: (f32, f32),
    aspect_ratio: f32,
    fov: f32,
) -> Vec3 {
    let ndc = (uv.0 * 2.0 - 1.0, uv.1 * 2.0 - 1.0);
    let half_fov = (fov * 0.5_f32).tan();

    let forward = (camera_target - camera_pos).normalize_or_zero();

    // Looking straight up or down: use world X as the right vector
    let (right, up) = if forward.y.abs() > 0.99 {
        let right = Vec3::X;
        let up = right.cross(forward).normalize();
        (right, up)
    } else {
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        (right, up)
    };

    (forward + right * ndc.0 * aspect_ratio * half_fov + up * ndc.1 * half_fov).normalize()
}

/// Picking ray through a screen point.
pub fn screen_ray(
    camera_pos: Vec3,
    camera_target: Vec3,
    uv: (f32, f32),
    aspect_ratio: f32,
    fov: f32,
) -> Ray {
    Ray::new(
        camera_pos,
        get_ray_direction(camera_pos, camera_target, uv, aspect_ratio, fov),
    )
}

/// Raycast configuration for convenience
#[derive(Clone, Copy, Debug)]
pub struct RaycastConfig {
    /// Screen aspect ratio (width / height)
    pub aspect_ratio: f32,
    /// Vertical field of view in radians
    pub fov: f32,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 16.0 / 9.0,
            fov: 30.0_f32.to_radians(),
        }
    }
}

impl RaycastConfig {
    /// Create a new raycast config with the given aspect ratio
    pub fn with_aspect(aspect_ratio: f32) -> Self {
        Self {
            aspect_ratio,
            ..Default::default()
        }
    }

    /// Picking ray through `uv` using this config
    pub fn screen_ray(&self, camera_pos: Vec3, camera_target: Vec3, uv: (f32, f32)) -> Ray {
        screen_ray(camera_pos, camera_target, uv, self.aspect_ratio, self.fov)
    }
}
