//! Camera Module
//!
//! Screen-to-world picking rays.

pub mod raycast;

pub use raycast::{Ray, RaycastConfig, get_ray_direction, screen_ray};
