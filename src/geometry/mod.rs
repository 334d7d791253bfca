//! Multi-view geometric solvers: DLT triangulation, algebraic sphere
//! fitting, and the camera-orientation mapping built on top of both.

pub mod orientation;
pub mod sphere;
pub mod triangulation;

pub use orientation::{camera_coordinates, camera_world_center, long_lat};
pub use sphere::{sphere_fit, SphereCenter};
pub use triangulation::{triangulate, Observation};
