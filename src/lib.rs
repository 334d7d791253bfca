//! Photogrammetry Tools Library
//!
//! Camera-geometry engine for interactive multi-view photogrammetry: given
//! calibrated views (shared lens intrinsics plus a pose per image) of one
//! rigid object, this crate
//! - projects 3D points into any view's pixel space, lens distortion
//!   included ([`camera::rad_tan`]),
//! - recovers a 3D point from pixel positions clicked in two or more views
//!   ([`geometry::triangulation`]),
//! - lays the discrete viewpoints out on a canonical sphere so a user can
//!   orbit the object photo by photo ([`geometry::sphere`],
//!   [`geometry::orientation`]).
//!
//! Calibration import, thumbnailing, persistence and UI are deliberately
//! outside this crate; it consumes and produces plain value structures.
//! Every operation is a pure, synchronous function of its inputs, so the
//! whole API is safe to share across threads.

pub mod camera;
pub mod geometry;
pub mod util;
pub mod viewer;

// Re-export commonly used types
pub use camera::{Coordinates, Extrinsics, GeometryError, Intrinsics, MatrixData, Pos, WorldPoint};

pub use geometry::{
    camera_coordinates, camera_world_center, long_lat, sphere_fit, triangulate, Observation,
    SphereCenter,
};

pub use viewer::Scene;
