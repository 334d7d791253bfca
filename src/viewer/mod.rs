//! Project-level operations over one calibrated multi-view scene.
//!
//! A [`Scene`] bundles what the import layer delivers for a project: the
//! shared [`Intrinsics`], one [`Extrinsics`] per image, and the named
//! shortcut views ("FRONT", "LEFT", ...) the loader ships alongside them.
//! On top of that it exposes the three queries an interactive viewer needs:
//! projecting a world point into an image, triangulating a landmark from
//! clicked pixels, and laying every image out on the navigation sphere.
//!
//! A `Scene` is a plain value: every query is a pure function of it and its
//! arguments, so shared references can be used from multiple threads.

use std::collections::BTreeMap;

use crate::camera::pinhole::projection_matrix;
use crate::camera::rad_tan::{project_point, undistort};
use crate::camera::{Coordinates, Extrinsics, GeometryError, Intrinsics, Pos, WorldPoint};
use crate::geometry::orientation::camera_coordinates;
use crate::geometry::triangulation::{triangulate, Observation};

/// One project's calibrated views, keyed by image identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    intrinsics: Intrinsics,
    extrinsics: BTreeMap<String, Extrinsics>,
    shortcuts: BTreeMap<String, Coordinates>,
}

impl Scene {
    pub fn new(
        intrinsics: Intrinsics,
        extrinsics: BTreeMap<String, Extrinsics>,
        shortcuts: BTreeMap<String, Coordinates>,
    ) -> Self {
        Scene {
            intrinsics,
            extrinsics,
            shortcuts,
        }
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.extrinsics.keys().map(String::as_str)
    }

    /// Loader-supplied coordinates of a canonical named view, if present.
    pub fn shortcut(&self, name: &str) -> Option<&Coordinates> {
        self.shortcuts.get(name)
    }

    /// Projects a homogeneous world point into the named image, distortion
    /// included.
    ///
    /// # Errors
    ///
    /// [`GeometryError::UnknownImage`] when no pose is registered for
    /// `image`.
    pub fn project(&self, image: &str, point: &WorldPoint) -> Result<Pos, GeometryError> {
        let pose = self.pose(image)?;
        Ok(project_point(&self.intrinsics, pose, point))
    }

    /// Triangulates one landmark from its clicked position in two or more
    /// images.
    ///
    /// Each click is undistorted (best effort, see
    /// [`crate::camera::rad_tan::undistort`]) and paired with its image's
    /// projection matrix before the DLT solve.
    ///
    /// # Errors
    ///
    /// * [`GeometryError::UnknownImage`] for a click on an image without a
    ///   registered pose.
    /// * [`GeometryError::InsufficientViews`] / [`GeometryError::DegenerateFit`]
    ///   from the solver.
    pub fn triangulate(&self, clicks: &BTreeMap<String, Pos>) -> Result<WorldPoint, GeometryError> {
        let mut observations = Vec::with_capacity(clicks.len());
        for (image, click) in clicks {
            let pose = self.pose(image)?;
            let undistorted = undistort(&self.intrinsics, click);
            observations.push(Observation::new(
                projection_matrix(&self.intrinsics, pose),
                undistorted.pos,
            ));
        }
        triangulate(&observations)
    }

    /// Longitude/latitude of every image, in degrees, against the sphere
    /// fitted to this project's camera centers.
    ///
    /// # Errors
    ///
    /// [`GeometryError::DegenerateFit`] when the camera set cannot anchor a
    /// sphere (fewer than 4 cameras, or degenerate placement).
    pub fn coordinates(&self) -> Result<BTreeMap<String, Coordinates>, GeometryError> {
        camera_coordinates(&self.extrinsics)
    }

    fn pose(&self, image: &str) -> Result<&Extrinsics, GeometryError> {
        self.extrinsics
            .get(image)
            .ok_or_else(|| GeometryError::UnknownImage(image.to_owned()))
    }
}
