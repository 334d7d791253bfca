//! Maps discrete camera viewpoints onto a canonical sphere.
//!
//! Every camera's optical center is recovered from its `[R | t]` pose, the
//! centers are sphere-fitted, and each center-minus-anchor vector becomes a
//! navigable (longitude, latitude) pair in degrees.

use std::collections::BTreeMap;

use nalgebra::{Matrix3, Point3, Vector3};

use crate::camera::{Coordinates, Extrinsics, GeometryError};
use crate::geometry::sphere::sphere_fit;
use crate::util::rad_to_deg;

/// The camera's position in world coordinates: `center = -R^T * t`.
///
/// `[R | t]` maps world to camera, so the camera sits where the transform
/// sends the origin back.
pub fn camera_world_center(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Point3<f64> {
    Point3::from(-(rotation.transpose() * translation))
}

/// Geographic coordinates, in radians, of a vector anchored at the origin.
///
/// The vector is normalized first; `latitude = atan2(z, sqrt(x^2 + y^2))`,
/// `longitude = atan2(y, x)`. Returns `(longitude, latitude)`.
pub fn long_lat(vector: &Vector3<f64>) -> (f64, f64) {
    let normed = vector / vector.norm();
    let latitude = normed.z.atan2((normed.x * normed.x + normed.y * normed.y).sqrt());
    let longitude = normed.y.atan2(normed.x);
    (longitude, latitude)
}

/// Computes every camera's navigation coordinates for one project.
///
/// World centers are derived for all cameras, sphere-fitted to obtain the
/// shared anchor, and each camera's offset from the anchor is converted to
/// longitude/latitude degrees. The fit must cover the full camera set
/// before any single camera is mapped, so this is deliberately a batch
/// operation.
///
/// # Errors
///
/// Propagates [`GeometryError::DegenerateFit`] from the sphere fit (fewer
/// than 4 cameras, or badly distributed centers).
pub fn camera_coordinates(
    extrinsics: &BTreeMap<String, Extrinsics>,
) -> Result<BTreeMap<String, Coordinates>, GeometryError> {
    let mut centers: BTreeMap<&str, Point3<f64>> = BTreeMap::new();
    for (image, pose) in extrinsics {
        let center = camera_world_center(&pose.rotation(), &pose.translation());
        centers.insert(image.as_str(), center);
    }

    let anchor = sphere_fit(&centers.values().copied().collect::<Vec<_>>())?;

    let mut coordinates = BTreeMap::new();
    for (image, center) in centers {
        let (longitude, latitude) = long_lat(&(center - anchor.center));
        coordinates.insert(
            image.to_owned(),
            Coordinates {
                longitude: rad_to_deg(longitude),
                latitude: rad_to_deg(latitude),
            },
        );
    }
    Ok(coordinates)
}
