//! Algebraic least-squares sphere fit over a set of 3D points.
//!
//! Uses the linear formulation popularized by Charles Jekel: with unknowns
//! `c = (cx, cy, cz, d)` where `d = r^2 - |c|^2`, every point `(x, y, z)`
//! on the sphere satisfies `2x*cx + 2y*cy + 2z*cz + d = x^2 + y^2 + z^2`,
//! so the fit reduces to one SVD-based least-squares solve.

use nalgebra::{DMatrix, DVector, Point3, SVD};

use crate::camera::GeometryError;

/// The sphere the camera centers of a project sit on: its center anchors
/// every camera's longitude/latitude.
///
/// Derived, never stored; recompute whenever the camera set changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereCenter {
    pub center: Point3<f64>,
    pub radius: f64,
}

/// Fits a sphere to `>= 4` points.
///
/// Four well-distributed points determine the four unknowns; coplanar or
/// collinear inputs leave the system rank-deficient.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateFit`] for fewer than 4 points, when
/// the SVD fails to factorize or solve, or when the fitted squared radius
/// is negative (wildly inconsistent input).
pub fn sphere_fit(points: &[Point3<f64>]) -> Result<SphereCenter, GeometryError> {
    if points.len() < 4 {
        return Err(GeometryError::DegenerateFit(format!(
            "sphere fit needs at least 4 points, got {}",
            points.len()
        )));
    }

    let n = points.len();
    let mut design = DMatrix::zeros(n, 4);
    let mut rhs = DVector::zeros(n);
    for (i, p) in points.iter().enumerate() {
        design[(i, 0)] = 2.0 * p.x;
        design[(i, 1)] = 2.0 * p.y;
        design[(i, 2)] = 2.0 * p.z;
        design[(i, 3)] = 1.0;
        rhs[i] = p.x * p.x + p.y * p.y + p.z * p.z;
    }

    let svd = SVD::try_new(design, true, true, f64::EPSILON, 0)
        .ok_or_else(|| GeometryError::DegenerateFit("SVD of sphere system did not converge".into()))?;
    let c = svd
        .solve(&rhs, f64::EPSILON)
        .map_err(|e| GeometryError::DegenerateFit(e.to_string()))?;

    let radius_sq = c[0] * c[0] + c[1] * c[1] + c[2] * c[2] + c[3];
    if radius_sq < 0.0 {
        return Err(GeometryError::DegenerateFit(format!(
            "fitted squared radius is negative ({radius_sq})"
        )));
    }

    Ok(SphereCenter {
        center: Point3::new(c[0], c[1], c[2]),
        radius: radius_sq.sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    fn on_sphere(center: Point3<f64>, radius: f64, dir: Vector3<f64>) -> Point3<f64> {
        center + dir.normalize() * radius
    }

    #[test]
    fn test_exact_fit_axis_aligned_points() {
        let center = Point3::new(1.0, -2.0, 3.0);
        let radius = 5.0;
        let dirs = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, -1.0),
        ];
        let points: Vec<Point3<f64>> =
            dirs.iter().map(|d| on_sphere(center, radius, *d)).collect();

        let fit = sphere_fit(&points).unwrap();
        assert_abs_diff_eq!(fit.center.x, center.x, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.center.y, center.y, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.center.z, center.z, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.radius, radius, epsilon = 1e-9);
    }

    #[test]
    fn test_exact_fit_oblique_points() {
        let center = Point3::new(-0.7, 12.5, 4.25);
        let radius = 2.5;
        let dirs = [
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(-1.0, 1.0, 1.0),
            Vector3::new(1.0, -1.0, 1.0),
            Vector3::new(1.0, 1.0, -1.0),
            Vector3::new(-1.0, -1.0, 1.0),
            Vector3::new(-2.0, 1.0, 0.5),
            Vector3::new(0.3, -0.2, 1.7),
        ];
        let points: Vec<Point3<f64>> =
            dirs.iter().map(|d| on_sphere(center, radius, *d)).collect();

        let fit = sphere_fit(&points).unwrap();
        assert_abs_diff_eq!(fit.center.x, center.x, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.center.y, center.y, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.center.z, center.z, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.radius, radius, epsilon = 1e-8);
    }

    #[test]
    fn test_too_few_points_is_rejected() {
        let points = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        assert!(matches!(
            sphere_fit(&points),
            Err(GeometryError::DegenerateFit(_))
        ));
    }
}
