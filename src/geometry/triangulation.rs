//! Direct linear transform (DLT) triangulation of a 3D point from two or
//! more camera views.
//!
//! Each view contributes two linear constraints on the homogeneous point;
//! stacking them gives a `2n x 4` design matrix whose null space (the right
//! singular vector of the smallest singular value) is the sought point.
//! See Hartley & Zisserman, "Multiple View Geometry", ch. 12.

use nalgebra::{DMatrix, Matrix3x4, SVD};

use crate::camera::{GeometryError, Pos, WorldPoint};

/// One camera's contribution to a triangulation: its projection matrix and
/// the undistorted pixel where the physical point was observed.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub projection: Matrix3x4<f64>,
    pub pixel: Pos,
}

impl Observation {
    pub fn new(projection: Matrix3x4<f64>, pixel: Pos) -> Self {
        Observation { projection, pixel }
    }
}

/// Triangulates one homogeneous world point from `>= 2` observations.
///
/// For each view with projection rows `p1, p2, p3` and observed pixel
/// `(u, v)`, two rows are appended to the design matrix:
///
/// ```text
/// v * p3 - p2
/// u * p3 - p1
/// ```
///
/// The SVD null-space vector is rescaled so its homogeneous component is 1.
///
/// # Errors
///
/// * [`GeometryError::InsufficientViews`] for fewer than 2 observations;
///   nothing is computed in that case.
/// * [`GeometryError::DegenerateFit`] when the SVD fails to factorize or
///   the solution lies at infinity (parallel viewing rays).
pub fn triangulate(observations: &[Observation]) -> Result<WorldPoint, GeometryError> {
    if observations.len() < 2 {
        return Err(GeometryError::InsufficientViews(observations.len()));
    }

    let mut rows = Vec::with_capacity(observations.len() * 8);
    for obs in observations {
        let p = &obs.projection;
        let (u, v) = (obs.pixel.x, obs.pixel.y);
        for c in 0..4 {
            rows.push(v * p[(2, c)] - p[(1, c)]);
        }
        for c in 0..4 {
            rows.push(u * p[(2, c)] - p[(0, c)]);
        }
    }
    let design = DMatrix::from_row_slice(observations.len() * 2, 4, &rows);

    let svd = SVD::try_new(design, false, true, f64::EPSILON, 0)
        .ok_or_else(|| GeometryError::DegenerateFit("SVD of design matrix did not converge".into()))?;
    let v_t = svd
        .v_t
        .as_ref()
        .ok_or_else(|| GeometryError::DegenerateFit("SVD produced no right singular vectors".into()))?;

    // Row of V^T paired with the smallest singular value; nalgebra does not
    // guarantee a sorted spectrum, so look it up.
    let smallest = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .ok_or_else(|| GeometryError::DegenerateFit("SVD produced no singular values".into()))?;
    let h = v_t.row(smallest);

    let w = h[3];
    if w.abs() < f64::EPSILON {
        return Err(GeometryError::DegenerateFit(
            "triangulated point lies at infinity".into(),
        ));
    }

    Ok(WorldPoint {
        x: h[0] / w,
        y: h[1] / w,
        z: h[2] / w,
        w: 1.0,
    })
}
