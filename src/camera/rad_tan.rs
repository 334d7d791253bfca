//! The 8-parameter rational radial-tangential distortion engine.
//!
//! Implements the forward lens model (ideal pixel to observed pixel) and its
//! fixed-point inverse (observed pixel back to ideal pixel) for distortion
//! coefficients ordered `(k1, k2, p1, p2, k3, k4, k5, k6)`, the common
//! OpenCV camera-calibration convention. The forward radial factor is the
//! rational
//!
//! ```text
//! (1 + k1*r^2 + k2*r^4 + k3*r^6) / (1 + k4*r^2 + k5*r^4 + k6*r^6)
//! ```
//!
//! with the usual `p1`/`p2` tangential terms. No closed-form inverse exists,
//! so [`undistort`] iterates; see its documentation for the convergence
//! contract.

use nalgebra::Vector2;

use crate::camera::{Extrinsics, Intrinsics, Pos, WorldPoint};

/// Hard budget of the undistortion fixed-point loop.
const MAX_ITERATIONS: u32 = 100;

/// Squared step size in normalized coordinates below which the fixed-point
/// loop is considered converged (a step of 1e-12, far below any pixel).
const CONVERGENCE_EPS_SQ: f64 = 1e-24;

/// Result of an undistortion query.
///
/// `converged` is informational: a `false` value means the iteration spent
/// its full budget and `pos` is the best estimate reached, which for extreme
/// coefficients or points far outside the calibrated field of view may be
/// off by more than a pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Undistorted {
    pub pos: Pos,
    pub converged: bool,
}

/// Applies the forward distortion model to an ideal (pinhole) pixel.
///
/// The pixel is normalized with the camera matrix, pushed through the
/// rational radial and tangential terms, and denormalized back to pixel
/// space with the same intrinsics.
///
/// # Examples
///
/// ```rust
/// use nalgebra::Matrix3;
/// use photogrammetry_tools::camera::{Intrinsics, Pos};
/// use photogrammetry_tools::camera::rad_tan::{distort, undistort};
///
/// let k = Matrix3::new(1000.0, 0.0, 500.0, 0.0, 1000.0, 500.0, 0.0, 0.0, 1.0);
/// let coeffs = [-0.28, 0.07, 2.0e-4, 1.8e-5, 0.0, 0.0, 0.0, 0.0];
/// let intr = Intrinsics::new(1000, 1000, k, &coeffs).unwrap();
///
/// let ideal = Pos { x: 640.0, y: 420.0 };
/// let observed = distort(&intr, &ideal);
/// let recovered = undistort(&intr, &observed);
/// assert!(recovered.converged);
/// assert!((recovered.pos.x - ideal.x).abs() < 1e-6);
/// assert!((recovered.pos.y - ideal.y).abs() < 1e-6);
/// ```
pub fn distort(intrinsics: &Intrinsics, ideal: &Pos) -> Pos {
    let p = intrinsics.normalize(ideal);
    let distorted = distort_normalized(intrinsics.distortion(), &p);
    intrinsics.denormalize(&distorted)
}

/// Recovers the ideal (pinhole) pixel behind an observed, distorted one.
///
/// Starting from the observed normalized point as both the running estimate
/// and the fixed target, each step divides out the rational radial factor
/// and subtracts the tangential displacement evaluated at the current
/// estimate. The loop stops early once the step falls below an internal
/// tolerance and always terminates after 100 iterations.
///
/// Non-convergence is not an error: the best estimate reached is returned
/// with [`Undistorted::converged`] set to `false`, and a warning is logged.
pub fn undistort(intrinsics: &Intrinsics, observed: &Pos) -> Undistorted {
    let [k1, k2, p1, p2, k3, k4, k5, k6] = *intrinsics.distortion();

    let target = intrinsics.normalize(observed);
    let mut point = target;

    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let (x, y) = (point.x, point.y);
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;

        let k_inv = (1.0 + k4 * r2 + k5 * r4 + k6 * r6) / (1.0 + k1 * r2 + k2 * r4 + k3 * r6);
        let dx = 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
        let dy = p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;

        let next = Vector2::new((target.x - dx) * k_inv, (target.y - dy) * k_inv);
        let step = next - point;
        point = next;
        if step.norm_squared() < CONVERGENCE_EPS_SQ {
            converged = true;
            break;
        }
    }

    if !converged {
        log::warn!(
            "undistortion of ({}, {}) did not converge after {} iterations",
            observed.x,
            observed.y,
            MAX_ITERATIONS
        );
    }

    Undistorted {
        pos: intrinsics.denormalize(&point),
        converged,
    }
}

/// Projects a homogeneous world point into a camera's pixel space, lens
/// distortion included.
///
/// The point is transformed by `[R | t]`, perspectively divided, distorted
/// and denormalized. There is no error path: a point on the camera plane
/// (`z = 0`) produces non-finite coordinates the caller can detect.
pub fn project_point(intrinsics: &Intrinsics, extrinsics: &Extrinsics, world: &WorldPoint) -> Pos {
    let camera_point = extrinsics.matrix() * world.to_homogeneous();
    let ideal = Vector2::new(
        camera_point.x / camera_point.z,
        camera_point.y / camera_point.z,
    );
    let distorted = distort_normalized(intrinsics.distortion(), &ideal);
    intrinsics.denormalize(&distorted)
}

/// Forward model on the normalized image plane.
fn distort_normalized(coeffs: &[f64; 8], ideal: &Vector2<f64>) -> Vector2<f64> {
    let [k1, k2, p1, p2, k3, k4, k5, k6] = *coeffs;
    let (x_u, y_u) = (ideal.x, ideal.y);

    let r2 = x_u * x_u + y_u * y_u;
    let r4 = r2 * r2;
    let r6 = r4 * r2;

    let radial = (1.0 + k1 * r2 + k2 * r4 + k3 * r6) / (1.0 + k4 * r2 + k5 * r4 + k6 * r6);
    let x = x_u * radial + 2.0 * p1 * x_u * y_u + p2 * (r2 + 2.0 * x_u * x_u);
    let y = y_u * radial + 2.0 * p2 * x_u * y_u + p1 * (r2 + 2.0 * y_u * y_u);

    Vector2::new(x, y)
}
