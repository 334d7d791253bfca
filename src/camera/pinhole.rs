//! Ideal pinhole conversions between pixel space and the normalized image
//! plane, plus projection-matrix assembly.
//!
//! These are the distortion-free building blocks of the camera geometry: the
//! rational distortion model in [`crate::camera::rad_tan`] wraps them on both
//! sides, and the triangulation solver consumes the projection matrices
//! assembled here.

use nalgebra::{Matrix3x4, Vector2};

use crate::camera::{Extrinsics, Intrinsics, Pos};

impl Intrinsics {
    /// Converts a pixel position to normalized image-plane coordinates:
    /// `x = (px - cx) / fx`, `y = (py - cy) / fy`.
    pub fn normalize(&self, pixel: &Pos) -> Vector2<f64> {
        Vector2::new(
            (pixel.x - self.cx()) / self.fx(),
            (pixel.y - self.cy()) / self.fy(),
        )
    }

    /// Converts normalized image-plane coordinates back to a pixel position.
    ///
    /// Inverse of [`Intrinsics::normalize`].
    pub fn denormalize(&self, point: &Vector2<f64>) -> Pos {
        Pos {
            x: point.x * self.fx() + self.cx(),
            y: point.y * self.fy() + self.cy(),
        }
    }
}

/// Assembles the 3x4 projection matrix `P = K * [R | t]` for one view.
///
/// `P` maps homogeneous world points to homogeneous pixel coordinates;
/// dividing by the third component yields the ideal (undistorted) pixel.
pub fn projection_matrix(intrinsics: &Intrinsics, extrinsics: &Extrinsics) -> Matrix3x4<f64> {
    intrinsics.camera_matrix() * extrinsics.matrix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Matrix3x4, Vector4};

    fn intrinsics() -> Intrinsics {
        let k = Matrix3::new(1000.0, 0.0, 500.0, 0.0, 1000.0, 500.0, 0.0, 0.0, 1.0);
        Intrinsics::new(1000, 1000, k, &[0.0; 8]).unwrap()
    }

    #[test]
    fn test_normalize_denormalize_round_trip() {
        let intr = intrinsics();
        let pixel = Pos { x: 712.5, y: 320.25 };
        let normalized = intr.normalize(&pixel);
        let back = intr.denormalize(&normalized);
        assert_relative_eq!(back.x, pixel.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, pixel.y, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_principal_point_is_origin() {
        let intr = intrinsics();
        let normalized = intr.normalize(&Pos { x: 500.0, y: 500.0 });
        assert_relative_eq!(normalized.x, 0.0);
        assert_relative_eq!(normalized.y, 0.0);
    }

    #[test]
    fn test_projection_matrix_identity_pose() {
        let intr = intrinsics();
        let pose = Extrinsics::new(Matrix3x4::from_row_slice(&[
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0,
        ]));
        let p = projection_matrix(&intr, &pose);
        assert_eq!(p.fixed_view::<3, 3>(0, 0).into_owned(), *intr.camera_matrix());
        assert_eq!(p.column(3).sum(), 0.0);
    }

    // Camera 10 units behind the origin, looking along +z: the world origin
    // must land exactly on the principal point.
    #[test]
    fn test_world_origin_projects_to_principal_point() {
        let intr = intrinsics();
        let pose = Extrinsics::new(Matrix3x4::from_row_slice(&[
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, -10.0,
        ]));
        let p = projection_matrix(&intr, &pose);
        let projected = p * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let u = projected.x / projected.z;
        let v = projected.y / projected.z;
        assert_relative_eq!(u, 500.0, epsilon = 1e-9);
        assert_relative_eq!(v, 500.0, epsilon = 1e-9);
    }
}
