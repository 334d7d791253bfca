use nalgebra::{Matrix3, Matrix3x4, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

pub mod pinhole;
pub mod rad_tan;

/// A 2D pixel position in image space (distorted/observed, as clicked by a
/// user or consumed by a renderer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pos {
    pub x: f64,
    pub y: f64,
}

/// Navigation anchor of one camera relative to the project's sphere center.
///
/// Longitude is in `(-180, 180]` degrees, latitude in `[-90, 90]` degrees.
/// Both are derived quantities, never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

/// A homogeneous 3D point; divide by `w` before interpreting as Euclidean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl WorldPoint {
    pub fn from_homogeneous(v: &Vector4<f64>) -> Self {
        WorldPoint {
            x: v.x,
            y: v.y,
            z: v.z,
            w: v.w,
        }
    }

    pub fn to_homogeneous(&self) -> Vector4<f64> {
        Vector4::new(self.x, self.y, self.z, self.w)
    }

    /// Perspective division by the homogeneous component.
    pub fn to_euclidean(&self) -> Point3<f64> {
        Point3::new(self.x / self.w, self.y / self.w, self.z / self.w)
    }
}

/// Wire representation of a matrix: shape plus a flat row-major data
/// sequence of `rows * cols` IEEE-754 doubles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixData {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
}

impl MatrixData {
    pub fn to_matrix3(&self) -> Result<Matrix3<f64>, GeometryError> {
        self.check_shape(3, 3)?;
        Ok(Matrix3::from_row_slice(&self.data))
    }

    pub fn to_matrix3x4(&self) -> Result<Matrix3x4<f64>, GeometryError> {
        self.check_shape(3, 4)?;
        Ok(Matrix3x4::from_row_slice(&self.data))
    }

    fn check_shape(&self, rows: usize, cols: usize) -> Result<(), GeometryError> {
        if self.rows != rows || self.cols != cols {
            return Err(GeometryError::MalformedIntrinsics(format!(
                "expected a {}x{} matrix, got {}x{}",
                rows, cols, self.rows, self.cols
            )));
        }
        if self.data.len() != rows * cols {
            return Err(GeometryError::MalformedIntrinsics(format!(
                "matrix data length {} does not match shape {}x{}",
                self.data.len(),
                rows,
                cols
            )));
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GeometryError {
    #[error("triangulation needs at least 2 views, got {0}")]
    InsufficientViews(usize),
    #[error("degenerate fit: {0}")]
    DegenerateFit(String),
    #[error("malformed intrinsics: {0}")]
    MalformedIntrinsics(String),
    #[error("no extrinsics registered for image {0:?}")]
    UnknownImage(String),
}

/// Shared per-project lens and sensor parameters.
///
/// The camera matrix is the usual `[[fx, 0, cx], [0, fy, cy], [0, 0, 1]]`
/// and the distortion coefficients follow the 8-parameter rational model
/// ordering `(k1, k2, p1, p2, k3, k4, k5, k6)`. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Intrinsics {
    pub width: u32,
    pub height: u32,
    camera_matrix: Matrix3<f64>,
    distortion: [f64; 8],
}

impl Intrinsics {
    /// Validates and builds an intrinsic model.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MalformedIntrinsics`] when the coefficient
    /// slice does not hold exactly 8 entries, when a focal length is not
    /// positive, or when the principal point is not finite.
    pub fn new(
        width: u32,
        height: u32,
        camera_matrix: Matrix3<f64>,
        distortion: &[f64],
    ) -> Result<Self, GeometryError> {
        let distortion: [f64; 8] = distortion.try_into().map_err(|_| {
            GeometryError::MalformedIntrinsics(format!(
                "expected 8 distortion coefficients (k1, k2, p1, p2, k3, k4, k5, k6), got {}",
                distortion.len()
            ))
        })?;
        validation::validate_camera_matrix(&camera_matrix)?;
        Ok(Intrinsics {
            width,
            height,
            camera_matrix,
            distortion,
        })
    }

    /// Builds an intrinsic model from its wire representation.
    pub fn from_data(
        width: u32,
        height: u32,
        camera_matrix: &MatrixData,
        distortion: &MatrixData,
    ) -> Result<Self, GeometryError> {
        Self::new(width, height, camera_matrix.to_matrix3()?, &distortion.data)
    }

    pub fn camera_matrix(&self) -> &Matrix3<f64> {
        &self.camera_matrix
    }

    /// Coefficients in `(k1, k2, p1, p2, k3, k4, k5, k6)` order.
    pub fn distortion(&self) -> &[f64; 8] {
        &self.distortion
    }

    pub fn fx(&self) -> f64 {
        self.camera_matrix[(0, 0)]
    }

    pub fn fy(&self) -> f64 {
        self.camera_matrix[(1, 1)]
    }

    pub fn cx(&self) -> f64 {
        self.camera_matrix[(0, 2)]
    }

    pub fn cy(&self) -> f64 {
        self.camera_matrix[(1, 2)]
    }
}

/// Per-image camera pose: a `[R | t]` world-to-camera transform.
///
/// The rotation block is expected to be orthonormal with determinant +1;
/// malformed rotations are not detected and yield wrong geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Extrinsics {
    matrix: Matrix3x4<f64>,
}

impl Extrinsics {
    pub fn new(matrix: Matrix3x4<f64>) -> Self {
        Extrinsics { matrix }
    }

    /// Builds a pose from its wire representation (3x4 row-major).
    pub fn from_data(data: &MatrixData) -> Result<Self, GeometryError> {
        Ok(Extrinsics {
            matrix: data.to_matrix3x4()?,
        })
    }

    pub fn matrix(&self) -> &Matrix3x4<f64> {
        &self.matrix
    }

    /// The rotation block `R` (columns 0..3).
    pub fn rotation(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// The translation column `t`.
    pub fn translation(&self) -> Vector3<f64> {
        self.matrix.column(3).into_owned()
    }
}

/// Common validation functions for camera parameters
pub mod validation {
    use super::*;

    pub fn validate_camera_matrix(camera_matrix: &Matrix3<f64>) -> Result<(), GeometryError> {
        let (fx, fy) = (camera_matrix[(0, 0)], camera_matrix[(1, 1)]);
        if fx <= 0.0 || fy <= 0.0 {
            return Err(GeometryError::MalformedIntrinsics(format!(
                "focal lengths must be positive, got fx={fx}, fy={fy}"
            )));
        }
        let (cx, cy) = (camera_matrix[(0, 2)], camera_matrix[(1, 2)]);
        if !cx.is_finite() || !cy.is_finite() {
            return Err(GeometryError::MalformedIntrinsics(format!(
                "principal point must be finite, got cx={cx}, cy={cy}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera_matrix() -> Matrix3<f64> {
        Matrix3::new(1000.0, 0.0, 500.0, 0.0, 1000.0, 500.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn test_intrinsics_accessors() {
        let intr = Intrinsics::new(1000, 1000, camera_matrix(), &[0.0; 8]).unwrap();
        assert_eq!(intr.fx(), 1000.0);
        assert_eq!(intr.fy(), 1000.0);
        assert_eq!(intr.cx(), 500.0);
        assert_eq!(intr.cy(), 500.0);
    }

    #[test]
    fn test_intrinsics_rejects_short_coefficient_list() {
        let err = Intrinsics::new(1000, 1000, camera_matrix(), &[0.0; 5]).unwrap_err();
        assert!(matches!(err, GeometryError::MalformedIntrinsics(_)));
    }

    #[test]
    fn test_intrinsics_rejects_negative_focal_length() {
        let mut k = camera_matrix();
        k[(0, 0)] = -1.0;
        let err = Intrinsics::new(1000, 1000, k, &[0.0; 8]).unwrap_err();
        assert!(matches!(err, GeometryError::MalformedIntrinsics(_)));
    }

    #[test]
    fn test_matrix_data_shape_mismatch() {
        let data = MatrixData {
            rows: 2,
            cols: 2,
            data: vec![1.0, 0.0, 0.0, 1.0],
        };
        assert!(matches!(
            data.to_matrix3(),
            Err(GeometryError::MalformedIntrinsics(_))
        ));
    }

    #[test]
    fn test_matrix_data_row_major_order() {
        let data = MatrixData {
            rows: 3,
            cols: 4,
            data: (0..12).map(f64::from).collect(),
        };
        let m = data.to_matrix3x4().unwrap();
        assert_eq!(m[(0, 3)], 3.0);
        assert_eq!(m[(2, 0)], 8.0);
    }

    #[test]
    fn test_matrix_data_json_round_trip() {
        let data = MatrixData {
            rows: 3,
            cols: 3,
            data: vec![1000.0, 0.0, 500.0, 0.0, 1000.0, 500.0, 0.0, 0.0, 1.0],
        };
        let json = serde_json::to_string(&data).unwrap();
        let back: MatrixData = serde_json::from_str(&json).unwrap();
        assert_eq!(data, back);
    }

    #[test]
    fn test_extrinsics_blocks() {
        let pose = Extrinsics::new(Matrix3x4::from_row_slice(&[
            0.0, -1.0, 0.0, 1.0, //
            1.0, 0.0, 0.0, 2.0, //
            0.0, 0.0, 1.0, 3.0,
        ]));
        assert_eq!(pose.rotation()[(0, 1)], -1.0);
        assert_eq!(pose.translation(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_world_point_euclidean() {
        let p = WorldPoint {
            x: 2.0,
            y: 4.0,
            z: -6.0,
            w: 2.0,
        };
        let e = p.to_euclidean();
        assert_relative_eq!(e.x, 1.0);
        assert_relative_eq!(e.y, 2.0);
        assert_relative_eq!(e.z, -3.0);
    }
}
