//! Small numeric helpers shared across the crate.

use std::f64::consts::PI;

/// Decimal places kept by the angle conversions. Stabilizes floating-point
/// noise so converted angles compare and display consistently.
const ANGLE_PRECISION: u32 = 10;

/// Rounds `value` to `precision` decimal places.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let ratio = 10f64.powi(precision as i32);
    (value * ratio).round() / ratio
}

/// Degrees to radians, rounded to 10 decimal places.
pub fn deg_to_rad(degrees: f64) -> f64 {
    round_to(degrees * PI / 180.0, ANGLE_PRECISION)
}

/// Radians to degrees, rounded to 10 decimal places.
pub fn rad_to_deg(radians: f64) -> f64 {
    round_to(radians * 180.0 / PI, ANGLE_PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456789, 3), 1.235);
        assert_eq!(round_to(-1.23449999, 4), -1.2345);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn test_known_conversions() {
        assert_abs_diff_eq!(deg_to_rad(180.0), round_to(PI, 10));
        assert_abs_diff_eq!(rad_to_deg(PI), 180.0);
        assert_abs_diff_eq!(deg_to_rad(0.0), 0.0);
        assert_abs_diff_eq!(rad_to_deg(0.0), 0.0);
    }

    // The intermediate rounding already perturbs the 10th decimal, so the
    // round trip is checked against 1e-8 rather than exact equality.
    #[test]
    fn test_round_trip_representative_values() {
        for x in [0.0, 45.0, -90.0, 179.9999999999] {
            let back = rad_to_deg(deg_to_rad(x));
            assert_abs_diff_eq!(back, x, epsilon = 1e-8);
        }
    }
}
