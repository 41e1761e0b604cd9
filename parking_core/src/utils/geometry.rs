// parking_core/src/utils/geometry.rs

use nalgebra::Point2;
use num_traits::{Float, FloatConst};

/// Wraps an angle into the half-open interval (-PI, PI].
///
/// Non-finite input is returned unchanged so a corrupted heading can never
/// hang the control loop.
pub fn normalize_angle<T: Float + FloatConst>(angle: T) -> T {
    if !angle.is_finite() {
        return angle;
    }
    let pi = T::PI();
    let two_pi = pi + pi;
    let mut wrapped = angle % two_pi;
    if wrapped > pi {
        wrapped = wrapped - two_pi;
    } else if wrapped <= -pi {
        wrapped = wrapped + two_pi;
    }
    wrapped
}

/// Limits `value` to `[minimum, maximum]`.
pub fn clamp<T: PartialOrd>(value: T, minimum: T, maximum: T) -> T {
    if value < minimum {
        minimum
    } else if value > maximum {
        maximum
    } else {
        value
    }
}

/// Euclidean distance between two points on the ground plane.
pub fn planar_distance(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    nalgebra::distance(a, b)
}

/// Bearing from `from` to `to`, measured from +x towards +z.
pub fn bearing(from: &Point2<f64>, to: &Point2<f64>) -> f64 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn normalize_keeps_angles_in_range() {
        assert_abs_diff_eq!(normalize_angle(0.5_f64), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(3.0 * PI - 0.25), PI - 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(normalize_angle(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(normalize_angle(7.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn normalize_maps_minus_pi_to_pi() {
        assert_abs_diff_eq!(normalize_angle(-PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(PI), PI, epsilon = 1e-12);
    }

    #[test]
    fn normalize_works_for_f32() {
        let wrapped = normalize_angle(5.0_f32 * std::f32::consts::PI - 0.5);
        assert_abs_diff_eq!(wrapped, std::f32::consts::PI - 0.5, epsilon = 1e-4);
    }

    #[test]
    fn normalize_passes_non_finite_through() {
        assert!(normalize_angle(f64::NAN).is_nan());
        assert!(normalize_angle(f64::INFINITY).is_infinite());
    }

    #[test]
    fn clamp_limits_both_ends() {
        assert_eq!(clamp(5.0, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.25, -1.0, 1.0), 0.25);
        assert_eq!(clamp(7, 0, 3), 3);
    }

    #[test]
    fn distance_and_bearing() {
        let a = Point2::new(1.0, 1.0);
        let b = Point2::new(4.0, 5.0);
        assert_abs_diff_eq!(planar_distance(&a, &b), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            bearing(&Point2::origin(), &Point2::new(0.0, 2.0)),
            PI / 2.0,
            epsilon = 1e-12
        );
    }
}
