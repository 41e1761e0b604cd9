// parking_sim/src/simulation/core/components.rs

use bevy::prelude::Component;
use parking_core::types::Position;

/// The true planar state of a simulated vehicle. Sensors sample it, the
/// kinematic model integrates it, nothing in the autonomy stack reads it.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct GroundTruthPose {
    pub position: Position,
    /// Radians from +x toward +z.
    pub heading: f64,
    /// Forward speed (m/s).
    pub speed: f64,
}

/// An axis-aligned box obstacle on the ground plane.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub center: Position,
    /// Half extents along x and z.
    pub half_extents: nalgebra::Vector2<f64>,
}

impl Obstacle {
    pub fn new(center: Position, length: f64, width: f64) -> Self {
        Self {
            center,
            half_extents: nalgebra::Vector2::new(length / 2.0, width / 2.0),
        }
    }

    /// Distance along the unit `direction` from `origin` to the first
    /// boundary crossing, using the slab method. A ray starting inside the
    /// box reports the exit distance.
    pub fn ray_distance(&self, origin: &Position, direction: &nalgebra::Vector2<f64>) -> Option<f64> {
        let min = self.center - self.half_extents;
        let max = self.center + self.half_extents;
        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;

        for axis in 0..2 {
            let (o, d) = (origin[axis], direction[axis]);
            if d.abs() < 1e-12 {
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (min[axis] - o) / d;
            let t2 = (max[axis] - o) / d;
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
        }

        if t_far < t_near || t_far < 0.0 {
            return None;
        }
        Some(if t_near >= 0.0 { t_near } else { t_far })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector2;

    fn parked_car() -> Obstacle {
        Obstacle::new(Position::new(12.0, 3.0), 4.4, 1.8)
    }

    #[test]
    fn ray_to_the_side_hits_the_near_face() {
        let d = parked_car()
            .ray_distance(&Position::new(12.0, 0.0), &Vector2::new(0.0, 1.0))
            .unwrap();
        assert_abs_diff_eq!(d, 2.1, epsilon = 1e-12);
    }

    #[test]
    fn rays_away_or_past_the_box_miss() {
        let car = parked_car();
        assert!(car
            .ray_distance(&Position::new(12.0, 0.0), &Vector2::new(0.0, -1.0))
            .is_none());
        assert!(car
            .ray_distance(&Position::new(0.0, 0.0), &Vector2::new(1.0, 0.0))
            .is_none());
    }

    #[test]
    fn diagonal_ray_hits_the_corner_region() {
        let dir = Vector2::new(1.0, 1.0).normalize();
        let d = parked_car()
            .ray_distance(&Position::new(8.0, 0.0), &dir)
            .unwrap();
        // Enters through the near face z = 2.1 at x = 10.1.
        assert_abs_diff_eq!(d, 2.1 * 2.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn origin_inside_reports_exit() {
        let d = parked_car()
            .ray_distance(&Position::new(12.0, 3.0), &Vector2::new(1.0, 0.0))
            .unwrap();
        assert_abs_diff_eq!(d, 2.2, epsilon = 1e-12);
    }
}
