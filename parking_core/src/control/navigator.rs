// parking_core/src/control/navigator.rs

use crate::config::NavigatorConfig;
use crate::control::Actuator;
use crate::types::Position;
use crate::utils::geometry::{bearing, clamp, normalize_angle, planar_distance};

/// Straight-line waypoint pursuit with a proportional heading controller.
///
/// Headings grow from +x toward +z (lateral right) while the steering actuator
/// turns left for positive angles, so the heading error enters the steering
/// command with a negative sign.
#[derive(Debug, Clone)]
pub struct WaypointNavigator {
    steering_gain: f64,
    max_steering_angle: f64,
}

impl WaypointNavigator {
    pub fn new(config: &NavigatorConfig) -> Self {
        Self {
            steering_gain: config.steering_gain,
            max_steering_angle: config.max_steering_angle,
        }
    }

    /// Steering command for a wrapped heading error.
    pub fn steering_for(&self, heading_error: f64) -> f64 {
        clamp(
            -self.steering_gain * heading_error,
            -self.max_steering_angle,
            self.max_steering_angle,
        )
    }

    /// Drives toward `target`. Returns `true` without touching the actuator
    /// once the vehicle is within `tolerance` of it.
    pub fn advance(
        &self,
        actuator: &mut dyn Actuator,
        position: &Position,
        heading: f64,
        target: &Position,
        cruise_speed: f64,
        tolerance: f64,
    ) -> bool {
        if planar_distance(position, target) <= tolerance {
            return true;
        }

        let error = normalize_angle(bearing(position, target) - heading);
        actuator.set_steering_angle(self.steering_for(error));
        actuator.set_cruising_speed(cruise_speed);
        false
    }
}
