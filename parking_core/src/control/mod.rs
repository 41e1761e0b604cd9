// parking_core/src/control/mod.rs

pub mod navigator;

/// Write-only steering and speed interface of the vehicle. Within one tick
/// the last write wins.
pub trait Actuator {
    /// Steering angle in radians, positive turns left.
    fn set_steering_angle(&mut self, angle: f64);

    /// Target cruise speed in m/s.
    fn set_cruising_speed(&mut self, speed: f64);

    fn stop(&mut self) {
        self.set_steering_angle(0.0);
        self.set_cruising_speed(0.0);
    }
}

/// The command pair the controller leaves for the vehicle each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "bevy", derive(bevy_ecs::component::Component))]
pub struct DriveCommand {
    pub steering_angle: f64,
    pub cruising_speed: f64,
}

impl Actuator for DriveCommand {
    fn set_steering_angle(&mut self, angle: f64) {
        self.steering_angle = angle;
    }

    fn set_cruising_speed(&mut self, speed: f64) {
        self.cruising_speed = speed;
    }
}
