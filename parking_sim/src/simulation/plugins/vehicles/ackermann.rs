// parking_sim/src/simulation/plugins/vehicles/ackermann.rs

use crate::prelude::*;
use parking_core::utils::geometry::{clamp, normalize_angle};

// --- Plugin Definition ---
pub struct AckermannCarPlugin;

impl Plugin for AckermannCarPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_ackermann_car.in_set(SceneBuildSet::ProcessVehicle),
        )
        // This is the runtime system that makes the car drive.
        .add_systems(
            FixedUpdate,
            drive_ackermann_cars.in_set(SimulationSet::Actuation),
        );
    }
}

// --- Components ---

/// Marks the vehicle that runs the parking mission.
#[derive(Component, Debug, Default)]
pub struct EgoVehicle;

#[derive(Component, Debug, Clone)]
pub struct AckermannParameters {
    pub wheelbase: f64,
    pub max_steering_angle: f64,
    pub max_acceleration: f64,
}

// --- Systems ---

/// SPAWNING: Creates the vehicle body at its start pose. Its `DriveCommand`
/// is the controller's mailbox; it starts at rest.
fn spawn_ackermann_car(mut commands: Commands, config: Res<ScenarioConfig>) {
    let vehicle = &config.vehicle;
    let start = vehicle.start;
    info!(
        "Spawning ego vehicle at ({:.2}, {:.2}), heading {:.2} rad, wheelbase {:.2} m",
        start.x, start.z, start.heading, vehicle.wheelbase
    );

    commands.spawn((
        Name::new("ego_vehicle"),
        EgoVehicle,
        GroundTruthPose {
            position: Position::new(start.x, start.z),
            heading: normalize_angle(start.heading),
            speed: 0.0,
        },
        AckermannParameters {
            wheelbase: vehicle.wheelbase,
            max_steering_angle: vehicle.max_steering_angle,
            max_acceleration: vehicle.max_acceleration,
        },
        DriveCommand::default(),
    ));
}

/// One step of the kinematic bicycle model. The speed follows the cruise
/// command within the acceleration limit; positive steering turns left, which
/// lowers the heading because headings grow toward +z (right).
pub fn step_kinematics(
    pose: &GroundTruthPose,
    params: &AckermannParameters,
    command: &DriveCommand,
    dt: f64,
) -> GroundTruthPose {
    let max_dv = params.max_acceleration * dt;
    let speed = pose.speed + clamp(command.cruising_speed - pose.speed, -max_dv, max_dv);
    let steering = clamp(
        command.steering_angle,
        -params.max_steering_angle,
        params.max_steering_angle,
    );

    let position = Position::new(
        pose.position.x + speed * pose.heading.cos() * dt,
        pose.position.y + speed * pose.heading.sin() * dt,
    );
    let heading = normalize_angle(pose.heading - speed / params.wheelbase * steering.tan() * dt);

    GroundTruthPose {
        position,
        heading,
        speed,
    }
}

/// RUNTIME: Integrates every car one fixed step from its latest command.
fn drive_ackermann_cars(
    time: Res<Time>,
    mut query: Query<(&mut GroundTruthPose, &AckermannParameters, &DriveCommand)>,
) {
    let dt = time.delta_secs_f64();
    if dt <= 0.0 {
        return;
    }
    for (mut pose, params, command) in &mut query {
        *pose = step_kinematics(&pose, params, command, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn params() -> AckermannParameters {
        AckermannParameters {
            wheelbase: 2.5,
            max_steering_angle: 0.6,
            max_acceleration: 4.0,
        }
    }

    fn at_rest() -> GroundTruthPose {
        GroundTruthPose {
            position: Position::origin(),
            heading: 0.0,
            speed: 0.0,
        }
    }

    #[test]
    fn speed_ramps_within_the_acceleration_limit() {
        let command = DriveCommand {
            steering_angle: 0.0,
            cruising_speed: 5.0,
        };
        let next = step_kinematics(&at_rest(), &params(), &command, 0.05);
        assert_abs_diff_eq!(next.speed, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(next.position.x, 0.01, epsilon = 1e-12);
        assert_eq!(next.heading, 0.0);
    }

    #[test]
    fn left_steering_turns_toward_negative_z() {
        let mut pose = GroundTruthPose {
            speed: 5.0,
            ..at_rest()
        };
        let command = DriveCommand {
            steering_angle: 0.3,
            cruising_speed: 5.0,
        };
        for _ in 0..10 {
            pose = step_kinematics(&pose, &params(), &command, 0.05);
        }
        assert!(pose.heading < 0.0);
        assert!(pose.position.y < 0.0);
    }

    #[test]
    fn steering_is_clamped_to_the_vehicle_limit() {
        let pose = GroundTruthPose {
            speed: 4.0,
            ..at_rest()
        };
        let hard = DriveCommand {
            steering_angle: 2.0,
            cruising_speed: 4.0,
        };
        let limit = DriveCommand {
            steering_angle: 0.6,
            cruising_speed: 4.0,
        };
        let a = step_kinematics(&pose, &params(), &hard, 0.05);
        let b = step_kinematics(&pose, &params(), &limit, 0.05);
        assert_abs_diff_eq!(a.heading, b.heading, epsilon = 1e-12);
    }
}
