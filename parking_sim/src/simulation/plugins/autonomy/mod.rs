// parking_sim/src/simulation/plugins/autonomy/mod.rs

//! Runs the vehicle-side mission inside the simulation. The controller sees
//! only the sensor events of its own agent and talks to the map provider
//! through its end of the message link.

use crate::prelude::*;
use crate::simulation::core::events::{MeasurementData, SensorMeasurement};
use crate::simulation::core::simulation_setup::LinkEndpoints;
use crate::simulation::plugins::sensors::raycasting::RaycastingSensor;
use crate::simulation::plugins::vehicles::ackermann::EgoVehicle;

use parking_core::controller::VehicleController;
use parking_core::mission::SensorFrame;

/// The mission controller driving one agent.
#[derive(Component)]
pub struct VehicleNode(pub VehicleController);

pub struct AutonomyPlugin;

impl Plugin for AutonomyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_vehicle_controllers.in_set(SceneBuildSet::ProcessControllers),
        )
        .add_systems(
            FixedUpdate,
            vehicle_controller_system.in_set(SimulationSet::Behavior),
        );
    }
}

/// Attaches the controller to the ego vehicle once its sensors exist, so the
/// startup banner can describe the attached lidar.
fn spawn_vehicle_controllers(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    mut endpoints: ResMut<LinkEndpoints>,
    agents: Query<(Entity, &Name, Option<&Children>), With<EgoVehicle>>,
    lidars: Query<&RaycastingSensor>,
    mut exit: EventWriter<AppExit>,
) {
    for (agent_entity, agent_name, children) in &agents {
        let Some(endpoint) = endpoints.vehicle.take() else {
            error!(
                "No free link endpoint for agent '{}'; only one vehicle is supported.",
                agent_name.as_str()
            );
            continue;
        };

        let mut lidar_spec = None;
        if let Some(children) = children {
            for &child_entity in children {
                if let Ok(sensor) = lidars.get(child_entity) {
                    lidar_spec = Some(sensor.model.spec());
                }
            }
        }

        match VehicleController::new(endpoint, config.mission.clone(), lidar_spec.as_ref()) {
            Ok(controller) => {
                info!("  -> Attaching mission controller to '{}'", agent_name.as_str());
                commands
                    .entity(agent_entity)
                    .insert(VehicleNode(controller));
            }
            Err(e) => {
                error!("Cannot start the mission: {}", e);
                exit.write(AppExit::error());
            }
        }
    }
}

/// One control tick: gather this tick's readings per agent and step its
/// controller, which writes the agent's `DriveCommand`.
fn vehicle_controller_system(
    mut measurements: EventReader<SensorMeasurement>,
    mut nodes: Query<(Entity, &mut VehicleNode, &mut DriveCommand)>,
) {
    let readings: Vec<&SensorMeasurement> = measurements.read().collect();

    for (agent_entity, mut node, mut command) in &mut nodes {
        let mut position = None;
        let mut ranges = None;
        // Later readings of the same kind replace earlier ones.
        for reading in readings.iter().filter(|m| m.agent == agent_entity) {
            match &reading.data {
                MeasurementData::Position(p) => position = Some(*p),
                MeasurementData::Ranges(r) => ranges = Some(r.as_slice()),
            }
        }

        let frame = SensorFrame { position, ranges };
        node.0.step(&frame, &mut *command);
    }
}
