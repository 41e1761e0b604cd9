// parking_sim/src/simulation/plugins/sensors/gps.rs

use bevy::prelude::*;
use rand_distr::{Distribution, Normal};

// --- Simulation Crate Imports ---
use crate::prelude::*;
use crate::simulation::core::events::{MeasurementData, SensorMeasurement};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::plugins::vehicles::ackermann::EgoVehicle;

// =========================================================================
// == GPS Components & Plugin ==
// =========================================================================

/// A Bevy component attached to a GPS sensor entity, containing its runtime state.
#[derive(Component)]
pub struct Gps {
    // `None` for a noiseless receiver.
    noise_dist: Option<Normal<f64>>,
}

pub struct GpsPlugin;

impl Plugin for GpsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_gps_sensors.in_set(SceneBuildSet::ProcessSensors),
        )
        .add_systems(
            FixedUpdate,
            gps_sensor_system.in_set(SimulationSet::Sensors),
        );
    }
}

// =========================================================================
// == Spawning System ==
// =========================================================================

/// Spawns a GPS receiver as a child of the ego vehicle, unless disabled.
fn spawn_gps_sensors(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    agents: Query<(Entity, &Name), With<EgoVehicle>>,
) {
    let gps_config = &config.sensors.gps;
    for (agent_entity, agent_name) in &agents {
        if !gps_config.enabled {
            warn!(
                "GPS disabled on '{}': the controller will never get a position fix.",
                agent_name.as_str()
            );
            continue;
        }

        let noise_dist = if gps_config.noise_stddev > 0.0 {
            match Normal::new(0.0, gps_config.noise_stddev) {
                Ok(dist) => Some(dist),
                Err(e) => {
                    warn!("Invalid GPS noise ({}), using a noiseless receiver.", e);
                    None
                }
            }
        } else {
            None
        };

        info!(
            "  -> Spawning GPS as child of agent '{}' (noise stddev {:.3} m)",
            agent_name.as_str(),
            gps_config.noise_stddev
        );
        let sensor_entity = commands
            .spawn((Name::new("gps"), Gps { noise_dist }))
            .id();
        commands.entity(agent_entity).add_child(sensor_entity);
    }
}

// =========================================================================
// == Runtime System ==
// =========================================================================

/// Samples the true position of every agent that carries a GPS and
/// publishes it as a measurement.
fn gps_sensor_system(
    mut measurement_writer: EventWriter<SensorMeasurement>,
    mut rng: ResMut<SimulationRng>,
    parent_query: Query<(Entity, &GroundTruthPose, &Children)>,
    sensor_query: Query<&Gps>,
) {
    for (agent_entity, pose, children) in &parent_query {
        for &child_entity in children {
            let Ok(gps) = sensor_query.get(child_entity) else {
                continue;
            };

            let mut position = pose.position;
            if let Some(dist) = &gps.noise_dist {
                position.x += dist.sample(&mut rng.0);
                position.y += dist.sample(&mut rng.0);
            }

            measurement_writer.write(SensorMeasurement {
                agent: agent_entity,
                data: MeasurementData::Position(position),
            });
        }
    }
}
