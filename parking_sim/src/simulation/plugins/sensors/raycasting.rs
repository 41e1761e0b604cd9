// parking_sim/src/simulation/plugins/sensors/raycasting.rs

use bevy::prelude::*;
use nalgebra::Vector2;
use rand_distr::{Distribution, Normal};

// --- Simulation Crate Imports ---
use crate::prelude::*;
use crate::simulation::core::events::{MeasurementData, SensorMeasurement};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::plugins::vehicles::ackermann::EgoVehicle;

// --- Core Library Imports ---
use parking_core::models::lidar::{PlanarLidarModel, RayHit, SensorRay};

// =========================================================================
// == Components & Plugin ==
// =========================================================================

/// A generic component for any sensor that works by raycasting.
#[derive(Component)]
pub struct RaycastingSensor {
    /// It holds a boxed trait object of the specific `parking_core` model.
    pub model: Box<dyn RangeSensorModel>,
    /// The scan pattern, generated once at spawn.
    rays: Vec<SensorRay>,
    range_noise: Option<Normal<f32>>,
}

impl RaycastingSensor {
    pub fn new(model: Box<dyn RangeSensorModel>, range_noise: Option<Normal<f32>>) -> Self {
        let rays = model.generate_rays();
        Self {
            model,
            rays,
            range_noise,
        }
    }
}

pub struct RaycastingSensorPlugin;

impl Plugin for RaycastingSensorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_raycasting_sensors.in_set(SceneBuildSet::ProcessSensors),
        )
        .add_systems(
            FixedUpdate,
            raycasting_sensor_system.in_set(SimulationSet::Sensors),
        );
    }
}

// =========================================================================
// == Spawning System ==
// =========================================================================

fn spawn_raycasting_sensors(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    agents: Query<(Entity, &Name), With<EgoVehicle>>,
) {
    let lidar_config = &config.sensors.lidar;
    for (agent_entity, agent_name) in &agents {
        if !lidar_config.enabled {
            warn!(
                "LiDAR disabled on '{}': every scan will read empty.",
                agent_name.as_str()
            );
            continue;
        }

        info!(
            "  -> Spawning LiDAR as RaycastingSensor for agent '{}': {} beams, {:.1} deg, {:.1} m",
            agent_name.as_str(),
            lidar_config.horizontal_resolution,
            lidar_config.fov_deg,
            lidar_config.max_range
        );

        // --- 1. Create the `parking_core` Model ---
        let core_model: Box<dyn RangeSensorModel> = Box::new(PlanarLidarModel::new(
            lidar_config.horizontal_resolution,
            lidar_config.fov_deg.to_radians(),
            lidar_config.max_range,
        ));

        let range_noise = if lidar_config.range_noise_stddev > 0.0 {
            Normal::new(0.0, lidar_config.range_noise_stddev).ok()
        } else {
            None
        };

        // --- 2. Spawn the Sensor Entity ---
        let sensor_entity = commands
            .spawn((
                Name::new("lidar"),
                RaycastingSensor::new(core_model, range_noise),
            ))
            .id();
        commands.entity(agent_entity).add_child(sensor_entity);
    }
}

// =========================================================================
// == Runtime System ==
// =========================================================================

/// Casts every beam against the obstacles in the world and publishes the
/// resulting range frame.
fn raycasting_sensor_system(
    mut measurement_writer: EventWriter<SensorMeasurement>,
    mut rng: ResMut<SimulationRng>,
    parent_query: Query<(Entity, &GroundTruthPose, &Children)>,
    sensor_query: Query<&RaycastingSensor>,
    obstacles: Query<&Obstacle>,
) {
    for (agent_entity, pose, children) in &parent_query {
        for &child_entity in children {
            let Ok(sensor) = sensor_query.get(child_entity) else {
                continue;
            };

            let max_range = sensor.model.get_max_range();
            let (sin_h, cos_h) = pose.heading.sin_cos();
            let mut hits: Vec<RayHit> = Vec::with_capacity(sensor.rays.len());

            for ray in &sensor.rays {
                // Rotate the body-frame beam by the vehicle heading.
                let d = ray.direction;
                let world_direction = Vector2::new(d.x * cos_h - d.y * sin_h, d.x * sin_h + d.y * cos_h);

                let nearest = obstacles
                    .iter()
                    .filter_map(|o| o.ray_distance(&pose.position, &world_direction))
                    .fold(f64::INFINITY, f64::min);
                if nearest > max_range as f64 {
                    continue;
                }

                let mut distance = nearest as f32;
                if let Some(noise) = &sensor.range_noise {
                    distance = (distance + noise.sample(&mut rng.0)).max(0.0);
                }
                hits.push(RayHit {
                    ray_id: ray.id,
                    distance,
                });
            }

            // Pass the raw hits back to the model to build the ordered frame.
            let frame = sensor.model.process_hits(&hits);
            measurement_writer.write(SensorMeasurement {
                agent: agent_entity,
                data: MeasurementData::Ranges(frame),
            });
        }
    }
}
