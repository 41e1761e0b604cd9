// parking_sim/src/simulation/core/simulation_setup.rs

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::prelude::*;
use crate::simulation::core::events::SensorMeasurement;
use crate::simulation::core::prng::SimulationRng;
use parking_core::channel::{link, Endpoint};

/// Both ends of the vehicle/provider message link, waiting to be claimed by
/// the systems that spawn each node.
#[derive(Resource, Default)]
pub struct LinkEndpoints {
    pub vehicle: Option<Endpoint>,
    pub provider: Option<Endpoint>,
}

pub struct SimulationSetupPlugin;

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        // This plugin's job is to read the config and add resources and schedules.
        let config = match app.world().get_resource::<ScenarioConfig>() {
            Some(config) => config.clone(),
            None => {
                warn!("No scenario loaded, running the built-in default scenario.");
                let config = ScenarioConfig::default();
                app.insert_resource(config.clone());
                config
            }
        };

        // --- 1. Add the Deterministic PRNG Resource ---
        let rng = match config.simulation.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        app.insert_resource(SimulationRng(rng));

        // --- 2. The message link between the two nodes ---
        let (vehicle, provider) = link(
            config.simulation.channel_capacity,
            "vehicle",
            "provider",
        );
        app.insert_resource(LinkEndpoints {
            vehicle: Some(vehicle),
            provider: Some(provider),
        })
        .add_event::<SensorMeasurement>();

        // One control tick per fixed step.
        app.insert_resource(Time::<Fixed>::from_duration(Duration::from_secs_f64(
            config.simulation.timestep,
        )));

        app.init_state::<AppState>();

        // --- CONFIGURE THE SPAWNING PIPELINE ---
        app.configure_sets(
            OnEnter(AppState::SceneBuilding),
            (
                SceneBuildSet::World,
                SceneBuildSet::ProcessVehicle,
                SceneBuildSet::ProcessSensors,
                SceneBuildSet::ProcessControllers,
                SceneBuildSet::Finalize,
            )
                .chain(),
        );
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            transition_to_running.in_set(SceneBuildSet::Finalize),
        );

        // Configure the runtime schedule graph. Sensors sample the pose left
        // by the previous tick, the controller reacts, and only then the
        // vehicle moves.
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Sensors,
                SimulationSet::Messaging,
                SimulationSet::Behavior,
                SimulationSet::Actuation,
                SimulationSet::Validation,
            )
                .chain()
                .run_if(in_state(AppState::Running)),
        );
    }
}

fn transition_to_running(mut next_state: ResMut<NextState<AppState>>, config: Res<ScenarioConfig>) {
    info!(
        "Scene built: {} spots, {} walls, timestep {:.3} s. Starting the run.",
        config.world.spots.len(),
        config.world.walls.len(),
        config.simulation.timestep
    );
    next_state.set(AppState::Running);
}
