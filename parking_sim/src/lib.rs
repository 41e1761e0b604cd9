// parking_sim/src/lib.rs

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

// Import the plugins defined within the simulation crate.
use crate::simulation::config::ScenarioConfig;
use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::autonomy::AutonomyPlugin;
use crate::simulation::plugins::map_provider::MapProviderPlugin;
use crate::simulation::plugins::sensors::gps::GpsPlugin;
use crate::simulation::plugins::sensors::raycasting::RaycastingSensorPlugin;
use crate::simulation::plugins::validation::RunMonitorPlugin;
use crate::simulation::plugins::vehicles::ackermann::AckermannCarPlugin;
use crate::simulation::plugins::world::spawner::WorldSpawnerPlugin;

// This prelude is for convenience for other files WITHIN the parking_sim crate.
pub mod prelude;

// This module contains all the simulation-specific logic.
pub mod cli;
pub mod simulation;

/// The main plugin that brings together all the simulation parts.
/// Insert a `ScenarioConfig` resource before adding it.
pub struct ParkingSimulationPlugin;

impl Plugin for ParkingSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            // Core setup (PRNG, message link, schedules, states).
            SimulationSetupPlugin,
            // Parked cars and walls.
            WorldSpawnerPlugin,
            // The surveyed map and its side of the link.
            MapProviderPlugin,
            // Adds the Ackermann vehicle logic.
            AckermannCarPlugin,
            // Add Sensors
            GpsPlugin,
            RaycastingSensorPlugin,
            // The mission controller on the vehicle.
            AutonomyPlugin,
            // Decides when the run is over.
            RunMonitorPlugin,
        ));
    }
}

/// Builds a windowless app for `config`. By default every update advances
/// the clock by exactly one timestep, so a run is as fast as the CPU allows
/// and reproducible. With `realtime` the loop is paced by the wall clock.
/// Logging is only installed when a filter is given.
pub fn headless_app(config: ScenarioConfig, realtime: bool, log_filter: Option<&str>) -> App {
    let step = Duration::from_secs_f64(config.simulation.timestep);
    let mut app = App::new();

    let runner = if realtime {
        ScheduleRunnerPlugin::run_loop(step)
    } else {
        ScheduleRunnerPlugin::run_loop(Duration::ZERO)
    };
    app.add_plugins((MinimalPlugins.set(runner), StatesPlugin));
    if let Some(filter) = log_filter {
        app.add_plugins(LogPlugin {
            level: bevy::log::Level::INFO,
            filter: filter.to_string(),
            ..default()
        });
    }
    if !realtime {
        app.insert_resource(TimeUpdateStrategy::ManualDuration(step));
    }

    app.insert_resource(config).add_plugins(ParkingSimulationPlugin);
    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::plugins::autonomy::VehicleNode;
    use crate::simulation::plugins::map_provider::ProviderNode;
    use parking_core::prelude::{MissionState, SpotStatus};

    fn run_to_exit(app: &mut App, max_updates: usize) -> AppExit {
        for _ in 0..max_updates {
            app.update();
            if let Some(exit) = app.should_exit() {
                return exit;
            }
        }
        panic!("the app did not exit within {} updates", max_updates);
    }

    #[test]
    fn default_scenario_parks_in_the_first_free_spot() {
        let config = ScenarioConfig::default();
        let max_updates =
            (config.simulation.duration_seconds / config.simulation.timestep) as usize + 100;
        let mut app = headless_app(config, false, None);

        assert_eq!(run_to_exit(&mut app, max_updates), AppExit::Success);

        let provider = app.world().resource::<ProviderNode>().0.provider();
        assert_eq!(provider.acknowledged(), Some(4));
        let report = provider.report();
        assert_eq!(report.free_spot.as_deref(), Some("P2L"));
        assert_eq!(report.incorrect, 0);
        assert!(report.correct >= 2);

        let world = app.world_mut();
        let mut nodes = world.query::<&VehicleNode>();
        let node = nodes.iter(world).next().expect("vehicle node");
        let mission = node.0.mission();
        assert_eq!(mission.state(), MissionState::Stopped);
        assert_eq!(mission.spots()[0].status(), SpotStatus::Occupied);
        assert_eq!(mission.spots()[1].status(), SpotStatus::Free);
        assert_eq!(
            mission.first_free_spot().map(|s| s.id().to_string()),
            Some("P2L".to_string())
        );
    }

    #[test]
    fn blind_vehicle_times_out() {
        let mut config = ScenarioConfig::default();
        config.sensors.gps.enabled = false;
        config.simulation.duration_seconds = 2.0;
        let mut app = headless_app(config, false, None);

        assert_eq!(run_to_exit(&mut app, 200), AppExit::error());

        let world = app.world_mut();
        let mut nodes = world.query::<&VehicleNode>();
        let node = nodes.iter(world).next().expect("vehicle node");
        assert_eq!(node.0.mission().state(), MissionState::Navigating);
    }
}
