// parking_sim/src/simulation/core/app_state.rs

use bevy::{ecs::schedule::SystemSet, prelude::States};

/// Defines the major phases of the application's lifecycle.
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    /// The app starts here and spawns the scene from the scenario config.
    #[default]
    SceneBuilding,

    /// The scene is built. The fixed-step loop is running.
    Running,
}

/// System sets to control the order of execution during the SceneBuilding state.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneBuildSet {
    /// Pass 1: Static obstacles (parked cars, walls).
    World,

    /// Pass 2: The vehicle body and its kinematic model.
    ProcessVehicle,

    /// Pass 3: Sensors attached to the vehicle.
    ProcessSensors,

    /// Pass 4: The autonomy stack, which needs to know which sensors exist.
    ProcessControllers,

    /// Pass 5: Switch to `Running`.
    Finalize,
}

// =========================================================================
// == Main Simulation Sets (one control tick) ==
// =========================================================================

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Simulate GPS and lidar from the ground-truth pose.
    Sensors,
    /// The map provider processes its inbox and resends the map if due.
    Messaging,
    /// The vehicle controller runs one mission tick.
    Behavior,
    /// Drive commands move the vehicle.
    Actuation,
    /// Run termination and reporting.
    Validation,
}
