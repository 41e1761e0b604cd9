// parking_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// The pure types from parking_core that most plugins touch.
pub use parking_core::prelude::{
    DriveCommand, MissionState, Position, RangeSensorModel, RangeSensorSpec, Side, SpotStatus,
};

// Re-export common simulation-specific types for easy access in other plugins.
pub use crate::simulation::config::ScenarioConfig;
pub use crate::simulation::core::app_state::{AppState, SceneBuildSet, SimulationSet};
pub use crate::simulation::core::components::{GroundTruthPose, Obstacle};
