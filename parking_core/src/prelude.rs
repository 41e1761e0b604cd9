// parking_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::control::{Actuator, DriveCommand};
pub use crate::models::lidar::{RangeSensorModel, RangeSensorSpec, RayHit, SensorRay};

// --- Data Model ---
pub use crate::messages::{Message, SpotRecord};
pub use crate::spots::ParkingSpot;
pub use crate::types::{Position, Side, SpotStatus};

// --- Configuration & Errors ---
pub use crate::config::{MissionConfig, MissionMode};
pub use crate::error::{ChannelError, ConfigError, SpotMapError};

// --- Nodes ---
pub use crate::channel::{link, Endpoint};
pub use crate::controller::VehicleController;
pub use crate::mission::{MissionController, MissionState, MissionSummary, SensorFrame};
pub use crate::provider::{AccuracyReport, MapProvider, MapProviderNode, SurveyedSpot};

// --- Concrete Models ---
pub use crate::models::lidar::PlanarLidarModel;
