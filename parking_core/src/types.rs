// parking_core/src/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

// --- Core Type Aliases ---
pub type Position = nalgebra::Point2<f64>;

/// Which flank of the lane a parking spot sits on. Selects the lidar sector
/// that is examined while scanning the spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "L", alias = "LEFT")]
    Left,
    #[serde(rename = "R", alias = "RIGHT")]
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "L"),
            Side::Right => write!(f, "R"),
        }
    }
}

/// Occupancy of a spot as known to the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpotStatus {
    #[default]
    Unknown,
    Occupied,
    Free,
}

impl fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SpotStatus::Unknown => "UNKNOWN",
            SpotStatus::Occupied => "OCCUPIED",
            SpotStatus::Free => "FREE",
        };
        f.write_str(label)
    }
}
