// parking_core/src/mission/summary.rs

use crate::spots::ParkingSpot;
use crate::types::{Position, SpotStatus};
use std::fmt;

/// End-of-mission report, built once when the mission reaches `Final`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MissionSummary {
    pub total: usize,
    pub free: Vec<String>,
    pub occupied: Vec<String>,
    pub first_free: Option<String>,
    pub final_position: Option<Position>,
}

impl MissionSummary {
    pub(crate) fn collect(
        spots: &[ParkingSpot],
        first_free: Option<&ParkingSpot>,
        final_position: Option<Position>,
    ) -> Self {
        let ids_with = |status: SpotStatus| {
            spots
                .iter()
                .filter(|s| s.status() == status)
                .map(|s| s.id().to_string())
                .collect::<Vec<_>>()
        };
        Self {
            total: spots.len(),
            free: ids_with(SpotStatus::Free),
            occupied: ids_with(SpotStatus::Occupied),
            first_free: first_free.map(|s| s.id().to_string()),
            final_position,
        }
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }
}

impl fmt::Display for MissionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} spots, {} free [{}], {} occupied [{}]",
            self.total,
            self.free_count(),
            self.free.join(", "),
            self.occupied_count(),
            self.occupied.join(", ")
        )
    }
}
