// parking_core/src/spots.rs

use crate::error::SpotMapError;
use crate::messages::SpotRecord;
use crate::types::{Position, Side, SpotStatus};
use std::collections::HashSet;

/// A parking spot as tracked by the mission. The scan position, the point in
/// the lane abeam the spot, is derived from the spot position on creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingSpot {
    id: String,
    side: Side,
    position: Position,
    scan_position: Position,
    status: SpotStatus,
}

impl ParkingSpot {
    pub fn new(id: impl Into<String>, side: Side, position: Position) -> Self {
        Self {
            id: id.into(),
            side,
            scan_position: Position::new(position.x, 0.0),
            position,
            status: SpotStatus::Unknown,
        }
    }

    pub fn from_record(record: &SpotRecord) -> Self {
        Self::new(record.id.clone(), record.side, Position::new(record.x, record.z))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn scan_position(&self) -> &Position {
        &self.scan_position
    }

    pub fn status(&self) -> SpotStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: SpotStatus) {
        self.status = status;
    }
}

/// Builds the ordered spot list from a map message.
pub fn spots_from_records(records: &[SpotRecord]) -> Result<Vec<ParkingSpot>, SpotMapError> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .map(|record| {
            if !record.x.is_finite() || !record.z.is_finite() {
                return Err(SpotMapError::NonFiniteCoordinate(record.id.clone()));
            }
            if !seen.insert(record.id.as_str()) {
                return Err(SpotMapError::DuplicateId(record.id.clone()));
            }
            Ok(ParkingSpot::from_record(record))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, side: Side, x: f64, z: f64) -> SpotRecord {
        SpotRecord {
            id: id.to_string(),
            side,
            x,
            z,
        }
    }

    #[test]
    fn scan_position_is_abeam_in_the_lane() {
        let spots = spots_from_records(&[
            record("P1R", Side::Right, 12.0, 3.0),
            record("P2L", Side::Left, 19.0, -3.0),
        ])
        .unwrap();
        assert_eq!(spots.len(), 2);
        assert_eq!(spots[0].id(), "P1R");
        assert_eq!(*spots[0].scan_position(), Position::new(12.0, 0.0));
        assert_eq!(*spots[1].position(), Position::new(19.0, -3.0));
        assert_eq!(spots[1].status(), SpotStatus::Unknown);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = spots_from_records(&[
            record("A", Side::Right, 1.0, 3.0),
            record("A", Side::Left, 2.0, -3.0),
        ])
        .unwrap_err();
        assert_eq!(err, SpotMapError::DuplicateId("A".to_string()));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let err = spots_from_records(&[record("B", Side::Right, f64::NAN, 3.0)]).unwrap_err();
        assert_eq!(err, SpotMapError::NonFiniteCoordinate("B".to_string()));
    }
}
