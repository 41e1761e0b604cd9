// parking_sim/src/simulation/core/events.rs

use bevy::prelude::{Entity, Event};
use parking_core::types::Position;

/// Payload of one simulated sensor reading.
#[derive(Debug, Clone)]
pub enum MeasurementData {
    Position(Position),
    Ranges(Vec<f32>),
}

/// A reading produced during the `Sensors` set for the agent that carries
/// the sensor.
#[derive(Event, Debug, Clone)]
pub struct SensorMeasurement {
    pub agent: Entity,
    pub data: MeasurementData,
}
