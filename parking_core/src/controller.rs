// parking_core/src/controller.rs

use crate::channel::Endpoint;
use crate::config::MissionConfig;
use crate::control::Actuator;
use crate::error::ConfigError;
use crate::mission::{MissionController, SensorFrame};
use crate::models::lidar::RangeSensorSpec;
use tracing::{info, warn};

/// The vehicle node: a mission wired to its end of the message link.
#[derive(Debug)]
pub struct VehicleController {
    endpoint: Endpoint,
    mission: MissionController,
}

impl VehicleController {
    pub fn new(
        endpoint: Endpoint,
        config: MissionConfig,
        lidar: Option<&RangeSensorSpec>,
    ) -> Result<Self, ConfigError> {
        let mission = MissionController::new(config)?;

        info!("parking spot finder starting ({:?})", mission.config().mode);
        match lidar {
            Some(spec) => info!(
                "lidar: {} beams, fov {:.1} deg",
                spec.horizontal_resolution,
                spec.fov.to_degrees()
            ),
            None => warn!("no lidar attached, every scan will read empty"),
        }
        let classifier = &mission.config().classifier;
        info!(
            "detection threshold {} hits per frame, band {:.1}..{:.1} m, {} frames per scan",
            classifier.obstacle_threshold,
            classifier.range_min,
            classifier.range_max,
            classifier.scan_frames
        );
        info!("waiting for spot map");

        Ok(Self { endpoint, mission })
    }

    /// Drains the link, runs one mission tick and sends what it produced.
    pub fn step(&mut self, frame: &SensorFrame<'_>, actuator: &mut dyn Actuator) {
        let inbox = self.endpoint.drain();
        for message in self.mission.tick(&inbox, frame, actuator) {
            if let Err(e) = self.endpoint.send(&message) {
                warn!(kind = message.kind(), "failed to send: {}", e);
            }
        }
    }

    pub fn mission(&self) -> &MissionController {
        &self.mission
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::link;
    use crate::control::DriveCommand;
    use crate::messages::SpotRecord;
    use crate::mission::MissionState;
    use crate::provider::{MapProvider, MapProviderNode, SurveyedSpot};
    use crate::types::{Position, Side};

    #[test]
    fn vehicle_and_provider_agree_over_the_link() {
        let (vehicle_end, provider_end) = link(16, "vehicle", "provider");
        let spots = vec![SurveyedSpot {
            record: SpotRecord {
                id: "P1".to_string(),
                side: Side::Left,
                x: 4.0,
                z: -3.0,
            },
            occupied: false,
        }];
        let mut provider = MapProviderNode::new(provider_end, MapProvider::new(spots, 0.5));
        let spec = RangeSensorSpec {
            horizontal_resolution: 360,
            fov: std::f64::consts::TAU,
        };
        let mut vehicle =
            VehicleController::new(vehicle_end, MissionConfig::default(), Some(&spec)).unwrap();
        let mut command = DriveCommand::default();
        let ranges = vec![f32::INFINITY; 360];

        for tick in 0..80 {
            let now = tick as f64 * 0.05;
            provider.step(now);
            // The vehicle teleports straight to wherever it is asked to go.
            let position = match vehicle.mission().state() {
                MissionState::Approaching => Position::new(4.0, -3.0),
                _ => Position::new(4.0, 0.0),
            };
            let frame = SensorFrame {
                position: Some(position),
                ranges: Some(&ranges),
            };
            vehicle.step(&frame, &mut command);
        }
        provider.step(4.0);

        assert!(vehicle.mission().is_finished());
        let report = provider.provider().report();
        assert_eq!(provider.provider().acknowledged(), Some(1));
        assert_eq!(provider.provider().map_sends(), 1);
        assert_eq!(report.correct, 1);
        assert_eq!(report.free_spot.as_deref(), Some("P1"));
        assert!(provider.provider().is_complete());
    }

    #[test]
    fn controller_without_lidar_still_starts() {
        let (vehicle_end, _provider_end) = link(4, "vehicle", "provider");
        let vehicle = VehicleController::new(vehicle_end, MissionConfig::default(), None).unwrap();
        assert_eq!(vehicle.mission().state(), MissionState::Waiting);
        assert_eq!(vehicle.endpoint().label(), "vehicle");
    }
}
