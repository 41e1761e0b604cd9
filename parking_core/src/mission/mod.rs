// parking_core/src/mission/mod.rs

//! The vehicle-side mission: visit spots in order, classify each from the
//! side lidar sector, stop at the first free one and pull into it.
//!
//! Every tick handles the inbound messages first and then runs exactly one
//! dispatch of the current [`MissionState`], which returns the next state.

mod summary;

pub use summary::MissionSummary;

use crate::config::{MissionConfig, MissionMode};
use crate::control::navigator::WaypointNavigator;
use crate::control::Actuator;
use crate::error::ConfigError;
use crate::messages::{Message, SpotRecord};
use crate::perception::occupancy::{OccupancyClassifier, ScanAccumulator, SectorSample};
use crate::pose::{PoseTracker, VehiclePose};
use crate::spots::{spots_from_records, ParkingSpot};
use crate::types::{Position, SpotStatus};
use std::fmt;
use tracing::{debug, info, warn};

/// Scan progress is logged every this many frames.
const SCAN_LOG_INTERVAL: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissionState {
    Waiting,
    Navigating,
    Scanning,
    Approaching,
    Final,
    Stopped,
}

impl fmt::Display for MissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MissionState::Waiting => "WAITING",
            MissionState::Navigating => "NAVIGATING",
            MissionState::Scanning => "SCANNING",
            MissionState::Approaching => "APPROACHING",
            MissionState::Final => "FINAL",
            MissionState::Stopped => "STOPPED",
        };
        f.write_str(label)
    }
}

/// Sensor readings of one tick. A missing device reads as `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorFrame<'a> {
    pub position: Option<Position>,
    pub ranges: Option<&'a [f32]>,
}

/// Owns every piece of mutable vehicle state and advances it one tick at a time.
#[derive(Debug, Clone)]
pub struct MissionController {
    config: MissionConfig,
    navigator: WaypointNavigator,
    classifier: OccupancyClassifier,
    pose: PoseTracker,
    window: ScanAccumulator,
    spots: Vec<ParkingSpot>,
    map_received: bool,
    state: MissionState,
    index: usize,
    first_free: Option<usize>,
    summary: Option<MissionSummary>,
}

impl MissionController {
    pub fn new(config: MissionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let classifier = OccupancyClassifier::new(config.classifier);
        Ok(Self {
            navigator: WaypointNavigator::new(&config.navigator),
            pose: PoseTracker::new(config.heading),
            window: classifier.accumulator(),
            classifier,
            config,
            spots: Vec::new(),
            map_received: false,
            state: MissionState::Waiting,
            index: 0,
            first_free: None,
            summary: None,
        })
    }

    /// Runs one control tick and returns the messages to send, in order.
    pub fn tick(
        &mut self,
        inbox: &[Message],
        frame: &SensorFrame<'_>,
        actuator: &mut dyn Actuator,
    ) -> Vec<Message> {
        let mut outbox = Vec::new();
        for message in inbox {
            self.handle_message(message, &mut outbox);
        }

        if let Some(position) = frame.position {
            self.pose.update(position);
        }

        let next = self.dispatch(frame, actuator, &mut outbox);
        self.transition(next);
        outbox
    }

    fn handle_message(&mut self, message: &Message, outbox: &mut Vec<Message>) {
        match message {
            Message::SpotMap { spots } => self.adopt_map(spots, outbox),
            other => debug!(kind = other.kind(), "ignoring message meant for the provider"),
        }
    }

    fn adopt_map(&mut self, records: &[SpotRecord], outbox: &mut Vec<Message>) {
        if self.map_received {
            debug!(count = records.len(), "spot map already adopted, ignoring resend");
            return;
        }

        let spots = match spots_from_records(records) {
            Ok(spots) => spots,
            Err(e) => {
                warn!("rejecting spot map: {}", e);
                return;
            }
        };

        info!("spot map received: {} spots", spots.len());
        for (n, spot) in spots.iter().enumerate() {
            info!(
                "  {}. {:<20} [{}] at ({:6.2}, {:6.2}), scan from ({:6.2}, {:6.2})",
                n + 1,
                spot.id(),
                spot.side(),
                spot.position().x,
                spot.position().y,
                spot.scan_position().x,
                spot.scan_position().y,
            );
        }

        outbox.push(Message::AckSpotMap { count: spots.len() });
        self.spots = spots;
        self.map_received = true;
        self.index = 0;

        let next = if self.spots.is_empty() {
            MissionState::Final
        } else {
            MissionState::Navigating
        };
        self.transition(next);
    }

    fn dispatch(
        &mut self,
        frame: &SensorFrame<'_>,
        actuator: &mut dyn Actuator,
        outbox: &mut Vec<Message>,
    ) -> MissionState {
        match self.state {
            MissionState::Waiting => {
                actuator.stop();
                MissionState::Waiting
            }
            MissionState::Navigating => match self.config.mode {
                MissionMode::ScanAndPark => self.navigate(actuator),
                MissionMode::DriveToLimit => self.drive_to_limit(frame, actuator),
            },
            MissionState::Scanning => self.scan(frame, actuator, outbox),
            MissionState::Approaching => self.approach(actuator),
            MissionState::Final => {
                self.finish(actuator, outbox);
                MissionState::Stopped
            }
            MissionState::Stopped => {
                actuator.stop();
                MissionState::Stopped
            }
        }
    }

    fn transition(&mut self, next: MissionState) {
        if next == self.state {
            return;
        }
        info!(from = %self.state, to = %next, "mission state change");
        if next == MissionState::Navigating && self.config.mode == MissionMode::ScanAndPark {
            if let Some(spot) = self.spots.get(self.index) {
                info!(
                    "navigating to spot {}/{}: {}",
                    self.index + 1,
                    self.spots.len(),
                    spot.id()
                );
            }
        }
        self.state = next;
    }

    fn navigate(&mut self, actuator: &mut dyn Actuator) -> MissionState {
        let Some(spot) = self.spots.get(self.index) else {
            return MissionState::Final;
        };
        let Some(pose) = self.pose.pose() else {
            actuator.stop();
            return MissionState::Navigating;
        };

        let arrived = self.navigator.advance(
            actuator,
            &pose.position,
            pose.heading,
            spot.scan_position(),
            self.config.approach_speed,
            self.config.scan_tolerance,
        );
        if !arrived {
            return MissionState::Navigating;
        }

        info!(spot = spot.id(), side = %spot.side(), "reached scan position, scanning");
        actuator.set_cruising_speed(self.config.scan_speed);
        self.window.reset();
        MissionState::Scanning
    }

    fn scan(
        &mut self,
        frame: &SensorFrame<'_>,
        actuator: &mut dyn Actuator,
        outbox: &mut Vec<Message>,
    ) -> MissionState {
        actuator.set_steering_angle(0.0);
        actuator.set_cruising_speed(self.config.scan_speed);

        let Some(side) = self.spots.get(self.index).map(ParkingSpot::side) else {
            return MissionState::Final;
        };
        let sample = frame.ranges.map_or(
            SectorSample {
                count: 0,
                min_range: None,
            },
            |ranges| self.classifier.observe(ranges, side),
        );
        self.window.push(sample);

        let frames = self.window.len();
        if frames % SCAN_LOG_INTERVAL == 0 {
            debug!(
                "scan frame {}/{}: {} hits (mean {:.1})",
                frames,
                self.window.capacity(),
                sample.count,
                self.window.mean()
            );
        }
        if !self.window.is_full() {
            return MissionState::Scanning;
        }

        let result = self.classifier.finalize(&self.window);
        let spot = &mut self.spots[self.index];
        spot.set_status(result.status);
        info!(
            spot = spot.id(),
            status = %result.status,
            mean = result.mean_score,
            max = result.max_count,
            threshold = self.classifier.config().obstacle_threshold,
            "scan result"
        );
        outbox.push(Message::ScanResult {
            spot_id: spot.id().to_string(),
            status: result.status,
            score: result.mean_score,
            min_dist: result.min_distance,
        });

        if result.status == SpotStatus::Free {
            if self.first_free.is_none() {
                self.first_free = Some(self.index);
            }
            info!(spot = spot.id(), "free spot found, skipping remaining scans");
            return MissionState::Approaching;
        }

        self.index += 1;
        if self.index >= self.spots.len() {
            MissionState::Final
        } else {
            MissionState::Navigating
        }
    }

    fn approach(&mut self, actuator: &mut dyn Actuator) -> MissionState {
        let Some(spot) = self.first_free_spot() else {
            return MissionState::Final;
        };
        let Some(pose) = self.pose.pose() else {
            actuator.stop();
            return MissionState::Approaching;
        };

        let arrived = self.navigator.advance(
            actuator,
            &pose.position,
            pose.heading,
            spot.position(),
            self.config.approach_speed,
            self.config.park_tolerance,
        );
        if arrived {
            info!(spot = spot.id(), "arrived at free spot");
            MissionState::Final
        } else {
            MissionState::Approaching
        }
    }

    /// Straight run down the lane until the forward sector sees something
    /// within `limit_distance`.
    fn drive_to_limit(
        &mut self,
        frame: &SensorFrame<'_>,
        actuator: &mut dyn Actuator,
    ) -> MissionState {
        let nearest = frame.ranges.and_then(|ranges| {
            let sector = self.config.forward_sector.bounds(ranges.len());
            self.classifier.nearest_in_sector(ranges, sector)
        });

        if let Some(distance) = nearest {
            if f64::from(distance) <= self.config.limit_distance {
                info!(distance, "obstacle ahead, stopping");
                actuator.stop();
                return MissionState::Final;
            }
        }

        actuator.set_steering_angle(0.0);
        actuator.set_cruising_speed(self.config.approach_speed);
        MissionState::Navigating
    }

    fn finish(&mut self, actuator: &mut dyn Actuator, outbox: &mut Vec<Message>) {
        actuator.stop();

        let final_position = self.pose.pose().map(|p| p.position);
        let summary = MissionSummary::collect(&self.spots, self.first_free_spot(), final_position);
        info!("scan complete: {}", summary);

        match &summary.first_free {
            Some(id) => {
                match final_position {
                    Some(p) => info!(spot = %id, "parked at ({:.2}, {:.2})", p.x, p.y),
                    None => info!(spot = %id, "first free spot"),
                }
                outbox.push(Message::FreeSpotFound {
                    spot_id: id.clone(),
                });
            }
            None => {
                warn!("no free spots found");
                outbox.push(Message::NoFreeSpots);
            }
        }
        outbox.push(Message::ScanComplete);
        self.summary = Some(summary);
    }

    pub fn state(&self) -> MissionState {
        self.state
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    pub fn spots(&self) -> &[ParkingSpot] {
        &self.spots
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn first_free_spot(&self) -> Option<&ParkingSpot> {
        self.first_free.and_then(|i| self.spots.get(i))
    }

    pub fn pose(&self) -> Option<VehiclePose> {
        self.pose.pose()
    }

    /// Available once the mission has passed through `Final`.
    pub fn summary(&self) -> Option<&MissionSummary> {
        self.summary.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.state == MissionState::Stopped
    }
}
