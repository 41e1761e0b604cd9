// parking_core/src/provider.rs

//! The map-provider side of the link. It owns the ground-truth occupancy of
//! every spot, publishes the spot map until the vehicle acknowledges it and
//! checks each reported classification against the truth.

use crate::channel::Endpoint;
use crate::messages::{Message, SpotRecord};
use crate::types::SpotStatus;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A spot as known to the provider, including whether it is really taken.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyedSpot {
    pub record: SpotRecord,
    pub occupied: bool,
}

/// How the vehicle's reports compared with the ground truth.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccuracyReport {
    pub correct: usize,
    pub incorrect: usize,
    /// Results for ids the provider never published.
    pub unknown: usize,
    pub mismatched: Vec<String>,
    pub free_spot: Option<String>,
    pub no_free_spots: bool,
}

impl AccuracyReport {
    pub fn checked(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Fraction of checked results that were right, `None` before any.
    pub fn accuracy(&self) -> Option<f64> {
        let checked = self.checked();
        (checked > 0).then(|| self.correct as f64 / checked as f64)
    }
}

#[derive(Debug, Clone)]
pub struct MapProvider {
    map: Vec<SpotRecord>,
    truth: HashMap<String, bool>,
    resend_interval: f64,
    last_send: Option<f64>,
    map_sends: usize,
    acknowledged: Option<usize>,
    completed_at: Option<f64>,
    report: AccuracyReport,
}

impl MapProvider {
    pub fn new(spots: Vec<SurveyedSpot>, resend_interval: f64) -> Self {
        let truth = spots
            .iter()
            .map(|s| (s.record.id.clone(), s.occupied))
            .collect();
        info!("map provider ready with {} spots", spots.len());
        for spot in &spots {
            info!(
                "  {} [{}] at ({:.2}, {:.2}): {}",
                spot.record.id,
                spot.record.side,
                spot.record.x,
                spot.record.z,
                if spot.occupied { "occupied" } else { "free" }
            );
        }
        Self {
            map: spots.into_iter().map(|s| s.record).collect(),
            truth,
            resend_interval: resend_interval.max(0.0),
            last_send: None,
            map_sends: 0,
            acknowledged: None,
            completed_at: None,
            report: AccuracyReport::default(),
        }
    }

    /// The spot map, when it is due. Never more often than the resend
    /// interval and never after the acknowledgment.
    pub fn poll(&mut self, now: f64) -> Option<Message> {
        if self.acknowledged.is_some() {
            return None;
        }
        let due = self
            .last_send
            .map_or(true, |last| now - last >= self.resend_interval);
        if !due {
            return None;
        }
        self.last_send = Some(now);
        self.map_sends += 1;
        Some(Message::SpotMap {
            spots: self.map.clone(),
        })
    }

    pub fn handle(&mut self, message: &Message, now: f64) {
        match message {
            Message::AckSpotMap { count } => {
                if self.acknowledged.is_some() {
                    debug!(count, "duplicate acknowledgment");
                    return;
                }
                self.acknowledged = Some(*count);
                info!("vehicle acknowledged {} spots", count);
                if *count != self.map.len() {
                    warn!(published = self.map.len(), count, "acknowledged count differs from the map");
                }
            }
            Message::ScanResult {
                spot_id,
                status,
                score,
                min_dist,
            } => self.check_result(spot_id, *status, *score, *min_dist),
            Message::FreeSpotFound { spot_id } => {
                info!("vehicle found a free spot: {}", spot_id);
                if self.truth.get(spot_id) == Some(&true) {
                    warn!(spot = %spot_id, "reported free spot is actually occupied");
                }
                self.report.free_spot = Some(spot_id.clone());
            }
            Message::NoFreeSpots => {
                warn!("vehicle found no free spots");
                self.report.no_free_spots = true;
            }
            Message::ScanComplete => {
                if self.completed_at.is_some() {
                    debug!("duplicate completion");
                    return;
                }
                self.completed_at = Some(now);
                let report = &self.report;
                info!(
                    "scan complete: {} correct, {} incorrect, {} unknown",
                    report.correct, report.incorrect, report.unknown
                );
            }
            Message::SpotMap { .. } => debug!("ignoring spot map sent to the provider"),
        }
    }

    fn check_result(&mut self, spot_id: &str, status: SpotStatus, score: f64, min_dist: Option<f64>) {
        let Some(&occupied) = self.truth.get(spot_id) else {
            warn!(spot = spot_id, %status, "result for an unknown spot");
            self.report.unknown += 1;
            return;
        };
        let actual = if occupied {
            SpotStatus::Occupied
        } else {
            SpotStatus::Free
        };
        if status == actual {
            self.report.correct += 1;
            info!(
                spot = spot_id,
                detected = %status,
                score,
                ?min_dist,
                "correct"
            );
        } else {
            self.report.incorrect += 1;
            self.report.mismatched.push(spot_id.to_string());
            warn!(
                spot = spot_id,
                detected = %status,
                %actual,
                score,
                ?min_dist,
                "MISMATCH"
            );
        }
    }

    pub fn acknowledged(&self) -> Option<usize> {
        self.acknowledged
    }

    pub fn map_sends(&self) -> usize {
        self.map_sends
    }

    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Time at which `SCAN_COMPLETE` first arrived.
    pub fn completed_at(&self) -> Option<f64> {
        self.completed_at
    }

    pub fn report(&self) -> &AccuracyReport {
        &self.report
    }
}

/// A provider wired to its end of the message link.
#[derive(Debug)]
pub struct MapProviderNode {
    endpoint: Endpoint,
    provider: MapProvider,
}

impl MapProviderNode {
    pub fn new(endpoint: Endpoint, provider: MapProvider) -> Self {
        Self { endpoint, provider }
    }

    /// Processes the inbox, then resends the map if it is due.
    pub fn step(&mut self, now: f64) {
        for message in self.endpoint.drain() {
            self.provider.handle(&message, now);
        }
        if let Some(map) = self.provider.poll(now) {
            debug!(attempt = self.provider.map_sends(), "sending spot map");
            if let Err(e) = self.endpoint.send(&map) {
                warn!("failed to send spot map: {}", e);
            }
        }
    }

    pub fn provider(&self) -> &MapProvider {
        &self.provider
    }
}
