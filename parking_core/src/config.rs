// parking_core/src/config.rs

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Selects which behaviour the mission state machine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionMode {
    /// Visit every spot, classify it, and park in the first free one.
    #[default]
    ScanAndPark,
    /// Drive straight down the lane until something blocks the way.
    DriveToLimit,
}

/// All tunables of the vehicle-side mission. Every field has a default, so a
/// scenario file only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MissionConfig {
    pub mode: MissionMode,
    /// Cruise speed while driving to a scan position or into the spot (m/s).
    pub approach_speed: f64,
    /// Crawl speed while the sample window fills (m/s).
    pub scan_speed: f64,
    /// Arrival radius around a scan position (m).
    pub scan_tolerance: f64,
    /// Arrival radius around the chosen spot (m).
    pub park_tolerance: f64,
    /// `DriveToLimit` stops once the forward sector sees a return this close (m).
    pub limit_distance: f64,
    pub navigator: NavigatorConfig,
    pub classifier: ClassifierConfig,
    pub forward_sector: SectorConfig,
    pub heading: HeadingConfig,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            mode: MissionMode::default(),
            approach_speed: 5.0,
            scan_speed: 2.0,
            scan_tolerance: 0.7,
            park_tolerance: 1.0,
            limit_distance: 3.0,
            navigator: NavigatorConfig::default(),
            classifier: ClassifierConfig::default(),
            forward_sector: SectorConfig {
                start: 0.45,
                end: 0.55,
            },
            heading: HeadingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigatorConfig {
    /// Proportional gain from heading error (rad) to steering angle (rad).
    pub steering_gain: f64,
    /// Steering command magnitude limit (rad).
    pub max_steering_angle: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            steering_gain: 4.0,
            max_steering_angle: 0.6,
        }
    }
}

/// Occupancy decision parameters. These depend on the scene and the sensor;
/// deployments have used thresholds an order of magnitude apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Shortest range that counts as a hit (m).
    pub range_min: f32,
    /// Longest range that counts as a hit (m).
    pub range_max: f32,
    /// Mean hits per frame at or above which a spot is occupied.
    pub obstacle_threshold: f64,
    /// Number of frames in one scan window.
    pub scan_frames: usize,
    /// Start of the right-hand sector as a fraction of the frame.
    pub sector_start: f64,
    /// End of the right-hand sector as a fraction of the frame.
    /// The left sector is the mirror image.
    pub sector_end: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            range_min: 0.2,
            range_max: 5.0,
            obstacle_threshold: 25.0,
            scan_frames: 30,
            sector_start: 0.10,
            sector_end: 0.40,
        }
    }
}

/// A contiguous slice of a range frame, as fractions of its length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectorConfig {
    pub start: f64,
    pub end: f64,
}

impl SectorConfig {
    /// Index range covered by this sector in a frame of `len` beams.
    pub fn bounds(&self, len: usize) -> Range<usize> {
        fraction_index(self.start, len)..fraction_index(self.end, len)
    }
}

/// `floor(fraction * len)`, kept inside `[0, len]`.
pub(crate) fn fraction_index(fraction: f64, len: usize) -> usize {
    ((fraction * len as f64).floor().max(0.0) as usize).min(len)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeadingConfig {
    /// Weight of each new instantaneous heading in the exponential filter.
    pub smoothing: f64,
    /// Minimum `|dx| + |dz|` between fixes before the heading is updated (m).
    pub min_movement: f64,
    /// Heading assumed before the vehicle has moved (rad).
    pub initial_heading: f64,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.15,
            min_movement: 0.002,
            initial_heading: 0.0,
        }
    }
}

fn ensure(condition: bool, field: &'static str, reason: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::new(field, reason))
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl MissionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(positive(self.approach_speed), "approach_speed", "must be > 0")?;
        ensure(
            self.scan_speed.is_finite() && self.scan_speed >= 0.0,
            "scan_speed",
            "must be >= 0",
        )?;
        ensure(positive(self.scan_tolerance), "scan_tolerance", "must be > 0")?;
        ensure(positive(self.park_tolerance), "park_tolerance", "must be > 0")?;
        ensure(positive(self.limit_distance), "limit_distance", "must be > 0")?;

        let nav = &self.navigator;
        ensure(
            positive(nav.steering_gain),
            "navigator.steering_gain",
            "must be > 0; the steering sign is fixed by the coordinate convention",
        )?;
        ensure(
            positive(nav.max_steering_angle),
            "navigator.max_steering_angle",
            "must be > 0",
        )?;

        let cls = &self.classifier;
        ensure(
            cls.range_min.is_finite() && cls.range_min >= 0.0,
            "classifier.range_min",
            "must be >= 0",
        )?;
        ensure(
            cls.range_max.is_finite() && cls.range_max > cls.range_min,
            "classifier.range_max",
            "must be greater than range_min",
        )?;
        ensure(
            cls.obstacle_threshold.is_finite() && cls.obstacle_threshold >= 0.0,
            "classifier.obstacle_threshold",
            "must be >= 0",
        )?;
        ensure(cls.scan_frames >= 1, "classifier.scan_frames", "must be >= 1")?;
        ensure(
            0.0 <= cls.sector_start && cls.sector_start < cls.sector_end && cls.sector_end <= 0.5,
            "classifier.sector_start",
            "need 0 <= sector_start < sector_end <= 0.5 so the side sectors never overlap",
        )?;

        let fwd = &self.forward_sector;
        ensure(
            0.0 <= fwd.start && fwd.start < fwd.end && fwd.end <= 1.0,
            "forward_sector",
            "need 0 <= start < end <= 1",
        )?;

        let heading = &self.heading;
        ensure(
            heading.smoothing > 0.0 && heading.smoothing <= 1.0,
            "heading.smoothing",
            "must be in (0, 1]",
        )?;
        ensure(
            heading.min_movement.is_finite() && heading.min_movement >= 0.0,
            "heading.min_movement",
            "must be >= 0",
        )?;
        ensure(
            heading.initial_heading.is_finite(),
            "heading.initial_heading",
            "must be finite",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(MissionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_documents_keep_other_defaults() {
        let config: MissionConfig = serde_json::from_str(
            r#"{"mode":"drive_to_limit","classifier":{"obstacle_threshold":5,"range_max":1.0}}"#,
        )
        .unwrap();
        assert_eq!(config.mode, MissionMode::DriveToLimit);
        assert_eq!(config.classifier.obstacle_threshold, 5.0);
        assert_eq!(config.classifier.range_max, 1.0);
        assert_eq!(config.classifier.scan_frames, 30);
        assert_eq!(config.approach_speed, 5.0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<MissionConfig, _> = serde_json::from_str(r#"{"aproach_speed":3.0}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn overlapping_side_sectors_are_rejected() {
        let mut config = MissionConfig::default();
        config.classifier.sector_end = 0.6;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "classifier.sector_start");
    }

    #[test]
    fn inverted_range_band_is_rejected() {
        let mut config = MissionConfig::default();
        config.classifier.range_min = 6.0;
        assert_eq!(
            config.validate().unwrap_err().field,
            "classifier.range_max"
        );
    }

    #[test]
    fn negative_gain_is_rejected() {
        let mut config = MissionConfig::default();
        config.navigator.steering_gain = -4.0;
        assert_eq!(
            config.validate().unwrap_err().field,
            "navigator.steering_gain"
        );
    }

    #[test]
    fn sector_bounds_floor_the_fractions() {
        let sector = SectorConfig {
            start: 0.45,
            end: 0.55,
        };
        assert_eq!(sector.bounds(360), 162..198);
        assert_eq!(sector.bounds(0), 0..0);
    }
}
