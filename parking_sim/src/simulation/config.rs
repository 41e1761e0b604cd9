// parking_sim/src/simulation/config.rs

use bevy::prelude::Resource;
use figment::{
    providers::{Format, Toml},
    Figment,
};
use parking_core::config::MissionConfig;
use parking_core::error::ConfigError;
use parking_core::messages::SpotRecord;
use parking_core::provider::SurveyedSpot;
use parking_core::types::Side;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("scenario file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] Box<figment::Error>),

    #[error(transparent)]
    Mission(#[from] ConfigError),

    #[error("invalid scenario: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ScenarioError {
    fn from(e: figment::Error) -> Self {
        ScenarioError::Parse(Box::new(e))
    }
}

// =========================================================================
// == Top-Level Configuration Resource ==
// =========================================================================

/// The root of a scenario TOML file. Every section is optional.
#[derive(Resource, Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub vehicle: VehicleSection,
    #[serde(default)]
    pub sensors: SensorsSection,
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub mission: MissionConfig,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    /// Seed for the noise generator. A random seed is drawn when absent.
    pub seed: Option<u64>,
    /// Fixed step of the control loop in seconds.
    pub timestep: f64,
    /// The run fails if the mission has not completed by then.
    pub duration_seconds: f64,
    /// Time the simulation keeps running after the provider saw `SCAN_COMPLETE`.
    pub linger_seconds: f64,
    /// Bound of each direction of the vehicle/provider link.
    pub channel_capacity: usize,
    /// Minimum time between two `SPOT_MAP` sends.
    pub resend_interval: f64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            seed: Some(7),
            timestep: 0.05,
            duration_seconds: 60.0,
            linger_seconds: 1.0,
            channel_capacity: 64,
            resend_interval: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleSection {
    pub wheelbase: f64,
    pub max_steering_angle: f64,
    /// Limit on how fast the speed follows the cruise command (m/s^2).
    pub max_acceleration: f64,
    pub start: StartPose,
}

impl Default for VehicleSection {
    fn default() -> Self {
        Self {
            wheelbase: 2.5,
            max_steering_angle: 0.6,
            max_acceleration: 4.0,
            start: StartPose::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct StartPose {
    pub x: f64,
    pub z: f64,
    /// Radians from +x toward +z.
    pub heading: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SensorsSection {
    pub gps: GpsConfig,
    pub lidar: LidarConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GpsConfig {
    /// A disabled device is not spawned; the controller sees no fixes.
    pub enabled: bool,
    /// Standard deviation of the per-axis position noise (m).
    pub noise_stddev: f64,
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            noise_stddev: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LidarConfig {
    pub enabled: bool,
    pub horizontal_resolution: usize,
    pub fov_deg: f64,
    pub max_range: f32,
    pub range_noise_stddev: f32,
}

impl Default for LidarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            horizontal_resolution: 360,
            fov_deg: 360.0,
            max_range: 12.0,
            range_noise_stddev: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldSection {
    /// Footprint of a parked car along the lane (m).
    pub car_length: f64,
    /// Footprint of a parked car across the lane (m).
    pub car_width: f64,
    pub spots: Vec<SpotConfig>,
    pub walls: Vec<WallConfig>,
}

impl Default for WorldSection {
    fn default() -> Self {
        let spot = |id: &str, side, x, z, occupied| SpotConfig {
            id: id.to_string(),
            side,
            x,
            z,
            occupied,
        };
        Self {
            car_length: 4.4,
            car_width: 1.8,
            spots: vec![
                spot("P1R", Side::Right, 12.0, 3.0, true),
                spot("P2L", Side::Left, 19.0, -3.0, false),
                spot("P3R", Side::Right, 26.0, 3.0, true),
                spot("P4L", Side::Left, 33.0, -3.0, false),
            ],
            walls: vec![WallConfig {
                x: 45.0,
                z: 0.0,
                length: 1.0,
                width: 14.0,
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpotConfig {
    pub id: String,
    pub side: Side,
    pub x: f64,
    /// Older scenario files call the lateral coordinate `y`.
    #[serde(alias = "y")]
    pub z: f64,
    /// Ground truth: a parked car is placed on the spot.
    #[serde(default)]
    pub occupied: bool,
}

impl SpotConfig {
    pub fn to_surveyed(&self) -> SurveyedSpot {
        SurveyedSpot {
            record: SpotRecord {
                id: self.id.clone(),
                side: self.side,
                x: self.x,
                z: self.z,
            },
            occupied: self.occupied,
        }
    }
}

/// An axis-aligned box obstacle centred on `(x, z)`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WallConfig {
    pub x: f64,
    pub z: f64,
    /// Extent along x (m).
    pub length: f64,
    /// Extent along z (m).
    pub width: f64,
}

// =========================================================================
// == Loading & Validation ==
// =========================================================================

impl ScenarioConfig {
    /// Reads a scenario file. Sections missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        if !path.is_file() {
            return Err(ScenarioError::NotFound(path.to_path_buf()));
        }
        let config: ScenarioConfig = Figment::new().merge(Toml::file(path)).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a scenario from a TOML string, mostly for tests.
    pub fn from_toml_str(text: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = Figment::new().merge(Toml::string(text)).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        let sim = &self.simulation;
        if !(sim.timestep.is_finite() && sim.timestep > 0.0) {
            return Err(ScenarioError::Invalid("simulation.timestep must be > 0".into()));
        }
        if !(sim.duration_seconds > 0.0) || sim.linger_seconds < 0.0 {
            return Err(ScenarioError::Invalid(
                "simulation.duration_seconds must be > 0 and linger_seconds >= 0".into(),
            ));
        }
        if sim.resend_interval < 0.0 {
            return Err(ScenarioError::Invalid("simulation.resend_interval must be >= 0".into()));
        }

        let vehicle = &self.vehicle;
        if !(vehicle.wheelbase > 0.0 && vehicle.max_steering_angle > 0.0 && vehicle.max_acceleration > 0.0) {
            return Err(ScenarioError::Invalid(
                "vehicle.wheelbase, max_steering_angle and max_acceleration must be > 0".into(),
            ));
        }

        let lidar = &self.sensors.lidar;
        if lidar.enabled && (lidar.horizontal_resolution == 0 || !(lidar.fov_deg > 0.0) || !(lidar.max_range > 0.0)) {
            return Err(ScenarioError::Invalid(
                "sensors.lidar needs at least one beam, a positive fov and a positive range".into(),
            ));
        }
        if self.sensors.gps.noise_stddev < 0.0 || lidar.range_noise_stddev < 0.0 {
            return Err(ScenarioError::Invalid("noise standard deviations must be >= 0".into()));
        }

        let mut ids = HashSet::new();
        for spot in &self.world.spots {
            if !ids.insert(spot.id.as_str()) {
                return Err(ScenarioError::Invalid(format!("duplicate spot id `{}`", spot.id)));
            }
        }

        self.mission.validate()?;
        Ok(())
    }

    pub fn surveyed_spots(&self) -> Vec<SurveyedSpot> {
        self.world.spots.iter().map(SpotConfig::to_surveyed).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_core::config::MissionMode;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ScenarioConfig::from_toml_str("").unwrap();
        assert_eq!(config.simulation.timestep, 0.05);
        assert_eq!(config.world.spots.len(), 4);
        assert!(config.world.spots[0].occupied);
        assert!(config.sensors.gps.enabled);
        assert_eq!(config.mission.classifier.obstacle_threshold, 25.0);
    }

    #[test]
    fn sections_override_only_what_they_name() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            [simulation]
            seed = 42

            [sensors.gps]
            enabled = false

            [mission]
            mode = "drive_to_limit"

            [mission.classifier]
            obstacle_threshold = 5.0
            range_max = 1.0

            [[world.spots]]
            id = "A"
            side = "LEFT"
            x = 8.0
            y = -3.0
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.simulation.timestep, 0.05);
        assert!(!config.sensors.gps.enabled);
        assert!(config.sensors.lidar.enabled);
        assert_eq!(config.mission.mode, MissionMode::DriveToLimit);
        assert_eq!(config.mission.classifier.range_max, 1.0);
        assert_eq!(config.mission.classifier.scan_frames, 30);
        assert_eq!(config.world.spots.len(), 1);
        assert_eq!(config.world.spots[0].side, Side::Left);
        assert_eq!(config.world.spots[0].z, -3.0);
        assert!(!config.world.spots[0].occupied);
        assert_eq!(config.world.walls.len(), 1);
    }

    #[test]
    fn unknown_keys_and_bad_values_are_rejected() {
        assert!(matches!(
            ScenarioConfig::from_toml_str("[simulation]\ntimestpe = 0.1\n"),
            Err(ScenarioError::Parse(_))
        ));
        assert!(matches!(
            ScenarioConfig::from_toml_str("[simulation]\ntimestep = 0.0\n"),
            Err(ScenarioError::Invalid(_))
        ));
        assert!(matches!(
            ScenarioConfig::from_toml_str("[mission.classifier]\nsector_end = 0.7\n"),
            Err(ScenarioError::Mission(_))
        ));
    }

    #[test]
    fn duplicate_spot_ids_are_rejected() {
        let text = r#"
            [[world.spots]]
            id = "A"
            side = "R"
            x = 1.0
            z = 3.0

            [[world.spots]]
            id = "A"
            side = "L"
            x = 5.0
            z = -3.0
        "#;
        assert!(matches!(
            ScenarioConfig::from_toml_str(text),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn shipped_scenario_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets/scenarios/default.toml");
        let config = ScenarioConfig::load(&path).unwrap();
        assert_eq!(config.world.spots.len(), 4);
        assert_eq!(config.surveyed_spots()[1].record.id, "P2L");
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            ScenarioConfig::load(Path::new("does/not/exist.toml")),
            Err(ScenarioError::NotFound(_))
        ));
    }
}
