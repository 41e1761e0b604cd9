// parking_core/src/pose.rs

use crate::config::HeadingConfig;
use crate::types::Position;
use crate::utils::geometry::normalize_angle;

/// Planar position plus the filtered heading (rad, from +x toward +z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehiclePose {
    pub position: Position,
    pub heading: f64,
}

/// Derives a smoothed heading from consecutive position fixes.
///
/// The instantaneous heading of each step is blended in with an exponential
/// filter that works on the wrapped angle difference, so the estimate never
/// swings through zero when the true heading crosses ±π. Steps shorter than
/// the minimum movement leave the heading unchanged.
#[derive(Debug, Clone)]
pub struct PoseTracker {
    config: HeadingConfig,
    last_position: Option<Position>,
    heading: f64,
}

impl PoseTracker {
    pub fn new(config: HeadingConfig) -> Self {
        Self {
            heading: normalize_angle(config.initial_heading),
            config,
            last_position: None,
        }
    }

    /// Feeds the fix of the current tick.
    pub fn update(&mut self, position: Position) {
        if let Some(last) = self.last_position {
            let dx = position.x - last.x;
            let dz = position.y - last.y;
            if dx.abs() + dz.abs() > self.config.min_movement {
                let instant = dz.atan2(dx);
                let error = normalize_angle(instant - self.heading);
                self.heading = normalize_angle(self.heading + self.config.smoothing * error);
            }
        }
        self.last_position = Some(position);
    }

    pub fn has_fix(&self) -> bool {
        self.last_position.is_some()
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// The latest pose, or `None` before the first fix.
    pub fn pose(&self) -> Option<VehiclePose> {
        self.last_position.map(|position| VehiclePose {
            position,
            heading: self.heading,
        })
    }
}
