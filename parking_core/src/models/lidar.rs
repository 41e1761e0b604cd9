// parking_core/src/models/lidar.rs

//! Planar range-sensor model shared by the simulator and the controller.
//!
//! Beam `i` of an `n`-beam sensor with field of view `fov` points at
//! `fov / 2 - (i + 0.5) * fov / n` radians in the body frame, measured from
//! the forward axis toward the lateral-right axis. For a full circle this puts
//! index 0 at the rear, the right flank in the first half of the frame and the
//! left flank in the second half, which is the layout the occupancy
//! classifier's side sectors assume.

use dyn_clone::DynClone;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Static description of a range sensor, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSensorSpec {
    /// Number of beams in one frame.
    pub horizontal_resolution: usize,
    /// Angular span covered by the frame (rad).
    pub fov: f64,
}

impl RangeSensorSpec {
    /// Body-frame bearing of beam `index`.
    pub fn beam_bearing(&self, index: usize) -> f64 {
        let step = self.fov / self.horizontal_resolution.max(1) as f64;
        self.fov / 2.0 - (index as f64 + 0.5) * step
    }
}

/// A single ray to be cast by the simulation engine, in the body frame.
#[derive(Debug, Clone)]
pub struct SensorRay {
    /// Index of the beam in the output frame.
    pub id: usize,
    pub bearing: f64,
    /// Unit vector, `x` forward and `y` lateral-right.
    pub direction: Vector2<f64>,
}

/// The result of casting one [`SensorRay`].
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub ray_id: usize,
    pub distance: f32,
}

/// The contract for any sensor model that works by casting rays into the
/// environment. The model defines its scan pattern and turns raw hits into
/// the ordered range frame consumed by the controller.
pub trait RangeSensorModel: Send + Sync + DynClone + Debug {
    fn spec(&self) -> RangeSensorSpec;

    fn generate_rays(&self) -> Vec<SensorRay>;

    /// Builds a frame with one entry per beam. Beams without a hit, or with
    /// a hit beyond the maximum range, read `f32::INFINITY`.
    fn process_hits(&self, hits: &[RayHit]) -> Vec<f32>;

    fn get_max_range(&self) -> f32;
}

dyn_clone::clone_trait_object!(RangeSensorModel);

/// An evenly spaced single-plane lidar.
#[derive(Debug, Clone)]
pub struct PlanarLidarModel {
    pub spec: RangeSensorSpec,
    pub max_range: f32,
}

impl PlanarLidarModel {
    pub fn new(horizontal_resolution: usize, fov: f64, max_range: f32) -> Self {
        Self {
            spec: RangeSensorSpec {
                horizontal_resolution,
                fov,
            },
            max_range,
        }
    }
}

impl RangeSensorModel for PlanarLidarModel {
    fn spec(&self) -> RangeSensorSpec {
        self.spec
    }

    fn generate_rays(&self) -> Vec<SensorRay> {
        (0..self.spec.horizontal_resolution)
            .map(|id| {
                let bearing = self.spec.beam_bearing(id);
                SensorRay {
                    id,
                    bearing,
                    direction: Vector2::new(bearing.cos(), bearing.sin()),
                }
            })
            .collect()
    }

    fn process_hits(&self, hits: &[RayHit]) -> Vec<f32> {
        let mut frame = vec![f32::INFINITY; self.spec.horizontal_resolution];
        for hit in hits {
            let valid = hit.distance.is_finite() && hit.distance <= self.max_range;
            if let Some(slot) = frame.get_mut(hit.ray_id) {
                if valid {
                    *slot = slot.min(hit.distance.max(0.0));
                }
            }
        }
        frame
    }

    fn get_max_range(&self) -> f32 {
        self.max_range
    }
}
