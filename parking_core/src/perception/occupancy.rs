// parking_core/src/perception/occupancy.rs

//! Side-sector occupancy classification from planar range frames.
//!
//! One frame contributes one sample: the number of beams in the side sector
//! whose range falls inside the valid band. A full window of samples is
//! reduced to its mean and compared against the obstacle threshold.

use crate::config::{fraction_index, ClassifierConfig};
use crate::types::{Side, SpotStatus};
use std::ops::Range;

/// What one frame contributed to the scan window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorSample {
    /// Beams inside the valid band.
    pub count: usize,
    /// Shortest of those beams, if any.
    pub min_range: Option<f32>,
}

/// Bounded window of per-frame samples.
#[derive(Debug, Clone)]
pub struct ScanAccumulator {
    capacity: usize,
    counts: Vec<usize>,
    min_range: Option<f32>,
}

impl ScanAccumulator {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            counts: Vec::with_capacity(capacity),
            min_range: None,
        }
    }

    /// Appends a sample. Returns `false` and drops it when the window is full.
    pub fn push(&mut self, sample: SectorSample) -> bool {
        if self.is_full() {
            return false;
        }
        self.counts.push(sample.count);
        if let Some(range) = sample.min_range {
            self.min_range = Some(self.min_range.map_or(range, |m| m.min(range)));
        }
        true
    }

    pub fn reset(&mut self) {
        self.counts.clear();
        self.min_range = None;
    }

    pub fn is_full(&self) -> bool {
        self.counts.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Arithmetic mean of the counts; 0 for an empty window.
    pub fn mean(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        self.counts.iter().sum::<usize>() as f64 / self.counts.len() as f64
    }

    pub fn max(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Shortest valid range seen over the whole window.
    pub fn min_range(&self) -> Option<f32> {
        self.min_range
    }
}

/// The outcome of one finished scan window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub status: SpotStatus,
    pub mean_score: f64,
    pub max_count: usize,
    pub min_distance: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct OccupancyClassifier {
    config: ClassifierConfig,
}

impl OccupancyClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// A fresh window sized for this classifier.
    pub fn accumulator(&self) -> ScanAccumulator {
        ScanAccumulator::new(self.config.scan_frames)
    }

    /// Beam indices examined for `side` in a frame of `len` beams. The left
    /// sector mirrors the right one about the middle of the frame.
    pub fn sector(&self, len: usize, side: Side) -> Range<usize> {
        let start = fraction_index(self.config.sector_start, len);
        let end = fraction_index(self.config.sector_end, len);
        match side {
            Side::Right => start..end,
            Side::Left => (len - end)..(len - start),
        }
    }

    fn in_band(&self, range: f32) -> bool {
        range.is_finite() && range >= self.config.range_min && range <= self.config.range_max
    }

    /// Counts the in-band beams of the side sector.
    pub fn observe(&self, frame: &[f32], side: Side) -> SectorSample {
        let mut sample = SectorSample {
            count: 0,
            min_range: None,
        };
        for &range in &frame[self.sector(frame.len(), side)] {
            if self.in_band(range) {
                sample.count += 1;
                sample.min_range = Some(sample.min_range.map_or(range, |m: f32| m.min(range)));
            }
        }
        sample
    }

    /// Occupied when the mean count reaches the threshold. An empty window
    /// has mean 0 and therefore classifies as free unless the threshold is 0.
    pub fn finalize(&self, window: &ScanAccumulator) -> Classification {
        let mean_score = window.mean();
        let status = if mean_score >= self.config.obstacle_threshold {
            SpotStatus::Occupied
        } else {
            SpotStatus::Free
        };
        Classification {
            status,
            mean_score,
            max_count: window.max(),
            min_distance: window.min_range().map(f64::from),
        }
    }

    /// Shortest finite return at or beyond `range_min` inside `sector`.
    pub fn nearest_in_sector(&self, frame: &[f32], sector: Range<usize>) -> Option<f32> {
        let end = sector.end.min(frame.len());
        let start = sector.start.min(end);
        frame[start..end]
            .iter()
            .copied()
            .filter(|r| r.is_finite() && *r >= self.config.range_min)
            .reduce(f32::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn classifier() -> OccupancyClassifier {
        OccupancyClassifier::new(ClassifierConfig::default())
    }

    #[test]
    fn sectors_are_mirrored_and_disjoint() {
        let classifier = classifier();
        assert_eq!(classifier.sector(360, Side::Right), 36..144);
        assert_eq!(classifier.sector(360, Side::Left), 216..324);
        assert_eq!(classifier.sector(0, Side::Left), 0..0);
    }

    #[test]
    fn in_band_frame_counts_the_whole_sector() {
        let classifier = classifier();
        let frame = vec![2.0_f32; 360];
        let sample = classifier.observe(&frame, Side::Right);
        assert_eq!(sample.count, 108);
        assert_eq!(sample.min_range, Some(2.0));
        assert_eq!(classifier.observe(&frame, Side::Left).count, 108);
    }

    #[test]
    fn silent_frame_counts_nothing() {
        let classifier = classifier();
        let frame = vec![f32::INFINITY; 360];
        let sample = classifier.observe(&frame, Side::Left);
        assert_eq!(sample.count, 0);
        assert_eq!(sample.min_range, None);
    }

    #[test]
    fn band_edges_are_inclusive_and_nan_is_ignored() {
        let classifier = classifier();
        let mut frame = vec![f32::INFINITY; 360];
        frame[40] = 0.2;
        frame[41] = 5.0;
        frame[42] = 0.1;
        frame[43] = 5.1;
        frame[44] = f32::NAN;
        // Outside the right sector entirely.
        frame[200] = 1.0;
        let sample = classifier.observe(&frame, Side::Right);
        assert_eq!(sample.count, 2);
        assert_eq!(sample.min_range, Some(0.2));
    }

    #[test]
    fn mean_equal_to_threshold_is_occupied() {
        let classifier = OccupancyClassifier::new(ClassifierConfig {
            obstacle_threshold: 25.0,
            scan_frames: 4,
            ..ClassifierConfig::default()
        });
        let mut window = classifier.accumulator();
        for count in [20, 30, 25, 25] {
            window.push(SectorSample {
                count,
                min_range: Some(3.0),
            });
        }
        assert!(window.is_full());
        let result = classifier.finalize(&window);
        assert_eq!(result.status, SpotStatus::Occupied);
        assert_abs_diff_eq!(result.mean_score, 25.0);
        assert_eq!(result.max_count, 30);
    }

    #[test]
    fn empty_window_is_free_with_no_distance() {
        let classifier = classifier();
        let result = classifier.finalize(&classifier.accumulator());
        assert_eq!(result.status, SpotStatus::Free);
        assert_eq!(result.mean_score, 0.0);
        assert_eq!(result.max_count, 0);
        assert_eq!(result.min_distance, None);
    }

    #[test]
    fn window_keeps_minimum_over_all_frames_and_rejects_overflow() {
        let mut window = ScanAccumulator::new(2);
        assert!(window.push(SectorSample { count: 3, min_range: Some(4.0) }));
        assert!(window.push(SectorSample { count: 1, min_range: Some(1.5) }));
        assert!(!window.push(SectorSample { count: 9, min_range: Some(0.5) }));
        assert_eq!(window.len(), 2);
        assert_eq!(window.min_range(), Some(1.5));
        window.reset();
        assert!(window.is_empty());
        assert_eq!(window.min_range(), None);
    }

    #[test]
    fn nearest_return_ignores_self_hits_and_silence() {
        let classifier = classifier();
        let mut frame = vec![f32::INFINITY; 360];
        frame[170] = 0.05;
        frame[180] = 2.5;
        frame[190] = 8.0;
        assert_eq!(classifier.nearest_in_sector(&frame, 162..198), Some(2.5));
        assert_eq!(classifier.nearest_in_sector(&frame, 0..10), None);
        assert_eq!(classifier.nearest_in_sector(&frame, 350..400), None);
    }
}
