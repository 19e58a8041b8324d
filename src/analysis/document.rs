//! Document presence heuristic.
//!
//! Decides whether "a sufficiently textured, non-blank, non-overexposed
//! rectangular object fills the frame" by sampling luminance edges on a
//! coarse grid. This is a cheap stand-in for real document detection;
//! the trait seam exists so a real model can replace it without
//! touching the decision state machine.

use crate::capture::{Frame, HeuristicConfig};

/// Trait for document presence detection over a single frame.
pub trait DocumentPresenceHeuristic {
    /// True when the frame plausibly contains a document-like object.
    fn structured_object_present(&self, frame: &Frame) -> bool;
}

/// Raw measurements from one evaluation, useful for tracing and tuning.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicScore {
    /// Mean luminance over the sample grid.
    pub mean_brightness: f64,
    /// Fraction of samples that counted as edges.
    pub edge_ratio: f64,
    /// Total samples taken.
    pub samples: u32,
}

/// Edge-sampling implementation of the heuristic.
///
/// Samples a grid within the central region of the frame and counts a
/// sample as an edge when the summed luminance difference to its right
/// and down neighbors exceeds a fixed threshold. Thresholds were tuned
/// empirically; see `HeuristicConfig`.
#[derive(Debug, Clone)]
pub struct EdgeSampleHeuristic {
    config: HeuristicConfig,
}

impl EdgeSampleHeuristic {
    /// Creates the heuristic with the given tuning parameters.
    pub fn new(config: HeuristicConfig) -> Self {
        Self { config }
    }

    /// Measures brightness and edge density over the sample grid.
    pub fn score(&self, frame: &Frame) -> HeuristicScore {
        let c = &self.config;
        let w = frame.width();
        let h = frame.height();

        let x0 = (w as f64 * c.region_left) as u32;
        let x1 = (w as f64 * c.region_right) as u32;
        let y0 = (h as f64 * c.region_top) as u32;
        let y1 = (h as f64 * c.region_bottom) as u32;

        let step_x = ((x1.saturating_sub(x0)) / c.grid_cols).max(1);
        let step_y = ((y1.saturating_sub(y0)) / c.grid_rows).max(1);

        let mut samples = 0u32;
        let mut edges = 0u32;
        let mut brightness_sum = 0u64;

        let mut y = y0;
        while y < y1 {
            let mut x = x0;
            while x < x1 {
                let lum = frame.luma_at(x, y) as i32;
                let right = frame.luma_at(x + step_x, y) as i32;
                let down = frame.luma_at(x, y + step_y) as i32;

                let diff = (lum - right).unsigned_abs() + (lum - down).unsigned_abs();
                if diff > c.edge_threshold {
                    edges += 1;
                }
                brightness_sum += lum as u64;
                samples += 1;

                x += step_x;
            }
            y += step_y;
        }

        let mean_brightness = if samples > 0 {
            brightness_sum as f64 / samples as f64
        } else {
            0.0
        };
        let edge_ratio = if samples > 0 {
            edges as f64 / samples as f64
        } else {
            0.0
        };

        HeuristicScore {
            mean_brightness,
            edge_ratio,
            samples,
        }
    }
}

impl Default for EdgeSampleHeuristic {
    fn default() -> Self {
        Self::new(HeuristicConfig::default())
    }
}

impl DocumentPresenceHeuristic for EdgeSampleHeuristic {
    fn structured_object_present(&self, frame: &Frame) -> bool {
        if !frame.is_valid() || frame.pixel_count() == 0 {
            return false;
        }

        let score = self.score(frame);
        let present = score.mean_brightness > self.config.min_brightness
            && score.mean_brightness < self.config.max_brightness
            && score.edge_ratio > self.config.min_edge_ratio;

        tracing::trace!(
            brightness = score.mean_brightness,
            edge_ratio = score.edge_ratio,
            samples = score.samples,
            present,
            "Document heuristic evaluated"
        );

        present
    }
}

/// Mock heuristic with a fixed answer, for state-machine tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedHeuristic(pub bool);

impl DocumentPresenceHeuristic for FixedHeuristic {
    fn structured_object_present(&self, _frame: &Frame) -> bool {
        self.0
    }
}
