//! Per-frame detection verdicts and the throttled frame analyzer.

use super::document::DocumentPresenceHeuristic;
use super::face::{
    document_face_visible, largest_face, selfie_aligned, DetectorOptions, FaceDetector,
};
use crate::capture::{CaptureTarget, DetectionConfig, Frame};
use std::time::{Duration, Instant};

/// Analysis result for one frame.
///
/// Transient: consumed by the decision state machine immediately and
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionVerdict {
    /// A face was found in the frame.
    pub face_detected: bool,
    /// The largest face satisfies the selfie alignment test.
    pub face_aligned: bool,
    /// The largest face looks like an ID-card portrait.
    pub face_visible: bool,
    /// The document presence heuristic fired (documents only).
    pub structured_object_detected: bool,
    /// Width of the analyzed frame.
    pub frame_width: u32,
    /// Height of the analyzed frame.
    pub frame_height: u32,
}

/// Frame Analysis Engine: face geometry plus the document heuristic,
/// throttled to a bounded analysis rate.
///
/// The analyzer runs on the frame-processing path; throttling bounds
/// CPU cost regardless of the camera's actual frame rate. Skipped
/// frames return `None`.
pub struct FrameAnalyzer<D, H> {
    detector: D,
    heuristic: H,
    config: DetectionConfig,
    min_interval: Duration,
    last_analysis: Option<Instant>,
}

impl<D: FaceDetector, H: DocumentPresenceHeuristic> FrameAnalyzer<D, H> {
    /// Creates an analyzer over the given detector and heuristic.
    pub fn new(detector: D, heuristic: H, config: DetectionConfig) -> Self {
        let min_interval = Duration::from_millis(config.analysis_interval_ms);
        Self {
            detector,
            heuristic,
            config,
            min_interval,
            last_analysis: None,
        }
    }

    /// Analyzes a frame for the given target.
    ///
    /// Returns `None` when the frame arrives inside the throttle
    /// window.
    pub fn analyze(&mut self, frame: &Frame, target: CaptureTarget) -> Option<DetectionVerdict> {
        let now = frame.timestamp();
        if let Some(last) = self.last_analysis {
            if now.saturating_duration_since(last) < self.min_interval {
                return None;
            }
        }
        self.last_analysis = Some(now);

        let options = DetectorOptions::for_target(target, &self.config);
        let faces = self.detector.detect(frame, &options);
        let best = largest_face(&faces);

        let (width, height) = (frame.width(), frame.height());
        let verdict = if target.is_document() {
            let face_visible = best
                .map(|f| document_face_visible(f, width, height, &self.config))
                .unwrap_or(false);
            DetectionVerdict {
                face_detected: best.is_some(),
                face_aligned: false,
                face_visible,
                structured_object_detected: self.heuristic.structured_object_present(frame),
                frame_width: width,
                frame_height: height,
            }
        } else {
            let face_aligned = best
                .map(|f| selfie_aligned(f, width, height, &self.config))
                .unwrap_or(false);
            DetectionVerdict {
                face_detected: best.is_some(),
                face_aligned,
                face_visible: false,
                structured_object_detected: false,
                frame_width: width,
                frame_height: height,
            }
        };

        tracing::trace!(
            target = %target,
            seq = frame.sequence(),
            face = verdict.face_detected,
            aligned = verdict.face_aligned,
            visible = verdict.face_visible,
            structured = verdict.structured_object_detected,
            "Frame analyzed"
        );

        Some(verdict)
    }

    /// Resets the throttle window (e.g. when a new session opens).
    pub fn reset(&mut self) {
        self.last_analysis = None;
    }
}
