//! Face detector seam and face geometry predicates.
//!
//! The detector itself is an external capability (ML Kit, Vision,
//! etc.); this module defines the trait it is consumed through and
//! the pure geometry tests applied to its output.

use crate::capture::{CameraFacing, CaptureTarget, DetectionConfig, Frame};

/// Axis-aligned face bounding box in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
}

impl FaceBox {
    /// Box area, used for largest-face selection.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Horizontal center.
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// One detected face with the head angles the alignment test needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Bounding box in frame coordinates.
    pub bounding_box: FaceBox,
    /// Head yaw (left/right turn) in degrees.
    pub yaw: f64,
    /// Head roll (tilt) in degrees.
    pub roll: f64,
}

/// Detector speed/accuracy trade-off. The capture pipeline always
/// runs fast mode; per-frame latency matters more than landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceMode {
    /// Speed prioritized, reduced landmark output.
    Fast,
    /// Full accuracy (unused by this pipeline).
    Accurate,
}

/// Options passed to the detector per analysis.
#[derive(Debug, Clone, Copy)]
pub struct DetectorOptions {
    /// Speed/accuracy mode.
    pub performance_mode: PerformanceMode,
    /// Smallest face to report, as a fraction of the frame dimension.
    pub min_face_ratio: f64,
    /// Which camera produced the frame.
    pub facing: CameraFacing,
    /// Whether the detector should track faces across frames.
    pub tracking: bool,
}

impl DetectorOptions {
    /// Builds the options for a capture target.
    ///
    /// The front camera looks for large faces; the back camera must
    /// also catch the small portrait printed on an ID card.
    pub fn for_target(target: CaptureTarget, config: &DetectionConfig) -> Self {
        let facing = target.facing();
        let min_face_ratio = match facing {
            CameraFacing::Front => config.front_min_face_ratio,
            CameraFacing::Back => config.back_min_face_ratio,
        };
        Self {
            performance_mode: PerformanceMode::Fast,
            min_face_ratio,
            facing,
            tracking: true,
        }
    }
}

/// Trait for face detector implementations.
pub trait FaceDetector {
    /// Detects faces in the frame. Returns an empty vec when none are
    /// found.
    fn detect(&mut self, frame: &Frame, options: &DetectorOptions) -> Vec<Face>;
}

/// Picks the face with the largest bounding-box area.
///
/// Bystanders and reflections produce spurious smaller faces; the
/// subject is assumed to dominate the frame.
pub fn largest_face(faces: &[Face]) -> Option<&Face> {
    faces.iter().max_by(|a, b| {
        a.bounding_box
            .area()
            .partial_cmp(&b.bounding_box.area())
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Selfie alignment test.
///
/// All conditions must hold: centered horizontally and vertically,
/// face coverage within band, yaw and roll near zero.
pub fn selfie_aligned(face: &Face, width: u32, height: u32, config: &DetectionConfig) -> bool {
    let (w, h) = (width as f64, height as f64);
    if w <= 0.0 || h <= 0.0 {
        return false;
    }

    let bb = &face.bounding_box;
    let offset_x = (bb.center_x() - w / 2.0).abs() / w;
    let offset_y = (bb.center_y() - h / 2.0).abs() / h;
    let coverage = (bb.width / w).min(bb.height / h);

    offset_x <= config.max_center_offset_x
        && offset_y <= config.max_center_offset_y
        && coverage >= config.min_face_coverage
        && coverage <= config.max_face_coverage
        && face.yaw.abs() <= config.max_yaw_degrees
        && face.roll.abs() <= config.max_roll_degrees
}

/// Document face-visible test: a small portrait photo on an ID card.
///
/// Both the width and height ratios must fall in the document band.
pub fn document_face_visible(
    face: &Face,
    width: u32,
    height: u32,
    config: &DetectionConfig,
) -> bool {
    let (w, h) = (width as f64, height as f64);
    if w <= 0.0 || h <= 0.0 {
        return false;
    }

    let ratio_w = face.bounding_box.width / w;
    let ratio_h = face.bounding_box.height / h;

    ratio_w >= config.doc_face_min_ratio
        && ratio_w <= config.doc_face_max_ratio
        && ratio_h >= config.doc_face_min_ratio
        && ratio_h <= config.doc_face_max_ratio
}

/// Mock detector that replays a scripted sequence of results.
#[derive(Debug, Default)]
pub struct MockFaceDetector {
    script: std::collections::VecDeque<Vec<Face>>,
    /// Result returned once the script runs out.
    fallback: Vec<Face>,
    calls: u64,
}

impl MockFaceDetector {
    /// Detector that never sees a face.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Detector that returns `faces` on every call.
    pub fn always(faces: Vec<Face>) -> Self {
        Self {
            fallback: faces,
            ..Self::default()
        }
    }

    /// Detector that replays `script` then keeps returning the last
    /// entry.
    pub fn scripted(script: Vec<Vec<Face>>) -> Self {
        let fallback = script.last().cloned().unwrap_or_default();
        Self {
            script: script.into(),
            fallback,
            calls: 0,
        }
    }

    /// Number of `detect` calls made.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl FaceDetector for MockFaceDetector {
    fn detect(&mut self, _frame: &Frame, _options: &DetectorOptions) -> Vec<Face> {
        self.calls += 1;
        self.script.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(x: f64, y: f64, w: f64, h: f64) -> Face {
        Face {
            bounding_box: FaceBox {
                x,
                y,
                width: w,
                height: h,
            },
            yaw: 0.0,
            roll: 0.0,
        }
    }

    /// Face centered in a 640x480 frame with ~40% coverage.
    fn centered_face() -> Face {
        face(320.0 - 128.0, 240.0 - 96.0, 256.0, 192.0)
    }

    #[test]
    fn test_largest_face_wins() {
        let small = face(0.0, 0.0, 50.0, 50.0);
        let big = face(100.0, 100.0, 200.0, 200.0);
        let faces = vec![small, big, face(10.0, 10.0, 30.0, 90.0)];

        let winner = largest_face(&faces).unwrap();
        assert_eq!(winner.bounding_box.area(), 40000.0);
    }

    #[test]
    fn test_no_faces_no_winner() {
        assert!(largest_face(&[]).is_none());
    }

    #[test]
    fn test_centered_face_is_aligned() {
        let config = DetectionConfig::default();
        assert!(selfie_aligned(&centered_face(), 640, 480, &config));
    }

    #[test]
    fn test_off_center_face_rejected() {
        let config = DetectionConfig::default();
        // Shift the face right by 20% of the frame width (limit is 16%)
        let mut f = centered_face();
        f.bounding_box.x += 0.20 * 640.0;
        assert!(!selfie_aligned(&f, 640, 480, &config));
    }

    #[test]
    fn test_too_small_face_rejected() {
        let config = DetectionConfig::default();
        // 10% coverage, below the 20% floor
        let f = face(288.0, 216.0, 64.0, 48.0);
        assert!(!selfie_aligned(&f, 640, 480, &config));
    }

    #[test]
    fn test_too_close_face_rejected() {
        let config = DetectionConfig::default();
        // Coverage above the 65% ceiling in both dimensions
        let f = face(60.0, 20.0, 520.0, 440.0);
        assert!(!selfie_aligned(&f, 640, 480, &config));
    }

    #[test]
    fn test_turned_head_rejected() {
        let config = DetectionConfig::default();
        let mut f = centered_face();
        f.yaw = 30.0;
        assert!(!selfie_aligned(&f, 640, 480, &config));

        f.yaw = 0.0;
        f.roll = -25.0;
        assert!(!selfie_aligned(&f, 640, 480, &config));
    }

    #[test]
    fn test_boundary_angles_accepted() {
        let config = DetectionConfig::default();
        let mut f = centered_face();
        f.yaw = 22.0;
        f.roll = -22.0;
        assert!(selfie_aligned(&f, 640, 480, &config));
    }

    #[test]
    fn test_id_card_portrait_visible() {
        let config = DetectionConfig::default();
        // 10% of width, 12% of height: inside the 4%-45% band
        let f = face(300.0, 200.0, 64.0, 58.0);
        assert!(document_face_visible(&f, 640, 480, &config));
    }

    #[test]
    fn test_full_size_face_not_a_document_portrait() {
        let config = DetectionConfig::default();
        // A real face filling half the frame exceeds the 45% ceiling
        let f = face(100.0, 50.0, 400.0, 350.0);
        assert!(!document_face_visible(&f, 640, 480, &config));
    }

    #[test]
    fn test_document_band_requires_both_dimensions() {
        let config = DetectionConfig::default();
        // Width in band, height below the 4% floor
        let f = face(300.0, 200.0, 64.0, 10.0);
        assert!(!document_face_visible(&f, 640, 480, &config));
    }

    #[test]
    fn test_detector_options_per_target() {
        let config = DetectionConfig::default();

        let selfie = DetectorOptions::for_target(CaptureTarget::Selfie, &config);
        assert_eq!(selfie.min_face_ratio, 0.20);
        assert_eq!(selfie.facing, CameraFacing::Front);
        assert!(selfie.tracking);
        assert_eq!(selfie.performance_mode, PerformanceMode::Fast);

        let doc = DetectorOptions::for_target(CaptureTarget::DocumentFront, &config);
        assert_eq!(doc.min_face_ratio, 0.05);
        assert_eq!(doc.facing, CameraFacing::Back);
    }

    #[test]
    fn test_scripted_mock_replays_then_repeats() {
        let mut detector = MockFaceDetector::scripted(vec![vec![], vec![centered_face()]]);
        let frame = Frame::new(vec![0u8; 16], 4, 4, 1);
        let options = DetectorOptions::for_target(CaptureTarget::Selfie, &DetectionConfig::default());

        assert!(detector.detect(&frame, &options).is_empty());
        assert_eq!(detector.detect(&frame, &options).len(), 1);
        // Script exhausted: repeats last entry
        assert_eq!(detector.detect(&frame, &options).len(), 1);
        assert_eq!(detector.calls(), 3);
    }
}
