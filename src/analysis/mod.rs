//! Frame Analysis Engine.
//!
//! Turns a single video frame into a [`DetectionVerdict`]: face
//! geometry via the external detector capability, plus a pixel-edge
//! heuristic for document presence. Analysis is throttled so the
//! frame-processing path stays cheap at any camera frame rate.

mod document;
mod face;
mod verdict;

pub use document::{DocumentPresenceHeuristic, EdgeSampleHeuristic, FixedHeuristic, HeuristicScore};
pub use face::{
    document_face_visible, largest_face, selfie_aligned, DetectorOptions, Face, FaceBox,
    FaceDetector, MockFaceDetector, PerformanceMode,
};
pub use verdict::{DetectionVerdict, FrameAnalyzer};
