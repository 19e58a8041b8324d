//! Capture targets and their per-target policy.

use super::camera::CameraFacing;
use super::config::DecisionConfig;
use serde::{Deserialize, Serialize};

/// What the open camera session is trying to photograph.
///
/// The target selects the physical camera, the detection policy, and
/// the stability streak required before auto-capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureTarget {
    /// The applicant's face, front camera.
    Selfie,
    /// Front side of the identity document, back camera.
    DocumentFront,
    /// Back side of the identity document, back camera. Optional in
    /// the submission.
    DocumentBack,
}

impl CaptureTarget {
    /// Physical camera used for this target.
    pub fn facing(self) -> CameraFacing {
        match self {
            CaptureTarget::Selfie => CameraFacing::Front,
            CaptureTarget::DocumentFront | CaptureTarget::DocumentBack => CameraFacing::Back,
        }
    }

    /// True for the two document sides.
    pub fn is_document(self) -> bool {
        !matches!(self, CaptureTarget::Selfie)
    }

    /// Consecutive positive verdicts required before auto-capture.
    ///
    /// Documents are harder to hold perfectly still, and their
    /// detection signal false-positives less, so they need a shorter
    /// run.
    pub fn required_streak(self, config: &DecisionConfig) -> u32 {
        if self.is_document() {
            config.document_streak
        } else {
            config.selfie_streak
        }
    }

    /// Stem used when naming the captured file.
    pub fn file_stem(self) -> &'static str {
        match self {
            CaptureTarget::Selfie => "selfie",
            CaptureTarget::DocumentFront => "document_front",
            CaptureTarget::DocumentBack => "document_back",
        }
    }
}

impl std::fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_per_target() {
        assert_eq!(CaptureTarget::Selfie.facing(), CameraFacing::Front);
        assert_eq!(CaptureTarget::DocumentFront.facing(), CameraFacing::Back);
        assert_eq!(CaptureTarget::DocumentBack.facing(), CameraFacing::Back);
    }

    #[test]
    fn test_streaks_per_target() {
        let config = DecisionConfig::default();
        assert_eq!(CaptureTarget::Selfie.required_streak(&config), 3);
        assert_eq!(CaptureTarget::DocumentFront.required_streak(&config), 2);
        assert_eq!(CaptureTarget::DocumentBack.required_streak(&config), 2);
    }
}
