//! Capture Decision State Machine.
//!
//! Consumes one [`DetectionVerdict`] at a time for the open session
//! and decides when conditions have been stable long enough to take a
//! photo automatically. Detection must hold for a consecutive run of
//! frames (the streak); once satisfied, a short delay timer is armed
//! so the snapshot lands on a moment of genuine stillness.
//!
//! The engine owns the logical timer state only. The session
//! controller schedules the physical delay and reports back through
//! [`DecisionEngine::timer_elapsed`], which keeps the streak rules
//! testable without a runtime.

use crate::analysis::DetectionVerdict;
use crate::capture::{CaptureTarget, DecisionConfig};
use std::time::Duration;

/// User-facing guidance produced alongside each decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// Initial instruction for a selfie session.
    CenterFace,
    /// Initial instruction for a document session.
    FitDocument,
    /// Selfie frame missed: no face, or face out of alignment.
    NoFaceDetected,
    /// Document frame missed: nothing document-like in view.
    ObjectUnclear,
    /// Streak building; keep the pose.
    HoldStill,
    /// Streak satisfied; auto-capture imminent.
    Stable,
}

impl Hint {
    /// The message shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            Hint::CenterFace => "Center your face in the frame and look at the camera",
            Hint::FitDocument => "Fit the document inside the frame",
            Hint::NoFaceDetected => "No face detected. Look at the camera and stay centered",
            Hint::ObjectUnclear => "Object unclear. Move the document closer and avoid glare",
            Hint::HoldStill => "Hold still",
            Hint::Stable => "Stable. Capturing soon",
        }
    }
}

impl std::fmt::Display for Hint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of ingesting one verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep waiting. `cancel_timer` is set when a pending auto-capture
    /// timer must be torn down because the streak broke.
    Wait { hint: Hint, cancel_timer: bool },
    /// Streak satisfied: arm the auto-capture timer with this delay.
    Arm { delay: Duration, hint: Hint },
    /// A capture is in flight; the verdict was discarded.
    Ignore,
}

/// Streak-based auto-capture decision engine for one session.
pub struct DecisionEngine {
    target: CaptureTarget,
    required_streak: u32,
    delay: Duration,
    streak: u32,
    timer_armed: bool,
    suspended: bool,
}

impl DecisionEngine {
    /// Creates an engine for the given target.
    pub fn new(target: CaptureTarget, config: &DecisionConfig) -> Self {
        Self {
            target,
            required_streak: target.required_streak(config),
            delay: Duration::from_millis(config.auto_capture_delay_ms),
            streak: 0,
            timer_armed: false,
            suspended: false,
        }
    }

    /// Instructional hint shown when the session opens.
    pub fn initial_hint(&self) -> Hint {
        if self.target.is_document() {
            Hint::FitDocument
        } else {
            Hint::CenterFace
        }
    }

    /// Whether this verdict counts as "target detected".
    ///
    /// A document may show a printed portrait or may just be a
    /// textured rectangle; either signal suffices.
    fn target_detected(&self, verdict: &DetectionVerdict) -> bool {
        if self.target.is_document() {
            verdict.face_visible || verdict.structured_object_detected
        } else {
            verdict.face_aligned
        }
    }

    /// Consumes one verdict and returns what to do next.
    pub fn ingest(&mut self, verdict: &DetectionVerdict) -> Decision {
        if self.suspended {
            return Decision::Ignore;
        }

        if !self.target_detected(verdict) {
            let had_timer = self.timer_armed;
            self.streak = 0;
            self.timer_armed = false;

            if had_timer {
                tracing::debug!(target = %self.target, "Streak broke, auto-capture cancelled");
            }
            let hint = if self.target.is_document() {
                Hint::ObjectUnclear
            } else {
                Hint::NoFaceDetected
            };
            return Decision::Wait {
                hint,
                cancel_timer: had_timer,
            };
        }

        self.streak = self.streak.saturating_add(1);

        if self.streak >= self.required_streak && !self.timer_armed {
            self.timer_armed = true;
            tracing::debug!(
                target = %self.target,
                streak = self.streak,
                delay_ms = self.delay.as_millis() as u64,
                "Streak satisfied, arming auto-capture"
            );
            return Decision::Arm {
                delay: self.delay,
                hint: Hint::Stable,
            };
        }

        Decision::Wait {
            hint: if self.timer_armed {
                Hint::Stable
            } else {
                Hint::HoldStill
            },
            cancel_timer: false,
        }
    }

    /// Reports that the armed timer fired. Returns true exactly when
    /// the capture should actually trigger; a timer that was cancelled
    /// or raced with a capture in flight returns false.
    pub fn timer_elapsed(&mut self) -> bool {
        if !self.timer_armed || self.suspended {
            return false;
        }
        self.timer_armed = false;
        self.streak = 0;
        true
    }

    /// Marks a capture as in flight. Verdicts are ignored until
    /// [`DecisionEngine::end_capture`]. Also the manual-override entry:
    /// the streak resets first so a later retake starts clean.
    pub fn begin_capture(&mut self) {
        self.streak = 0;
        self.timer_armed = false;
        self.suspended = true;
    }

    /// Resumes verdict ingestion after a failed capture.
    pub fn end_capture(&mut self) {
        self.suspended = false;
    }

    /// Clears all state.
    pub fn reset(&mut self) {
        self.streak = 0;
        self.timer_armed = false;
        self.suspended = false;
    }

    /// Current consecutive-hit count.
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Whether an auto-capture timer is logically pending.
    pub fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    /// Whether a capture is in flight.
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine(target: CaptureTarget) -> DecisionEngine {
        DecisionEngine::new(target, &DecisionConfig::default())
    }

    fn verdict(aligned: bool, visible: bool, structured: bool) -> DetectionVerdict {
        DetectionVerdict {
            face_detected: aligned || visible,
            face_aligned: aligned,
            face_visible: visible,
            structured_object_detected: structured,
            frame_width: 640,
            frame_height: 480,
        }
    }

    fn selfie_hit() -> DetectionVerdict {
        verdict(true, false, false)
    }

    fn selfie_miss() -> DetectionVerdict {
        verdict(false, false, false)
    }

    #[test]
    fn test_selfie_arms_after_three_hits() {
        let mut engine = engine(CaptureTarget::Selfie);

        assert!(matches!(
            engine.ingest(&selfie_hit()),
            Decision::Wait {
                hint: Hint::HoldStill,
                cancel_timer: false
            }
        ));
        assert!(matches!(engine.ingest(&selfie_hit()), Decision::Wait { .. }));

        match engine.ingest(&selfie_hit()) {
            Decision::Arm { delay, hint } => {
                assert_eq!(delay, Duration::from_millis(750));
                assert_eq!(hint, Hint::Stable);
            }
            other => panic!("expected Arm, got {:?}", other),
        }
        assert!(engine.timer_armed());
    }

    #[test]
    fn test_document_arms_after_two_hits() {
        let mut engine = engine(CaptureTarget::DocumentFront);

        assert!(matches!(
            engine.ingest(&verdict(false, false, true)),
            Decision::Wait { .. }
        ));
        assert!(matches!(
            engine.ingest(&verdict(false, false, true)),
            Decision::Arm { .. }
        ));
    }

    #[test]
    fn test_document_either_signal_counts() {
        let mut engine = engine(CaptureTarget::DocumentBack);

        // Portrait only, then texture only: both count toward the run
        assert!(matches!(
            engine.ingest(&verdict(false, true, false)),
            Decision::Wait { .. }
        ));
        assert!(matches!(
            engine.ingest(&verdict(false, false, true)),
            Decision::Arm { .. }
        ));
    }

    #[test]
    fn test_miss_resets_streak_and_cancels_timer() {
        let mut engine = engine(CaptureTarget::Selfie);

        engine.ingest(&selfie_hit());
        engine.ingest(&selfie_hit());
        engine.ingest(&selfie_hit());
        assert!(engine.timer_armed());

        match engine.ingest(&selfie_miss()) {
            Decision::Wait { hint, cancel_timer } => {
                assert_eq!(hint, Hint::NoFaceDetected);
                assert!(cancel_timer);
            }
            other => panic!("expected Wait, got {:?}", other),
        }
        assert_eq!(engine.streak(), 0);
        assert!(!engine.timer_armed());
        // The cancelled timer must not report a trigger
        assert!(!engine.timer_elapsed());
    }

    #[test]
    fn test_broken_run_needs_fresh_unbroken_streak() {
        // detected x2, missed x1, detected x3: no trigger until the
        // fresh run of 3 completes.
        let mut engine = engine(CaptureTarget::Selfie);

        engine.ingest(&selfie_hit());
        engine.ingest(&selfie_hit());
        assert!(matches!(
            engine.ingest(&selfie_miss()),
            Decision::Wait {
                cancel_timer: false,
                ..
            }
        ));

        assert!(matches!(engine.ingest(&selfie_hit()), Decision::Wait { .. }));
        assert!(matches!(engine.ingest(&selfie_hit()), Decision::Wait { .. }));
        assert!(matches!(engine.ingest(&selfie_hit()), Decision::Arm { .. }));
    }

    #[test]
    fn test_no_duplicate_arm_while_timer_pending() {
        let mut engine = engine(CaptureTarget::Selfie);

        for _ in 0..3 {
            engine.ingest(&selfie_hit());
        }
        // More hits while armed: keep the Stable hint, never re-arm
        for _ in 0..5 {
            assert!(matches!(
                engine.ingest(&selfie_hit()),
                Decision::Wait {
                    hint: Hint::Stable,
                    cancel_timer: false
                }
            ));
        }

        assert!(engine.timer_elapsed());
        // A single firing consumes the armed state
        assert!(!engine.timer_elapsed());
        assert_eq!(engine.streak(), 0);
    }

    #[test]
    fn test_verdicts_ignored_while_capturing() {
        let mut engine = engine(CaptureTarget::Selfie);
        engine.begin_capture();

        for _ in 0..10 {
            assert!(matches!(engine.ingest(&selfie_hit()), Decision::Ignore));
        }
        assert_eq!(engine.streak(), 0);
        assert!(!engine.timer_armed());

        engine.end_capture();
        assert!(matches!(engine.ingest(&selfie_hit()), Decision::Wait { .. }));
        assert_eq!(engine.streak(), 1);
    }

    #[test]
    fn test_manual_override_resets_streak_first() {
        let mut engine = engine(CaptureTarget::Selfie);
        engine.ingest(&selfie_hit());
        engine.ingest(&selfie_hit());

        engine.begin_capture();
        assert_eq!(engine.streak(), 0);
        assert!(engine.is_suspended());
        // A timer firing during the manual capture must not trigger
        assert!(!engine.timer_elapsed());
    }

    #[test]
    fn test_initial_hints() {
        assert_eq!(engine(CaptureTarget::Selfie).initial_hint(), Hint::CenterFace);
        assert_eq!(
            engine(CaptureTarget::DocumentFront).initial_hint(),
            Hint::FitDocument
        );
    }

    proptest! {
        /// No sequence of missed verdicts ever builds a streak or arms
        /// the timer.
        #[test]
        fn prop_misses_never_arm(face_seen in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut engine = engine(CaptureTarget::Selfie);

            for seen in face_seen {
                // A face may be detected without being aligned; that is
                // still a miss for the selfie target.
                let v = DetectionVerdict {
                    face_detected: seen,
                    face_aligned: false,
                    face_visible: false,
                    structured_object_detected: false,
                    frame_width: 640,
                    frame_height: 480,
                };
                let decision = engine.ingest(&v);
                prop_assert!(
                    !matches!(decision, Decision::Arm { .. }),
                    "assertion failed: !matches!(decision, Decision::Arm {{ .. }})"
                );
                prop_assert_eq!(engine.streak(), 0);
                prop_assert!(!engine.timer_armed());
            }
        }

        /// Any run of N >= required hits arms exactly once.
        #[test]
        fn prop_long_run_arms_exactly_once(n in 3u32..64) {
            let mut engine = engine(CaptureTarget::Selfie);
            let mut arms = 0;

            for _ in 0..n {
                if matches!(engine.ingest(&selfie_hit()), Decision::Arm { .. }) {
                    arms += 1;
                }
            }
            prop_assert_eq!(arms, 1);
        }
    }
}
