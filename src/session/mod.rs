//! Capture Session Controller.
//!
//! Owns the camera lifecycle for one capture target: permission,
//! preview analysis, the decision engine, the auto-capture timer, and
//! the photo operation itself. Exactly one session is open at a time;
//! the wizard enforces that by holding a single camera target.
//!
//! Verdicts reach the controller through a single entry point,
//! [`CaptureSession::ingest_verdict`]. Deployments where frames arrive
//! on a dedicated processing path hand verdicts over via a bounded
//! `tokio::sync::mpsc` channel (`try_send`, drop on full) so the frame
//! path never blocks on the control loop; [`CaptureSession::run`]
//! consumes that channel.

use crate::analysis::{DetectionVerdict, DocumentPresenceHeuristic, FaceDetector, FrameAnalyzer};
use crate::capture::{
    AccessStatus, Camera, CameraError, CapturedPhoto, CaptureTarget, DecisionConfig, Frame,
    PhotoError, PhotoRequest,
};
use crate::decision::{Decision, DecisionEngine, Hint};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Errors that can occur during a capture session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The OS permission prompt was declined. Terminal for the
    /// session; the user must retry through an explicit action.
    #[error("camera permission denied")]
    PermissionDenied,
    /// A session is already open; close it before opening another.
    #[error("a capture session is already open")]
    AlreadyOpen,
    /// Camera hardware failure. The session stays open for retry.
    #[error(transparent)]
    Camera(#[from] CameraError),
    /// The captured file could not be encoded. The session stays open.
    #[error(transparent)]
    Photo(#[from] PhotoError),
}

/// How a capture was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Triggered by the decision engine's stability timer.
    Auto,
    /// Triggered by an explicit user tap, bypassing the streak.
    Manual,
}

/// Camera-owning controller for one capture target.
pub struct CaptureSession<C, D, H> {
    camera: C,
    analyzer: FrameAnalyzer<D, H>,
    engine: DecisionEngine,
    decision_config: DecisionConfig,
    target: Option<CaptureTarget>,
    hint: Option<Hint>,
    is_capturing: bool,
    deadline: Option<Instant>,
    /// Bumped on every close; captures that finish against a stale
    /// generation are discarded.
    generation: u64,
}

impl<C, D, H> CaptureSession<C, D, H>
where
    C: Camera,
    D: FaceDetector,
    H: DocumentPresenceHeuristic,
{
    /// Creates a controller over the given hardware seams. No camera
    /// resources are held until [`CaptureSession::open`].
    pub fn new(camera: C, analyzer: FrameAnalyzer<D, H>, decision_config: DecisionConfig) -> Self {
        let engine = DecisionEngine::new(CaptureTarget::Selfie, &decision_config);
        Self {
            camera,
            analyzer,
            engine,
            decision_config,
            target: None,
            hint: None,
            is_capturing: false,
            deadline: None,
            generation: 0,
        }
    }

    /// Opens the camera for the given target.
    ///
    /// Requests permission first; a denial surfaces as
    /// [`SessionError::PermissionDenied`] and nothing opens.
    pub fn open(&mut self, target: CaptureTarget) -> Result<(), SessionError> {
        if self.target.is_some() {
            return Err(SessionError::AlreadyOpen);
        }

        match self.camera.request_access()? {
            AccessStatus::Granted => {}
            AccessStatus::Denied => {
                tracing::warn!(%target, "Camera permission denied");
                return Err(SessionError::PermissionDenied);
            }
        }

        self.camera.open(target.facing())?;
        self.engine = DecisionEngine::new(target, &self.decision_config);
        self.analyzer.reset();
        self.target = Some(target);
        self.hint = Some(self.engine.initial_hint());
        self.is_capturing = false;
        self.deadline = None;

        tracing::info!(%target, "Capture session opened");
        Ok(())
    }

    /// Reads and analyzes one preview frame. Convenience wrapper for
    /// pull-based cameras; returns the new hint when it changed.
    pub fn process_frame(&mut self, frame: &Frame) -> Option<Hint> {
        let target = self.target?;
        let verdict = self.analyzer.analyze(frame, target)?;
        self.ingest_verdict(&verdict)
    }

    /// Single entry point for detection verdicts.
    ///
    /// Updates streak state, arms or cancels the auto-capture
    /// deadline, and returns the new hint when it changed.
    pub fn ingest_verdict(&mut self, verdict: &DetectionVerdict) -> Option<Hint> {
        self.target?;

        let new_hint = match self.engine.ingest(verdict) {
            Decision::Ignore => return None,
            Decision::Wait { hint, cancel_timer } => {
                if cancel_timer {
                    self.deadline = None;
                }
                hint
            }
            Decision::Arm { delay, hint } => {
                self.deadline = Some(Instant::now() + delay);
                hint
            }
        };

        if self.hint != Some(new_hint) {
            self.hint = Some(new_hint);
            tracing::debug!(hint = %new_hint, "Hint updated");
            Some(new_hint)
        } else {
            None
        }
    }

    /// Consumes a due deadline. True exactly when the auto-capture
    /// should proceed; stale or cancelled timers return false.
    pub fn fire_timer(&mut self) -> bool {
        if self.deadline.take().is_none() {
            return false;
        }
        self.engine.timer_elapsed()
    }

    /// Performs the photo operation.
    ///
    /// Re-entrancy guard: returns `Ok(None)` without touching the
    /// camera when a capture is already in flight or no session is
    /// open. The timer path and the manual path both funnel through
    /// here, so at most one photo operation runs per session.
    ///
    /// On success the session is closed and the encoded photo is
    /// returned for the wizard. On failure the session stays open so
    /// the user can immediately retry.
    pub fn capture_now(&mut self, mode: CaptureMode) -> Result<Option<CapturedPhoto>, SessionError> {
        let target = match self.target {
            Some(t) if !self.is_capturing && self.camera.is_open() => t,
            _ => {
                tracing::debug!(?mode, "Capture request ignored (busy or not open)");
                return Ok(None);
            }
        };

        self.is_capturing = true;
        self.deadline = None;
        // Also the manual-override path: streak resets so a retake
        // starts clean.
        self.engine.begin_capture();
        let generation = self.generation;

        tracing::info!(%target, ?mode, "Taking photo");
        let path = match self.camera.take_photo(&PhotoRequest::silent()) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(%target, error = %e, "Photo capture failed");
                self.is_capturing = false;
                self.engine.end_capture();
                return Err(e.into());
            }
        };

        // A close that raced the hardware capture invalidates the
        // result; the file is abandoned rather than applied.
        if self.generation != generation || self.target != Some(target) {
            tracing::warn!(%target, "Capture completed after close, discarding");
            return Ok(None);
        }

        let photo = match CapturedPhoto::from_file(path, target) {
            Ok(photo) => photo,
            Err(e) => {
                tracing::warn!(%target, error = %e, "Photo encoding failed");
                self.is_capturing = false;
                self.engine.end_capture();
                return Err(e.into());
            }
        };

        tracing::info!(
            %target,
            mime = photo.mime_type(),
            "Photo captured"
        );
        self.close();
        Ok(Some(photo))
    }

    /// Tears down the session: cancels the timer, clears flags and
    /// hint, releases the camera. Safe to call any number of times.
    pub fn close(&mut self) {
        self.deadline = None;
        self.is_capturing = false;
        self.hint = None;
        self.engine.reset();
        if self.camera.is_open() {
            self.camera.close();
        }
        if self.target.take().is_some() {
            self.generation += 1;
            tracing::info!("Capture session closed");
        }
    }

    /// Consumes verdicts from a bounded channel until a capture
    /// completes or the channel closes.
    ///
    /// The producer side belongs to the frame-processing path and
    /// must use `try_send`; dropped verdicts are harmless because
    /// they are transient and analysis is already throttled.
    pub async fn run(
        &mut self,
        mut verdicts: mpsc::Receiver<DetectionVerdict>,
    ) -> Result<Option<CapturedPhoto>, SessionError> {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                maybe = verdicts.recv() => {
                    match maybe {
                        Some(verdict) => {
                            self.ingest_verdict(&verdict);
                        }
                        None => {
                            tracing::debug!("Verdict stream ended without capture");
                            return Ok(None);
                        }
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    if self.fire_timer() {
                        if let Some(photo) = self.capture_now(CaptureMode::Auto)? {
                            return Ok(Some(photo));
                        }
                    }
                }
            }
        }
    }

    /// Whether a session is currently open.
    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    /// Whether a photo operation is in flight.
    pub fn is_capturing(&self) -> bool {
        self.is_capturing
    }

    /// The open session's target, if any.
    pub fn target(&self) -> Option<CaptureTarget> {
        self.target
    }

    /// Current user-facing hint.
    pub fn hint(&self) -> Option<Hint> {
        self.hint
    }

    /// Pending auto-capture deadline, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Read access to the camera seam (used by tests and the demo).
    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Forces the in-flight latch, to exercise the re-entrancy guard.
    #[cfg(test)]
    pub(crate) fn set_capturing_for_testing(&mut self, capturing: bool) {
        self.is_capturing = capturing;
    }
}
