//! KYC Capture Pipeline Library
//!
//! A camera-driven identity verification capture flow: live frame
//! analysis (face geometry plus a document presence heuristic), a
//! streak-based auto-capture decision engine, a camera session
//! controller, and the four-step wizard that assembles the final
//! submission.
//!
//! # Architecture
//!
//! Each component depends only on the one below it:
//!
//! ```text
//! wizard → session → decision → analysis
//!             ↓
//!          capture (camera seam, photo encoding)
//! ```
//!
//! Control flows downward when a capture starts (the wizard opens a
//! session for one target); results bubble upward (per-frame verdicts
//! feed the decision engine, the captured photo lands back in the
//! wizard's draft).
//!
//! # Design Principles
//!
//! - **Hardware behind traits**: camera, face detector, and document
//!   heuristic are seams with mock implementations, so the state
//!   machines test deterministically.
//! - **One verdict entry point**: frame analysis hands results to the
//!   session through a single ingest call (or a bounded channel for
//!   split-path deployments); the frame path never blocks on control
//!   logic.
//! - **Explicit capture latch**: the auto-capture timer and the manual
//!   button funnel through one guarded operation, so at most one photo
//!   call is ever in flight per session.
//!
//! # Example
//!
//! ```no_run
//! use kyc_capture::{
//!     analysis::{EdgeSampleHeuristic, FrameAnalyzer, MockFaceDetector},
//!     capture::{CaptureTarget, DecisionConfig, DetectionConfig, MockCamera},
//!     session::{CaptureMode, CaptureSession},
//!     wizard::KycWizard,
//! };
//!
//! let analyzer = FrameAnalyzer::new(
//!     MockFaceDetector::empty(),
//!     EdgeSampleHeuristic::default(),
//!     DetectionConfig::default(),
//! );
//! let mut session = CaptureSession::new(MockCamera::new(), analyzer, DecisionConfig::default());
//!
//! let mut wizard = KycWizard::new();
//! wizard.set_full_name("Ama Mensah");
//! wizard.set_id_number("GHA-123456789");
//! wizard.advance().unwrap();
//!
//! // User taps "capture now" instead of waiting for auto-capture
//! wizard.begin_capture(CaptureTarget::Selfie).unwrap();
//! session.open(CaptureTarget::Selfie).unwrap();
//! if let Some(photo) = session.capture_now(CaptureMode::Manual).unwrap() {
//!     wizard.attach_photo(CaptureTarget::Selfie, photo);
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod capture;
pub mod decision;
pub mod session;
pub mod wizard;

// Re-export commonly used types at crate root
pub use analysis::{DetectionVerdict, DocumentPresenceHeuristic, FaceDetector, FrameAnalyzer};
pub use capture::{Camera, CapturedPhoto, CaptureTarget, FileConfig, Frame, MockCamera};
pub use decision::{Decision, DecisionEngine, Hint};
pub use session::{CaptureMode, CaptureSession, SessionError};
pub use wizard::{IdType, KycWizard, Step, SubmitOutcome, VerificationService, WizardError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
