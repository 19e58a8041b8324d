//! Camera input, capture targets, and photo artifacts.
//!
//! This module provides the hardware seam of the pipeline: the camera
//! trait (preview frames, permission, photo snapshots), the capture
//! targets that parameterize a session, tuning configuration, and the
//! encoded photo artifact handed up to the wizard.

mod camera;
mod config;
mod frame;
mod photo;
mod target;

pub use camera::{AccessStatus, Camera, CameraError, CameraFacing, MockCamera, PhotoRequest};
pub use config::{ConfigError, DecisionConfig, DetectionConfig, FileConfig, HeuristicConfig};
pub use frame::Frame;
pub use photo::{CapturedPhoto, PhotoError};
pub use target::CaptureTarget;
