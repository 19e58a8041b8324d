//! Camera abstraction for preview frames and photo capture.
//!
//! This module provides a trait-based abstraction over the device
//! camera, allowing for both real hardware bindings and mock
//! implementations for testing. Permission prompts, the preview frame
//! stream, and the photo snapshot operation are all part of this seam.

use super::Frame;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    #[error("failed to read preview frame: {0}")]
    CaptureFailed(String),
    #[error("failed to take photo: {0}")]
    PhotoFailed(String),
    #[error("camera not initialized")]
    NotInitialized,
}

/// Which physical camera to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFacing {
    /// User-facing camera (selfies).
    Front,
    /// World-facing camera (documents).
    Back,
}

/// Result of an OS camera permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    /// Permission granted; the camera may be opened.
    Granted,
    /// Permission denied; the session must not open.
    Denied,
}

/// Parameters for a photo snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PhotoRequest {
    /// Whether to fire the flash.
    pub flash: bool,
    /// Whether to play the shutter sound.
    pub shutter_sound: bool,
}

impl PhotoRequest {
    /// The capture pipeline always shoots silent and flash-free.
    pub fn silent() -> Self {
        Self {
            flash: false,
            shutter_sound: false,
        }
    }
}

/// Trait for camera implementations.
///
/// This abstraction allows swapping between real camera hardware
/// and mock implementations for testing.
pub trait Camera {
    /// Prompts for camera permission (no-op if already granted).
    fn request_access(&mut self) -> Result<AccessStatus, CameraError>;

    /// Opens the camera with the given facing and starts the preview.
    fn open(&mut self, facing: CameraFacing) -> Result<(), CameraError>;

    /// Reads the next preview frame.
    fn capture_frame(&mut self) -> Result<Frame, CameraError>;

    /// Takes a full-resolution photo and returns the file it was
    /// written to. Asynchronous at the OS level; callers must not
    /// issue a second snapshot while one is in flight.
    fn take_photo(&mut self, request: &PhotoRequest) -> Result<PathBuf, CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Closes the camera and releases resources.
    fn close(&mut self);
}

/// Mock camera for testing that generates synthetic frames and
/// writes photo files into the temp directory.
#[derive(Debug)]
pub struct MockCamera {
    access: AccessStatus,
    facing: Option<CameraFacing>,
    width: u32,
    height: u32,
    sequence: u64,
    /// Fixed frame content override; synthetic pattern when `None`.
    frame_pixels: Option<Vec<u8>>,
    /// Bytes written for the next photo file.
    photo_bytes: Vec<u8>,
    /// Extension of the photo file the mock produces.
    photo_extension: String,
    /// When set, the next `take_photo` fails once.
    fail_next_photo: bool,
    photo_count: u64,
}

impl Default for MockCamera {
    fn default() -> Self {
        // Minimal valid JPEG header so MIME sniffing sees a real image.
        let photo_bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
        Self {
            access: AccessStatus::Granted,
            facing: None,
            width: 640,
            height: 480,
            sequence: 0,
            frame_pixels: None,
            photo_bytes,
            photo_extension: "jpg".to_string(),
            fail_next_photo: false,
            photo_count: 0,
        }
    }
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that reports permission as denied.
    pub fn denied() -> Self {
        Self {
            access: AccessStatus::Denied,
            ..Self::default()
        }
    }

    /// Creates a mock with custom preview dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Fixes the content of every preview frame.
    pub fn set_frame_pixels(&mut self, pixels: Vec<u8>) {
        self.frame_pixels = Some(pixels);
    }

    /// Sets the bytes and extension of the next photo file.
    pub fn set_photo(&mut self, bytes: Vec<u8>, extension: &str) {
        self.photo_bytes = bytes;
        self.photo_extension = extension.to_string();
    }

    /// Makes the next `take_photo` call fail once.
    pub fn fail_next_photo(&mut self) {
        self.fail_next_photo = true;
    }

    /// Number of photos taken so far.
    pub fn photo_count(&self) -> u64 {
        self.photo_count
    }

    /// Facing the camera was opened with, if open.
    pub fn facing(&self) -> Option<CameraFacing> {
        self.facing
    }
}

impl Camera for MockCamera {
    fn request_access(&mut self) -> Result<AccessStatus, CameraError> {
        Ok(self.access)
    }

    fn open(&mut self, facing: CameraFacing) -> Result<(), CameraError> {
        if self.access == AccessStatus::Denied {
            return Err(CameraError::OpenFailed("camera access denied".into()));
        }
        self.facing = Some(facing);
        self.sequence = 0;
        tracing::info!(?facing, "MockCamera opened");
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Frame, CameraError> {
        if self.facing.is_none() {
            return Err(CameraError::NotInitialized);
        }

        let pixel_count = (self.width * self.height) as usize;
        let pixels = match &self.frame_pixels {
            Some(p) => p.clone(),
            // Deterministic gradient pattern, only for frame plumbing tests
            None => (0..pixel_count).map(|i| (i % 256) as u8).collect(),
        };

        self.sequence += 1;
        Ok(Frame::new(pixels, self.width, self.height, self.sequence))
    }

    fn take_photo(&mut self, request: &PhotoRequest) -> Result<PathBuf, CameraError> {
        if self.facing.is_none() {
            return Err(CameraError::NotInitialized);
        }
        if self.fail_next_photo {
            self.fail_next_photo = false;
            return Err(CameraError::PhotoFailed("simulated hardware failure".into()));
        }

        self.photo_count += 1;
        let path = std::env::temp_dir().join(format!(
            "kyc_mock_{}_{}.{}",
            std::process::id(),
            self.photo_count,
            self.photo_extension
        ));
        std::fs::write(&path, &self.photo_bytes)
            .map_err(|e| CameraError::PhotoFailed(e.to_string()))?;

        tracing::debug!(
            path = %path.display(),
            flash = request.flash,
            shutter_sound = request.shutter_sound,
            "MockCamera photo written"
        );
        Ok(path)
    }

    fn is_open(&self) -> bool {
        self.facing.is_some()
    }

    fn close(&mut self) {
        self.facing = None;
        tracing::info!("MockCamera closed");
    }
}
