//! Captured photo artifact and submission encoding.
//!
//! A photo leaves the camera as a device-local file; the wizard needs
//! a base64 data URL. The conversion happens once, at capture time,
//! and the resulting artifact is immutable.

use super::CaptureTarget;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while encoding a captured photo.
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("failed to read photo file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("photo file {0} is empty")]
    Empty(PathBuf),
}

/// One confirmed image artifact, ready for submission.
///
/// Immutable once built; retaking a photo for the same target replaces
/// the whole value.
#[derive(Clone)]
pub struct CapturedPhoto {
    source_path: PathBuf,
    encoded_payload: String,
    mime_type: String,
    suggested_file_name: String,
}

impl CapturedPhoto {
    /// Reads the photo file and builds the encoded artifact.
    ///
    /// The MIME type is sniffed from the file's magic bytes, falling
    /// back to the file extension.
    pub fn from_file(path: PathBuf, target: CaptureTarget) -> Result<Self, PhotoError> {
        let bytes = std::fs::read(&path).map_err(|source| PhotoError::Read {
            path: path.clone(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(PhotoError::Empty(path));
        }

        let mime_type = sniff_mime(&bytes, &path);
        let encoded_payload = format!("data:{};base64,{}", mime_type, BASE64.encode(&bytes));
        let suggested_file_name = format!(
            "{}_{}.{}",
            target.file_stem(),
            chrono::Utc::now().format("%Y%m%d%H%M%S"),
            extension_for(mime_type)
        );

        tracing::debug!(
            path = %path.display(),
            mime = mime_type,
            bytes = bytes.len(),
            "Photo encoded for submission"
        );

        Ok(Self {
            source_path: path,
            encoded_payload,
            mime_type: mime_type.to_string(),
            suggested_file_name,
        })
    }

    /// Device-local file the photo was read from.
    #[inline]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Base64 data URL ready for network submission.
    #[inline]
    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }

    /// MIME type of the encoded image.
    #[inline]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File name to present when uploading.
    #[inline]
    pub fn suggested_file_name(&self) -> &str {
        &self.suggested_file_name
    }
}

impl std::fmt::Debug for CapturedPhoto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedPhoto")
            .field("source_path", &self.source_path)
            .field("mime_type", &self.mime_type)
            .field("suggested_file_name", &self.suggested_file_name)
            .field("payload_len", &self.encoded_payload.len())
            .finish_non_exhaustive()
    }
}

/// Determines the MIME type from magic bytes, then the extension.
fn sniff_mime(bytes: &[u8], path: &Path) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        return "image/png";
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }

    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        // Camera output is JPEG on effectively every device
        _ => "image/jpeg",
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}
