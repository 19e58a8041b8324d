//! Frame type representing one video frame handed to analysis.

use std::time::Instant;

/// A single video frame from the camera preview stream.
///
/// Pixel data is 8-bit luminance (one byte per pixel). The capture
/// pipeline only ever samples brightness, so color planes are dropped
/// at the camera boundary.
#[derive(Clone)]
pub struct Frame {
    /// Luminance data, row-major, one byte per pixel.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Arrival timestamp, used for analysis throttling.
    timestamp: Instant,
    /// Monotonic sequence number within the camera session.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Returns a reference to the raw luminance data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the arrival timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Returns the luminance at (x, y), clamping out-of-range
    /// coordinates to the frame edge.
    #[inline]
    pub fn luma_at(&self, x: u32, y: u32) -> u8 {
        let x = x.min(self.width.saturating_sub(1)) as usize;
        let y = y.min(self.height.saturating_sub(1)) as usize;
        self.pixels[y * self.width as usize + x]
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}
