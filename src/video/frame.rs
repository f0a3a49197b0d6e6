//! Video frame data structures

use bytes::Bytes;

use super::format::{PixelFormat, Resolution};
use crate::error::{AppError, Result};

/// A raw video frame with metadata
///
/// Produced by a [`crate::video::source::FrameSource`] and consumed within a
/// single streaming iteration; frames are never cached across connections.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data
    data: Bytes,
    /// Frame resolution
    pub resolution: Resolution,
    /// Pixel format
    pub format: PixelFormat,
    /// Frame sequence number
    pub sequence: u64,
}

impl Frame {
    /// Create a new frame
    pub fn new(data: Bytes, resolution: Resolution, format: PixelFormat, sequence: u64) -> Self {
        Self {
            data,
            resolution,
            format,
            sequence,
        }
    }

    /// Create a frame from a Vec<u8>
    pub fn from_vec(
        data: Vec<u8>,
        resolution: Resolution,
        format: PixelFormat,
        sequence: u64,
    ) -> Self {
        Self::new(Bytes::from(data), resolution, format, sequence)
    }

    /// Get frame data as bytes slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get data length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if frame is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get width
    pub fn width(&self) -> u32 {
        self.resolution.width
    }

    /// Get height
    pub fn height(&self) -> u32 {
        self.resolution.height
    }

    /// Validate that the buffer length matches the frame geometry
    pub fn check_geometry(&self) -> Result<()> {
        let expected = self.format.frame_size(self.resolution);
        if self.data.len() != expected {
            return Err(AppError::Encode(format!(
                "{} frame buffer is {} bytes, expected {} for {}",
                self.format,
                self.data.len(),
                expected,
                self.resolution
            )));
        }
        Ok(())
    }
}

/// An encoded (JPEG) image ready for multipart framing
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// JPEG data
    pub data: Bytes,
    /// Source resolution
    pub resolution: Resolution,
    /// Frame sequence number
    pub sequence: u64,
}

impl EncodedImage {
    pub fn new(data: Bytes, resolution: Resolution, sequence: u64) -> Self {
        Self {
            data,
            resolution,
            sequence,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Validate JPEG markers (SOI at start, EOI at end)
    pub fn is_valid_jpeg(&self) -> bool {
        if self.data.len() < 4 {
            return false;
        }
        let start_marker = ((self.data[0] as u16) << 8) | self.data[1] as u16;
        if start_marker != 0xFFD8 {
            return false;
        }
        let end = self.data.len();
        let end_marker = ((self.data[end - 2] as u16) << 8) | self.data[end - 1] as u16;
        matches!(end_marker, 0xFFD9 | 0xD900 | 0x0000)
    }
}
