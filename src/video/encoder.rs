//! JPEG encoder implementation
//!
//! Wraps turbojpeg (libjpeg-turbo, SIMD accelerated) for per-frame JPEG
//! compression of BGR24 input.

use bytes::Bytes;

use crate::error::{AppError, Result};
use crate::video::format::PixelFormat;
use crate::video::frame::{EncodedImage, Frame};

/// Default JPEG quality (1-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// JPEG encoder using turbojpeg
///
/// The compression path consumes BGR channel order; RGB frames must pass
/// through [`crate::video::convert::to_bgr`] first.
///
/// Note: turbojpeg compressors are not thread-safe. Each streaming
/// connection owns its own encoder instance.
pub struct JpegEncoder {
    quality: u8,
    compressor: turbojpeg::Compressor,
}

impl JpegEncoder {
    /// Create a new JPEG encoder with the given quality (1-100)
    pub fn new(quality: u8) -> Result<Self> {
        let mut compressor = turbojpeg::Compressor::new()
            .map_err(|e| AppError::Encode(format!("Failed to create turbojpeg compressor: {}", e)))?;

        compressor
            .set_quality(quality.clamp(1, 100) as i32)
            .map_err(|e| AppError::Encode(format!("Failed to set JPEG quality: {}", e)))?;

        Ok(Self { quality, compressor })
    }

    /// Get configured quality
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a BGR24 frame to JPEG
    ///
    /// Deterministic for identical input and quality. Fails with an encode
    /// error if the pixel format is not BGR24 or the buffer does not match
    /// the frame geometry.
    pub fn encode(&mut self, frame: &Frame) -> Result<EncodedImage> {
        if frame.format != PixelFormat::Bgr24 {
            return Err(AppError::Encode(format!(
                "JPEG path expects BGR24 input, got {}",
                frame.format
            )));
        }
        frame.check_geometry()?;

        let width = frame.width() as usize;
        let height = frame.height() as usize;

        let image = turbojpeg::Image {
            pixels: frame.data(),
            width,
            pitch: width * 3,
            height,
            format: turbojpeg::PixelFormat::BGR,
        };

        let jpeg_data = self
            .compressor
            .compress_to_vec(image)
            .map_err(|e| AppError::Encode(format!("JPEG compression failed: {}", e)))?;

        Ok(EncodedImage::new(
            Bytes::from(jpeg_data),
            frame.resolution,
            frame.sequence,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::convert;
    use crate::video::format::Resolution;

    fn solid_frame(format: PixelFormat, px: [u8; 3]) -> Frame {
        let resolution = Resolution::new(160, 120);
        let data: Vec<u8> = px
            .iter()
            .copied()
            .cycle()
            .take(format.frame_size(resolution))
            .collect();
        Frame::from_vec(data, resolution, format, 1)
    }

    #[test]
    fn test_encode_produces_valid_jpeg() {
        let mut encoder = JpegEncoder::new(DEFAULT_JPEG_QUALITY).unwrap();
        let frame = solid_frame(PixelFormat::Bgr24, [60, 200, 10]);
        let image = encoder.encode(&frame).unwrap();
        assert!(image.is_valid_jpeg());
        assert_eq!(image.resolution, frame.resolution);
        assert_eq!(image.sequence, frame.sequence);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let mut encoder = JpegEncoder::new(80).unwrap();
        let frame = solid_frame(PixelFormat::Bgr24, [5, 100, 250]);
        let a = encoder.encode(&frame).unwrap();
        let b = encoder.encode(&frame).unwrap();
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn test_rejects_rgb_input() {
        let mut encoder = JpegEncoder::new(85).unwrap();
        let frame = solid_frame(PixelFormat::Rgb24, [1, 2, 3]);
        assert!(matches!(encoder.encode(&frame), Err(AppError::Encode(_))));
    }

    #[test]
    fn test_rejects_malformed_buffer() {
        let mut encoder = JpegEncoder::new(85).unwrap();
        let frame = Frame::from_vec(
            vec![0u8; 16],
            Resolution::new(160, 120),
            PixelFormat::Bgr24,
            0,
        );
        assert!(matches!(encoder.encode(&frame), Err(AppError::Encode(_))));
    }

    #[test]
    fn test_converted_frame_round_trips() {
        // RGB capture -> channel swap -> JPEG -> decode must reproduce the
        // original color within lossy-compression tolerance.
        let rgb = solid_frame(PixelFormat::Rgb24, [200, 40, 90]);
        let bgr = convert::to_bgr(&rgb).unwrap();

        let mut encoder = JpegEncoder::new(90).unwrap();
        let image = encoder.encode(&bgr).unwrap();

        let mut decompressor = turbojpeg::Decompressor::new().unwrap();
        let header = decompressor.read_header(&image.data).unwrap();
        assert_eq!(header.width, 160);
        assert_eq!(header.height, 120);

        let mut pixels = vec![0u8; header.width * header.height * 3];
        decompressor
            .decompress(
                &image.data,
                turbojpeg::Image {
                    pixels: pixels.as_mut_slice(),
                    width: header.width,
                    pitch: header.width * 3,
                    height: header.height,
                    format: turbojpeg::PixelFormat::RGB,
                },
            )
            .unwrap();

        // A uniform frame compresses near-losslessly; allow a small delta.
        for px in pixels.chunks_exact(3) {
            assert!((px[0] as i16 - 200).abs() <= 3, "red drifted: {:?}", px);
            assert!((px[1] as i16 - 40).abs() <= 3, "green drifted: {:?}", px);
            assert!((px[2] as i16 - 90).abs() <= 3, "blue drifted: {:?}", px);
        }
    }
}
