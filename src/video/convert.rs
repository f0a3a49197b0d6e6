//! Pixel channel-order conversion
//!
//! The camera delivers RGB24 while the JPEG path consumes BGR24. Skipping
//! the swap inverts red/blue in every frame of the output stream.

use crate::error::Result;
use crate::video::format::PixelFormat;
use crate::video::frame::Frame;

/// Swap the first and third channel of every pixel in a 3-byte-per-pixel
/// buffer, in place.
fn swap_channels(data: &mut [u8]) {
    for px in data.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
}

/// Convert an RGB24 frame to BGR24.
///
/// A BGR24 input passes through untouched; the geometry of the buffer is
/// validated either way.
pub fn to_bgr(frame: &Frame) -> Result<Frame> {
    frame.check_geometry()?;
    match frame.format {
        PixelFormat::Bgr24 => Ok(frame.clone()),
        PixelFormat::Rgb24 => {
            let mut data = frame.data().to_vec();
            swap_channels(&mut data);
            Ok(Frame::from_vec(
                data,
                frame.resolution,
                PixelFormat::Bgr24,
                frame.sequence,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::video::format::Resolution;

    fn rgb_frame(pixels: &[[u8; 3]], width: u32, height: u32) -> Frame {
        let data: Vec<u8> = pixels.iter().flatten().copied().collect();
        Frame::from_vec(data, Resolution::new(width, height), PixelFormat::Rgb24, 7)
    }

    #[test]
    fn test_swap_inverts_red_and_blue() {
        // 160x120 is the smallest valid resolution; fill with one red pixel
        // pattern so the swap is observable at both ends of the buffer.
        let px = [200u8, 10, 30];
        let pixels = vec![px; 160 * 120];
        let frame = rgb_frame(&pixels, 160, 120);

        let bgr = to_bgr(&frame).unwrap();
        assert_eq!(bgr.format, PixelFormat::Bgr24);
        assert_eq!(bgr.sequence, frame.sequence);
        assert_eq!(&bgr.data()[..3], &[30, 10, 200]);
        assert_eq!(&bgr.data()[bgr.len() - 3..], &[30, 10, 200]);
    }

    #[test]
    fn test_double_swap_is_identity() {
        let mut data: Vec<u8> = (0..160u32 * 120 * 3).map(|i| (i % 251) as u8).collect();
        let original = data.clone();
        swap_channels(&mut data);
        swap_channels(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn test_bgr_passthrough() {
        let frame = Frame::from_vec(
            vec![1u8; 160 * 120 * 3],
            Resolution::new(160, 120),
            PixelFormat::Bgr24,
            3,
        );
        let out = to_bgr(&frame).unwrap();
        assert_eq!(out.data(), frame.data());
    }

    #[test]
    fn test_rejects_truncated_buffer() {
        let frame = Frame::from_vec(
            vec![0u8; 100],
            Resolution::new(160, 120),
            PixelFormat::Rgb24,
            0,
        );
        assert!(matches!(to_bgr(&frame), Err(AppError::Encode(_))));
    }
}
