//! Frame acquisition
//!
//! [`FrameSource`] is the seam between the streaming pipeline and the camera
//! driver. The production implementation, [`V4lCamera`], is configured once
//! at startup and shared by every connection; acquisition is serialized by a
//! mutex over the capture stream.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{info, warn};
use v4l::buffer::Type;
use v4l::control::{Control, Value};
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::capture::parameters::Parameters;
use v4l::video::Capture;
use v4l::{Device, Format};

use crate::config::CameraConfig;
use crate::error::{AppError, Result};
use crate::video::format::{PixelFormat, Resolution};
use crate::video::frame::Frame;

/// Number of memory-mapped capture buffers
const BUFFER_COUNT: u32 = 4;
/// Minimum valid frame size (bytes)
const MIN_FRAME_SIZE: usize = 128;

/// A blocking source of raw frames
pub trait FrameSource: Send + Sync {
    /// Block until the next frame is ready
    ///
    /// Each call advances device state by exactly one frame. A driver fault
    /// surfaces as a device error; the caller decides stream policy.
    fn acquire(&self) -> Result<Frame>;

    /// Negotiated capture resolution
    fn resolution(&self) -> Resolution;

    /// Negotiated pixel format
    fn format(&self) -> PixelFormat;
}

/// V4L2-backed camera source
pub struct V4lCamera {
    stream: Mutex<MmapStream<'static>>,
    resolution: Resolution,
    format: PixelFormat,
    sequence: AtomicU64,
}

impl V4lCamera {
    /// Open and configure the capture device
    ///
    /// Applies resolution, pixel format, frame-interval target and named
    /// V4L2 controls from the configuration. Any device-level failure here
    /// is fatal to startup.
    pub fn open(config: &CameraConfig) -> Result<Self> {
        let device = Device::with_path(&config.device).map_err(|e| {
            AppError::Device(format!(
                "Failed to open device {}: {}",
                config.device.display(),
                e
            ))
        })?;

        let requested = Resolution::new(config.width, config.height);
        let wanted = Format::new(requested.width, requested.height, PixelFormat::Rgb24.to_fourcc());
        let actual = Capture::set_format(&device, &wanted)
            .map_err(|e| AppError::Device(format!("Failed to set capture format: {}", e)))?;

        let format = PixelFormat::from_fourcc(actual.fourcc).ok_or_else(|| {
            AppError::Device(format!(
                "Device negotiated unsupported pixel format {}",
                actual.fourcc
            ))
        })?;
        let resolution = Resolution::new(actual.width, actual.height);
        if resolution != requested {
            warn!(
                "Device adjusted resolution: requested {}, got {}",
                requested, resolution
            );
        }

        if let Some((min_us, _max_us)) = config.frame_duration_limits {
            // The V4L2 interface takes a frame interval; derive the target
            // rate from the lower duration bound.
            let fps = (1_000_000 / min_us.max(1)).max(1) as u32;
            match Capture::set_params(&device, &Parameters::with_fps(fps)) {
                Ok(_) => info!("Capture frame interval set ({} fps target)", fps),
                Err(e) => warn!("Failed to set frame interval: {}", e),
            }
        }

        apply_controls(&device, config);

        // The device must outlive the memory-mapped stream, and the camera
        // lives for the whole process; leak it to 'static.
        let static_dev: &'static Device = Box::leak(Box::new(device));
        let stream = MmapStream::with_buffers(static_dev, Type::VideoCapture, BUFFER_COUNT)
            .map_err(|e| AppError::Device(format!("Failed to start capture stream: {}", e)))?;

        info!(
            "Capture started on {} at {} {}",
            config.device.display(),
            resolution,
            format
        );

        Ok(Self {
            stream: Mutex::new(stream),
            resolution,
            format,
            sequence: AtomicU64::new(0),
        })
    }
}

impl FrameSource for V4lCamera {
    fn acquire(&self) -> Result<Frame> {
        let mut stream = self.stream.lock();
        loop {
            let (data, meta) = stream
                .next()
                .map_err(|e| AppError::Device(format!("Frame acquisition failed: {}", e)))?;

            let bytes_used = meta.bytesused as usize;
            let len = if bytes_used > 0 {
                bytes_used.min(data.len())
            } else {
                data.len()
            };

            // Some drivers hand back a short garbage buffer on the first
            // dequeues after stream-on.
            if len < MIN_FRAME_SIZE {
                continue;
            }

            let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
            return Ok(Frame::new(
                Bytes::copy_from_slice(&data[..len]),
                self.resolution,
                self.format,
                sequence,
            ));
        }
    }

    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn format(&self) -> PixelFormat {
        self.format
    }
}

/// Apply named V4L2 controls from the configuration
///
/// Names are matched case-insensitively against the driver's control list.
/// Controls the driver does not expose, or rejects, are skipped with a
/// warning; startup proceeds.
fn apply_controls(device: &Device, config: &CameraConfig) {
    if config.controls.is_empty() {
        return;
    }

    let descriptions = match device.query_controls() {
        Ok(descs) => descs,
        Err(e) => {
            warn!("Failed to enumerate device controls: {}", e);
            return;
        }
    };

    for (name, value) in &config.controls {
        let Some(desc) = descriptions
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
        else {
            warn!("Control '{}' not exposed by driver, skipping", name);
            continue;
        };

        match device.set_control(Control {
            id: desc.id,
            value: Value::Integer(*value),
        }) {
            Ok(()) => info!("Control '{}' set to {}", desc.name, value),
            Err(e) => warn!("Driver rejected control '{}' = {}: {}", desc.name, value, e),
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! Scripted frame source for pipeline tests

    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::*;

    /// Replays a fixed script of acquisition outcomes
    pub struct ScriptedSource {
        script: Mutex<VecDeque<Result<Frame>>>,
        resolution: Resolution,
    }

    impl ScriptedSource {
        pub fn new(script: Vec<Result<Frame>>, resolution: Resolution) -> Self {
            Self {
                script: Mutex::new(script.into_iter().collect()),
                resolution,
            }
        }

        /// A source yielding `count` solid RGB frames, then an optional
        /// device fault, then exhaustion faults forever.
        pub fn with_frames(count: usize, then_fail: bool) -> Self {
            let resolution = Resolution::new(160, 120);
            let mut script: Vec<Result<Frame>> = (0..count)
                .map(|i| {
                    Ok(Frame::from_vec(
                        vec![(i % 256) as u8; PixelFormat::Rgb24.frame_size(resolution)],
                        resolution,
                        PixelFormat::Rgb24,
                        i as u64,
                    ))
                })
                .collect();
            if then_fail {
                script.push(Err(AppError::Device("simulated driver fault".into())));
            }
            Self::new(script, resolution)
        }

        pub fn remaining(&self) -> usize {
            self.script.lock().len()
        }
    }

    impl FrameSource for ScriptedSource {
        fn acquire(&self) -> Result<Frame> {
            self.script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::Device("script exhausted".into())))
        }

        fn resolution(&self) -> Resolution {
            self.resolution
        }

        fn format(&self) -> PixelFormat {
            PixelFormat::Rgb24
        }
    }
}
