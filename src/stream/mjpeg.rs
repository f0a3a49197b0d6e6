//! MJPEG multipart framing and per-connection stream generation

use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::Result;
use crate::stream::fps::FpsTracker;
use crate::video::convert;
use crate::video::encoder::JpegEncoder;
use crate::video::source::FrameSource;

/// Multipart boundary token
pub const BOUNDARY: &str = "frame";

/// Content type of the streaming response
pub const CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

/// Frame one JPEG image as a multipart part
///
/// Wire format (CRLF line endings; no closing boundary, the stream never
/// ends under normal operation):
///
/// ```text
/// --frame\r\n
/// Content-Type: image/jpeg\r\n
/// \r\n
/// <raw JPEG bytes>\r\n
/// ```
pub fn mjpeg_chunk(jpeg_data: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(64 + jpeg_data.len());

    buf.put_slice(b"--frame\r\n");
    buf.put_slice(b"Content-Type: image/jpeg\r\n");
    buf.put_slice(b"\r\n");
    buf.put_slice(jpeg_data);
    buf.put_slice(b"\r\n");

    buf.freeze()
}

/// Per-connection MJPEG chunk generator
///
/// Each HTTP client owns one generator reading from the shared camera and
/// reporting to the shared FPS tracker; the JPEG encoder is per-connection
/// because turbojpeg compressors are not thread-safe.
///
/// The iterator is logically infinite. It ends only when the consumer stops
/// pulling (client disconnect) or a device/encode error occurs, which fuses
/// the iterator after yielding the error once. No partial chunk is ever
/// emitted.
pub struct StreamGenerator {
    source: Arc<dyn FrameSource>,
    encoder: JpegEncoder,
    tracker: Arc<FpsTracker>,
    finished: bool,
}

impl StreamGenerator {
    pub fn new(
        source: Arc<dyn FrameSource>,
        tracker: Arc<FpsTracker>,
        jpeg_quality: u8,
    ) -> Result<Self> {
        Ok(Self {
            source,
            encoder: JpegEncoder::new(jpeg_quality)?,
            tracker,
            finished: false,
        })
    }

    /// One pipeline iteration: acquire, convert, encode, account, frame
    fn next_chunk(&mut self) -> Result<Bytes> {
        let frame = self.source.acquire()?;
        let bgr = convert::to_bgr(&frame)?;
        let image = self.encoder.encode(&bgr)?;
        self.tracker.record_frame();
        Ok(mjpeg_chunk(&image.data))
    }
}

impl Iterator for StreamGenerator {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_chunk() {
            Ok(chunk) => Some(Ok(chunk)),
            Err(e) => {
                // Errors are fatal to this connection's stream; the shared
                // camera and tracker stay usable by other connections.
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
