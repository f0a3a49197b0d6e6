//! Video capture and encoding module
//!
//! This module provides V4L2 frame acquisition, channel-order conversion,
//! and JPEG encoding.

pub mod convert;
pub mod encoder;
pub mod format;
pub mod frame;
pub mod source;

pub use encoder::JpegEncoder;
pub use format::{PixelFormat, Resolution};
pub use frame::{EncodedImage, Frame};
pub use source::{FrameSource, V4lCamera};
