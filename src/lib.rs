//! picam-stream - Lightweight MJPEG camera streaming server
//!
//! This crate exposes a live V4L2 camera feed over HTTP as an MJPEG
//! multipart stream, with FPS telemetry endpoints.

pub mod config;
pub mod error;
pub mod state;
pub mod stream;
pub mod video;
pub mod web;

pub use error::{AppError, Result};
