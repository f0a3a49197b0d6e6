//! Application configuration
//!
//! Loaded once at startup from an optional TOML file, with CLI overrides
//! applied on top. Invalid configuration aborts the process.

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::video::format::Resolution;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Web server settings
    pub web: WebConfig,
    /// Camera capture settings
    pub camera: CameraConfig,
    /// Streaming settings
    pub stream: StreamConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web: WebConfig::default(),
            camera: CameraConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address
    pub bind_address: String,
    /// HTTP port
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Camera capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Video device path
    pub device: PathBuf,
    /// Resolution width
    pub width: u32,
    /// Resolution height
    pub height: u32,
    /// Named capture controls applied at startup (e.g. disabling on-sensor
    /// noise reduction)
    pub controls: BTreeMap<String, i64>,
    /// Frame duration target in microseconds (min, max)
    pub frame_duration_limits: Option<(u64, u64)>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let mut controls = BTreeMap::new();
        controls.insert("NoiseReductionMode".to_string(), 0);
        Self {
            device: PathBuf::from("/dev/video0"),
            width: 640,
            height: 480,
            controls,
            frame_duration_limits: Some((2000, 2000)),
        }
    }
}

impl CameraConfig {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

/// Streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { jpeg_quality: 85 }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&raw)
            .map_err(|e| AppError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.web.bind_address.parse::<IpAddr>().is_err() {
            return Err(AppError::Config(format!(
                "Invalid bind address: {}",
                self.web.bind_address
            )));
        }

        if !self.camera.resolution().is_valid() {
            return Err(AppError::Config(format!(
                "Invalid resolution: {}x{}",
                self.camera.width, self.camera.height
            )));
        }

        if let Some((min, max)) = self.camera.frame_duration_limits {
            if min == 0 || min > max {
                return Err(AppError::Config(format!(
                    "Invalid frame duration limits: ({}, {})",
                    min, max
                )));
            }
        }

        if !(1..=100).contains(&self.stream.jpeg_quality) {
            return Err(AppError::Config(format!(
                "JPEG quality must be 1-100, got {}",
                self.stream.jpeg_quality
            )));
        }

        Ok(())
    }

    /// Socket address the server listens on
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .web
            .bind_address
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid bind address: {}", self.web.bind_address)))?;
        Ok(SocketAddr::new(ip, self.web.port))
    }
}
