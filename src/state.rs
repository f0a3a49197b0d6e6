use std::sync::Arc;

use crate::config::AppConfig;
use crate::stream::FpsTracker;
use crate::video::source::FrameSource;

/// Application-wide state shared across handlers
///
/// The camera is the single shared capture resource (acquisition is
/// serialized inside it); the FPS tracker is written by every streaming
/// connection and read by the telemetry routes.
pub struct AppState {
    /// Shared frame source
    pub camera: Arc<dyn FrameSource>,
    /// Shared FPS tracker
    pub tracker: Arc<FpsTracker>,
    /// Startup configuration (immutable after validation)
    pub config: AppConfig,
}

impl AppState {
    /// Create new application state
    pub fn new(
        camera: Arc<dyn FrameSource>,
        tracker: Arc<FpsTracker>,
        config: AppConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            camera,
            tracker,
            config,
        })
    }
}
