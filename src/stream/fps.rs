//! Frames-per-second accounting
//!
//! One tracker instance is shared by the streaming path (writer) and the
//! telemetry routes (readers). The counter lock is held only for the brief
//! window update, never across frame acquisition.

use std::time::Instant;

use parking_lot::{Mutex, RwLock};

/// Minimum measurement window in seconds
const WINDOW_SECS: f64 = 1.0;

struct FpsWindow {
    started: Instant,
    frames: u32,
}

/// Windowed FPS tracker
///
/// Publishes frames-per-second once per completed window of at least one
/// second. Before the first window closes the value is 0.0; within a
/// window the previous value holds.
pub struct FpsTracker {
    window: Mutex<FpsWindow>,
    current: RwLock<f64>,
}

impl FpsTracker {
    pub fn new() -> Self {
        Self {
            window: Mutex::new(FpsWindow {
                started: Instant::now(),
                frames: 0,
            }),
            current: RwLock::new(0.0),
        }
    }

    /// Record one processed frame
    pub fn record_frame(&self) {
        self.record_at(Instant::now());
    }

    /// Record one processed frame at an explicit instant
    ///
    /// When the window reaches a full second, publishes `frames / elapsed`
    /// and starts a new window at `now`. Within a window the published
    /// value holds unchanged.
    fn record_at(&self, now: Instant) {
        let mut window = self.window.lock();
        window.frames += 1;

        let elapsed = now.duration_since(window.started).as_secs_f64();
        if elapsed >= WINDOW_SECS {
            *self.current.write() = window.frames as f64 / elapsed;
            window.frames = 0;
            window.started = now;
        }
    }

    /// Last published FPS value
    pub fn current_fps(&self) -> f64 {
        *self.current.read()
    }

    /// Last published FPS value, fixed to two decimals
    pub fn current_fps_text(&self) -> String {
        format!("{:.2}", self.current_fps())
    }
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_zero_before_first_window_closes() {
        let tracker = FpsTracker::new();
        assert_eq!(tracker.current_fps(), 0.0);
        assert_eq!(tracker.current_fps_text(), "0.00");

        // A burst of frames inside the first second publishes nothing.
        for _ in 0..50 {
            tracker.record_frame();
        }
        assert_eq!(tracker.current_fps(), 0.0);
    }

    #[test]
    fn test_window_publishes_frames_over_elapsed() {
        let tracker = FpsTracker::new();
        let start = tracker.window.lock().started;

        // 30 frames evenly spaced over 1.2 seconds -> 25.0 fps.
        for i in 1..=30u32 {
            let at = start + Duration::from_micros(i as u64 * 40_000);
            tracker.record_at(at);
        }
        assert!((tracker.current_fps() - 25.0).abs() < 1e-6);
        assert_eq!(tracker.current_fps_text(), "25.00");
    }

    #[test]
    fn test_value_holds_between_windows() {
        let tracker = FpsTracker::new();
        let start = tracker.window.lock().started;

        for i in 1..=10u32 {
            tracker.record_at(start + Duration::from_millis(i as u64 * 100));
        }
        let published = tracker.current_fps();
        assert!(published > 0.0);

        // Mid-window frames leave the snapshot untouched.
        tracker.record_at(start + Duration::from_millis(1100));
        assert_eq!(tracker.current_fps(), published);
    }

    #[test]
    fn test_windows_advance_monotonically() {
        let tracker = FpsTracker::new();
        let start = tracker.window.lock().started;

        for i in 1..=20u32 {
            tracker.record_at(start + Duration::from_millis(i as u64 * 100));
        }
        let second_window_start = tracker.window.lock().started;
        assert!(second_window_start > start);

        for i in 1..=5u32 {
            tracker.record_at(second_window_start + Duration::from_millis(i as u64 * 250));
        }
        assert!(tracker.window.lock().started > second_window_start);
    }

    #[test]
    fn test_never_negative() {
        let tracker = FpsTracker::new();
        let start = tracker.window.lock().started;
        for i in 1..=100u32 {
            tracker.record_at(start + Duration::from_millis(i as u64 * 37));
            assert!(tracker.current_fps() >= 0.0);
        }
    }
}
