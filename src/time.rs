//! Frame clock and the stats display cadence.
//!
//! The simulation advances by ticks, one per redraw, so nothing here feeds
//! into particle physics. [`Time`] counts frames and estimates FPS for the
//! window title; [`StatsTicker`] decides when the title is due for a refresh.

use std::time::{Duration, Instant};

/// Frame counter with a periodically refreshed FPS estimate.
#[derive(Debug)]
pub struct Time {
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Time {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// A clock whose first frame is measured from `now`.
    pub fn starting_at(now: Instant) -> Self {
        Self {
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Record a frame at the current instant.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Record a frame at `now`.
    pub fn update_at(&mut self, now: Instant) {
        self.frame_count += 1;

        let window = now.saturating_duration_since(self.fps_update_time);
        if window >= self.fps_update_interval {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f32 / window.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }
    }

    /// Frames recorded so far, for the FPS estimate. The scene spin keeps its
    /// own tick count in the renderer.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// FPS averaged over the last half second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// Fires at most once per interval. Drives the particle-count display.
#[derive(Debug, Clone)]
pub struct StatsTicker {
    interval: Duration,
    last: Option<Instant>,
}

impl StatsTicker {
    /// Refresh cadence of the stats display.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// True on the first call and then whenever `interval` has passed since
    /// the last time it returned true.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

impl Default for StatsTicker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.fps(), 0.0);
    }

    #[test]
    fn test_time_counts_frames() {
        let t0 = Instant::now();
        let mut time = Time::starting_at(t0);
        time.update_at(t0 + Duration::from_millis(16));
        time.update_at(t0 + Duration::from_millis(32));
        assert_eq!(time.frame(), 2);
        assert_eq!(time.fps(), 0.0);
    }

    #[test]
    fn test_fps_estimate() {
        let t0 = Instant::now();
        let mut time = Time::starting_at(t0);
        // 60 frames over one second
        for i in 1..=60 {
            time.update_at(t0 + Duration::from_micros(i * 16_667));
        }
        assert!((time.fps() - 60.0).abs() < 1.5, "fps {}", time.fps());
    }

    #[test]
    fn test_stats_ticker_cadence() {
        let t0 = Instant::now();
        let mut ticker = StatsTicker::default();
        assert!(ticker.due(t0));
        assert!(!ticker.due(t0 + Duration::from_millis(50)));
        assert!(!ticker.due(t0 + Duration::from_millis(99)));
        assert!(ticker.due(t0 + Duration::from_millis(100)));
        assert!(!ticker.due(t0 + Duration::from_millis(150)));
        assert!(ticker.due(t0 + Duration::from_millis(230)));
    }
}
