use std::time::{Duration, Instant};

/// Frames per throughput report.
const REPORT_INTERVAL: u64 = 300;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Throughput over the last completed report window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameStats {
    pub frames: u64,
    pub elapsed: Duration,
}

impl FrameStats {
    /// Average frames per second over the window.
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }

    /// Average frame time in milliseconds.
    pub fn mean_frame_ms(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.elapsed.as_secs_f64() * 1000.0 / self.frames as f64
    }
}

/// Per-window frame clock.
///
/// Delta time is clamped so a stall (debugger, minimized window) does not
/// show up as one huge step. Every [`REPORT_INTERVAL`] ticks the raw
/// (unclamped) throughput is logged at debug level.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,

    window_start: Instant,
    window_frames: u64,
    last_stats: Option<FrameStats>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            last: now,
            frame_index: 0,
            dt_min,
            dt_max,
            window_start: now,
            window_frames: 0,
            last_stats: None,
        }
    }

    /// Resets the delta baseline and the current report window.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last = now;
        self.window_start = now;
        self.window_frames = 0;
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);

        self.window_frames += 1;
        if self.window_frames == REPORT_INTERVAL {
            let stats = FrameStats {
                frames: self.window_frames,
                elapsed: now.saturating_duration_since(self.window_start),
            };
            log::debug!(
                "{:.1} fps ({:.2} ms/frame) over {} frames",
                stats.fps(),
                stats.mean_frame_ms(),
                stats.frames
            );
            self.last_stats = Some(stats);
            self.window_start = now;
            self.window_frames = 0;
        }

        ft
    }

    /// Stats from the most recent completed report window.
    pub fn last_stats(&self) -> Option<FrameStats> {
        self.last_stats
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_clamped() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(10));
        let start = clock.last;

        let ft = clock.tick_at(start);
        assert!((ft.dt - 0.001).abs() < 1e-6);

        let ft = clock.tick_at(start + Duration::from_secs(5));
        assert!((ft.dt - 0.010).abs() < 1e-6);
        assert_eq!(ft.frame_index, 1);
    }

    #[test]
    fn stats_reported_once_per_window() {
        let mut clock = FrameClock::new();
        let start = clock.window_start;
        for i in 1..REPORT_INTERVAL {
            clock.tick_at(start + Duration::from_millis(10 * i));
        }
        assert!(clock.last_stats().is_none());

        clock.tick_at(start + Duration::from_millis(10 * REPORT_INTERVAL));
        let stats = clock.last_stats().unwrap();
        assert_eq!(stats.frames, REPORT_INTERVAL);
        assert!((stats.fps() - 100.0).abs() < 1e-6);
        assert!((stats.mean_frame_ms() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = FrameStats {
            frames: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(stats.fps(), 0.0);
        assert_eq!(stats.mean_frame_ms(), 0.0);
    }
}
