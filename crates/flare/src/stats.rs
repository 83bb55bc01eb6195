//! # Frame Statistics

use std::fmt;
use std::time::Duration;

/// Target frame time for 60 FPS.
pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_666);

/// Frame time above which a frame is logged as slow.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(33);

/// Timing of a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// Seconds since the previous frame, as reported by the platform.
    pub delta_seconds: f64,
    /// Wall time spent inside the frame in microseconds.
    pub frame_us: u64,
}

/// Running totals over recorded frames.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of frame times.
    pub total_us_sum: u64,
    /// Fastest frame.
    pub min_frame_us: u64,
    /// Slowest frame.
    pub max_frame_us: u64,
    /// Frames that exceeded [`TARGET_FRAME_TIME`].
    pub frames_over_budget: u64,
}

impl FrameStatsAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
        }
    }

    /// Records a frame.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.frame_us;
        self.min_frame_us = self.min_frame_us.min(stats.frame_us);
        self.max_frame_us = self.max_frame_us.max(stats.frame_us);

        if u128::from(stats.frame_us) > TARGET_FRAME_TIME.as_micros() {
            self.frames_over_budget += 1;
        }
    }

    /// Average frame time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Average frames per second.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FrameStatsAccumulator {
    #[allow(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Frame Statistics ===")?;
        writeln!(f, "Frames: {}", self.frames_recorded)?;
        if self.frames_recorded == 0 {
            return Ok(());
        }
        writeln!(
            f,
            "Average: {:.3} ms ({:.1} FPS)",
            self.avg_frame_ms(),
            self.avg_fps()
        )?;
        writeln!(
            f,
            "Min/Max: {:.3} / {:.3} ms",
            self.min_frame_us as f64 / 1000.0,
            self.max_frame_us as f64 / 1000.0
        )?;
        write!(
            f,
            "Over budget: {} ({:.1}%)",
            self.frames_over_budget,
            self.over_budget_ratio() * 100.0
        )
    }
}
