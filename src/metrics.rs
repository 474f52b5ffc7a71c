//! Render metrics: cheap counters, snapshot on demand.
//!
//! The compositor and the frame scheduler each own an accumulator and hand
//! out plain `Copy` snapshots. The expensive parts (per-frame timing,
//! per-draw accounting) only run when profiling is enabled on the owner;
//! with profiling off, the scheduler maintains just FPS and frame count.

use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Point-in-time view of the compositor's counters.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CompositorMetrics {
    /// Frames fully rendered (diffed, written, flushed, swapped).
    pub frames: u64,
    /// `Drawable::draw` invocations.
    pub draw_calls: u64,
    /// Drawables skipped by viewport culling.
    pub culled: u64,
    /// Merged dirty regions observed across layers.
    pub dirty_regions: u64,
    /// Cells emitted through the writer pipeline.
    pub cells_emitted: u64,
    /// Bytes handed to the sink.
    pub bytes_emitted: u64,
    /// Current size of one cell buffer, in bytes.
    pub buffer_bytes: usize,
    /// Duration of the last rendered frame in milliseconds (profiling only).
    pub last_frame_ms: f64,
}

/// Point-in-time view of the scheduler's counters.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SchedulerMetrics {
    /// Callback rounds per second over the sliding window.
    pub fps: f64,
    /// Total frames ticked.
    pub frame_count: u64,
    /// Ticks that arrived later than twice the target period.
    pub dropped_frames: u64,
    /// Mean callback-round duration in milliseconds (profiling only).
    pub avg_frame_ms: f64,
}

// ---------------------------------------------------------------------------
// FpsWindow
// ---------------------------------------------------------------------------

/// Sliding-window frame counter for FPS estimation.
#[derive(Debug)]
pub(crate) struct FpsWindow {
    samples: VecDeque<u64>,
    window_ms: u64,
}

impl FpsWindow {
    /// A window of `window_ms` milliseconds.
    pub(crate) fn new(window_ms: u64) -> Self {
        Self {
            samples: VecDeque::new(),
            window_ms,
        }
    }

    /// Record a frame at `now_ms`, evicting samples that fell out of the
    /// window.
    pub(crate) fn record(&mut self, now_ms: u64) {
        self.samples.push_back(now_ms);
        let cutoff = now_ms.saturating_sub(self.window_ms);
        while matches!(self.samples.front(), Some(&t) if t < cutoff) {
            self.samples.pop_front();
        }
    }

    /// Frames per second over the window ending at `now_ms`.
    pub(crate) fn fps(&self, now_ms: u64) -> f64 {
        let cutoff = now_ms.saturating_sub(self.window_ms);
        let count = self.samples.iter().filter(|&&t| t >= cutoff).count();
        count as f64 * 1000.0 / self.window_ms as f64
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshots_are_zero() {
        assert_eq!(CompositorMetrics::default().frames, 0);
        assert_eq!(SchedulerMetrics::default().fps, 0.0);
    }

    #[test]
    fn fps_counts_samples_in_window() {
        let mut w = FpsWindow::new(2000);
        // 60 frames over one second.
        for i in 0..60 {
            w.record(i * 16);
        }
        let fps = w.fps(60 * 16);
        // 60 frames in a 2-second window reads as 30/s.
        assert!((fps - 30.0).abs() < 1.0, "fps = {fps}");
    }

    #[test]
    fn fps_evicts_old_samples() {
        let mut w = FpsWindow::new(1000);
        w.record(0);
        w.record(10);
        w.record(2000);
        // Only the sample at 2000 remains in [1000, 2000].
        assert!((w.fps(2000) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_window_is_zero_fps() {
        let w = FpsWindow::new(2000);
        assert_eq!(w.fps(5000), 0.0);
    }
}
