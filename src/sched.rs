//! Fixed-FPS frame scheduling.
//!
//! The scheduler is a cooperative tick loop: [`FrameScheduler::tick`] does
//! one bounded unit of work against an injected [`Clock`], which makes every
//! timing rule testable without sleeping. [`FrameScheduler::run`] is the
//! convenience driver that sleeps to each frame boundary on tokio time.
//!
//! Drift stays bounded because the frame timestamp advances by whole
//! periods (`last = now - delta % period`) instead of snapping to `now`.
//! A tick that arrives more than two periods late counts one dropped frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::metrics::{FpsWindow, SchedulerMetrics};

/// Allowed frame-rate range; requests outside it are clamped.
pub const MIN_FRAME_RATE: u32 = 1;
pub const MAX_FRAME_RATE: u32 = 240;

/// Default target frame rate.
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// FPS sampling window in milliseconds.
const FPS_WINDOW_MS: u64 = 2000;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Monotonic time source, in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall-clock-independent default clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

// ---------------------------------------------------------------------------
// FrameScheduler
// ---------------------------------------------------------------------------

/// Identifier returned by [`FrameScheduler::request_frame`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

type FrameCallback = Box<dyn FnMut(u64)>;

/// Cross-context stop switch for a running scheduler loop.
///
/// Obtained from [`FrameScheduler::handle`]; a frame callback (or any other
/// owner) can request the loop to stop after the current tick completes —
/// a frame in flight is never interrupted.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    running: Arc<AtomicBool>,
}

impl SchedulerHandle {
    /// Ask the loop to stop after the tick in progress.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Whether the loop is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Fixed-rate tick loop with a registry of per-frame callbacks.
pub struct FrameScheduler {
    clock: Box<dyn Clock>,
    frame_rate: u32,
    callbacks: Vec<(FrameId, FrameCallback)>,
    next_id: u64,
    /// Timestamp of the last executed frame, in fractional milliseconds.
    last_frame: Option<f64>,
    running: Arc<AtomicBool>,
    frame_count: u64,
    dropped_frames: u64,
    window: FpsWindow,
    profiling: bool,
    frame_time_total_ms: f64,
    profiled_frames: u64,
}

impl FrameScheduler {
    /// Create a scheduler on the monotonic clock.
    pub fn new(frame_rate: u32) -> Self {
        Self::with_clock(frame_rate, Box::new(MonotonicClock::new()))
    }

    /// Create a scheduler with an injected clock.
    pub fn with_clock(frame_rate: u32, clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            frame_rate: frame_rate.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE),
            callbacks: Vec::new(),
            next_id: 0,
            last_frame: None,
            running: Arc::new(AtomicBool::new(false)),
            frame_count: 0,
            dropped_frames: 0,
            window: FpsWindow::new(FPS_WINDOW_MS),
            profiling: false,
            frame_time_total_ms: 0.0,
            profiled_frames: 0,
        }
    }

    /// The clamped target frame rate.
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Change the target frame rate, clamped to `[1, 240]`.
    pub fn set_frame_rate(&mut self, frame_rate: u32) {
        self.frame_rate = frame_rate.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE);
    }

    /// Target frame period in milliseconds.
    pub fn period_ms(&self) -> f64 {
        1000.0 / self.frame_rate as f64
    }

    // -----------------------------------------------------------------------
    // Callback registry
    // -----------------------------------------------------------------------

    /// Register a callback invoked once per frame with the frame timestamp.
    pub fn request_frame(&mut self, callback: impl FnMut(u64) + 'static) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Deregister a callback. Returns `false` for an unknown id.
    ///
    /// Other callbacks keep the loop alive.
    pub fn cancel_frame(&mut self, id: FrameId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cid, _)| *cid != id);
        self.callbacks.len() != before
    }

    /// Number of registered callbacks.
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Arm the loop: marks it running and anchors the frame timeline at the
    /// current clock reading.
    pub fn start(&mut self) {
        self.running.store(true, Ordering::Relaxed);
        self.last_frame = Some(self.clock.now_ms() as f64);
        debug!(frame_rate = self.frame_rate, "frame scheduler started");
    }

    /// Halt the loop and drop every callback.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        self.callbacks.clear();
        debug!("frame scheduler stopped");
    }

    /// Whether the loop is armed.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// A stop switch usable from inside callbacks.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            running: Arc::clone(&self.running),
        }
    }

    // -----------------------------------------------------------------------
    // Ticking
    // -----------------------------------------------------------------------

    /// Execute at most one frame. Returns `true` when callbacks ran.
    ///
    /// A frame runs when at least one full period has elapsed since the
    /// last frame; the timeline then advances by whole periods so drift
    /// never accumulates. Arriving later than two periods counts one
    /// dropped frame.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let now = self.clock.now_ms();
        let last = match self.last_frame {
            Some(last) => last,
            None => {
                self.last_frame = Some(now as f64);
                return false;
            }
        };

        let period = self.period_ms();
        let delta = now as f64 - last;
        if delta < period {
            return false;
        }
        if delta > 2.0 * period {
            self.dropped_frames += 1;
        }

        let measure = self.profiling.then(Instant::now);
        for (_, callback) in self.callbacks.iter_mut() {
            callback(now);
        }
        if let Some(measure) = measure {
            self.frame_time_total_ms += measure.elapsed().as_secs_f64() * 1000.0;
            self.profiled_frames += 1;
        }

        self.last_frame = Some(now as f64 - (delta % period));
        self.frame_count += 1;
        self.window.record(now);
        true
    }

    /// Milliseconds until the next frame boundary; zero when overdue.
    pub fn ms_until_next_frame(&self) -> f64 {
        let Some(last) = self.last_frame else {
            return 0.0;
        };
        let target = last + self.period_ms();
        (target - self.clock.now_ms() as f64).max(0.0)
    }

    /// Drive the loop on tokio time until stopped or out of callbacks.
    ///
    /// Each iteration sleeps no later than the next frame boundary, then
    /// ticks once. Stopping (via [`FrameScheduler::stop`] on this value or
    /// a [`SchedulerHandle`]) takes effect between ticks; a frame that has
    /// started always completes.
    pub async fn run(&mut self) {
        if !self.is_running() {
            self.start();
        }
        while self.is_running() && !self.callbacks.is_empty() {
            let delay = self.ms_until_next_frame();
            if delay > 0.0 {
                tokio::time::sleep(Duration::from_micros((delay * 1000.0) as u64)).await;
            }
            self.tick();
        }
        self.running.store(false, Ordering::Relaxed);
    }

    // -----------------------------------------------------------------------
    // Metrics
    // -----------------------------------------------------------------------

    /// Toggle frame-duration profiling.
    pub fn set_profiling(&mut self, on: bool) {
        self.profiling = on;
    }

    /// Read-only metrics snapshot.
    pub fn metrics(&self) -> SchedulerMetrics {
        SchedulerMetrics {
            fps: self.window.fps(self.clock.now_ms()),
            frame_count: self.frame_count,
            dropped_frames: self.dropped_frames,
            avg_frame_ms: if self.profiled_frames > 0 {
                self.frame_time_total_ms / self.profiled_frames as f64
            } else {
                0.0
            },
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
