//! Deterministic stand-ins for the core's external collaborators.

use std::cell::{Cell as StdCell, RefCell};
use std::io;
use std::rc::Rc;

use crate::sched::Clock;
use crate::style::Style;
use crate::writer::{StyleEncoder, WriterSink};

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// A [`WriterSink`] that captures everything written to it.
///
/// Can be armed to fail after N successful writes, or on flush, to exercise
/// the pipeline's failure atomicity.
pub struct MemorySink {
    captured: Vec<u8>,
    columns: u16,
    rows: u16,
    flushes: usize,
    writes_before_failure: Option<usize>,
    fail_flush: bool,
}

impl MemorySink {
    /// A sink advertising the given surface size.
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            captured: Vec::new(),
            columns,
            rows,
            flushes: 0,
            writes_before_failure: None,
            fail_flush: false,
        }
    }

    /// Fail every write after `n` successful ones (builder).
    pub fn failing_after(mut self, n: usize) -> Self {
        self.writes_before_failure = Some(n);
        self
    }

    /// Fail on flush (builder).
    pub fn failing_flush(mut self) -> Self {
        self.fail_flush = true;
        self
    }

    /// Everything written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.captured
    }

    /// Captured bytes decoded as UTF-8 (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.captured).into_owned()
    }

    /// Number of completed flushes.
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Drop everything captured so far.
    pub fn reset(&mut self) {
        self.captured.clear();
        self.flushes = 0;
    }
}

impl WriterSink for MemorySink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if let Some(remaining) = self.writes_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink failed"));
            }
            *remaining -= 1;
        }
        self.captured.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.fail_flush {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "flush failed"));
        }
        self.flushes += 1;
        Ok(())
    }

    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }
}

// ---------------------------------------------------------------------------
// RecordingEncoder
// ---------------------------------------------------------------------------

/// A [`StyleEncoder`] that records its call sequence as readable tokens
/// (`move(x,y)`, `style(..)`, `reset`) and emits no bytes.
///
/// With this encoder, a [`MemorySink`] captures exactly the cell text,
/// while the recorded tokens assert on the encoder-call contract.
#[derive(Default)]
pub struct RecordingEncoder {
    calls: Rc<RefCell<Vec<String>>>,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded call list; clones observe the encoder
    /// after it moves into a presenter.
    pub fn calls(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.calls)
    }
}

impl StyleEncoder for RecordingEncoder {
    fn move_to(&self, x: u16, y: u16) -> Vec<u8> {
        self.calls.borrow_mut().push(format!("move({x},{y})"));
        Vec::new()
    }

    fn apply_style(&self, style: &Style) -> Vec<u8> {
        self.calls.borrow_mut().push(format!("style({style:?})"));
        Vec::new()
    }

    fn reset_attrs(&self) -> Vec<u8> {
        self.calls.borrow_mut().push("reset".to_string());
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// A [`Clock`] whose time only moves when the test says so.
///
/// Clones share the same underlying time, so a scheduler can own one clone
/// while the test advances another.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<StdCell<u64>>,
}

impl ManualClock {
    /// A clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute time in milliseconds.
    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    /// Move forward by `ms` milliseconds.
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
