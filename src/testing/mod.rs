//! Test harness: in-memory sinks, recording encoders, manual clocks, and
//! grid snapshots.
//!
//! These types let every pipeline contract be exercised without a terminal:
//! [`MemorySink`] captures bytes (and can fail on demand for error-path
//! tests), [`RecordingEncoder`] records the encoder call sequence as
//! readable tokens, [`ManualClock`] makes scheduler timing deterministic,
//! and [`grid_to_string`] renders grids for snapshot assertions.

mod harness;
mod snapshot;

pub use harness::{ManualClock, MemorySink, RecordingEncoder};
pub use snapshot::{grid_to_string, patch_summary};
