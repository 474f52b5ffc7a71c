//! Crate-wide error type for the rendering core.
//!
//! Out-of-range coordinates are never errors (grid operations clamp or
//! no-op), and patches that do not fit their target are dropped locally with
//! a log line. [`RenderError`] covers the failures that must reach the
//! caller: impossible grid dimensions, batch misuse, and sink I/O.

use std::io;

/// Errors surfaced by grid creation, batching, and the writer pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Grid dimensions were zero or exceeded the implementation limit.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// `begin_batch` was called while another batch was still open.
    #[error("a layer batch is already in progress")]
    BatchInProgress,

    /// `commit_batch` was called with a token that is not the open batch.
    #[error("batch token {token} does not match the open batch")]
    StaleBatchToken { token: u64 },

    /// The writer sink failed during `write` or `flush`.
    #[error("sink write failed")]
    SinkWrite {
        #[from]
        source: io::Error,
    },
}

// ===========================================================================
// Tests
// ===========================================================================
