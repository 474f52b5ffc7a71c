//! The writer pipeline: patches in, encoder calls out.
//!
//! [`FramePresenter`] turns an ordered patch list into the minimal sequence
//! of cursor moves, style changes, and text chunks, delivered as bytes to a
//! [`WriterSink`]. The byte encoding itself is injected through
//! [`StyleEncoder`]; the presenter only guarantees the *sequence* of encoder
//! calls is deterministic and style/cursor state is tracked correctly.
//!
//! The presenter holds no state between frames — cursor and style tracking
//! live on the stack of each `present` call — so a failed frame cannot
//! leak stale tracking into the next one.

use std::io;

use tracing::warn;

use crate::error::RenderError;
use crate::patch::Patch;
use crate::style::{styles_equivalent, Style};

// ---------------------------------------------------------------------------
// Boundary traits
// ---------------------------------------------------------------------------

/// The outbound byte destination. Opaque to the core; typically a buffered
/// terminal handle, a test buffer, or a pipe.
pub trait WriterSink {
    /// Write a chunk of bytes.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Flush buffered output to the device.
    fn flush(&mut self) -> io::Result<()>;

    /// Column count of the target surface, for sizing and patch bounds.
    fn columns(&self) -> u16;

    /// Row count of the target surface.
    fn rows(&self) -> u16;
}

/// Produces the escape bytes for cursor and style state changes.
///
/// Implementations decide the wire format (ANSI, test tokens, a protocol);
/// the presenter decides when each call happens.
pub trait StyleEncoder {
    /// Bytes that move the cursor to (x, y), 0-based.
    fn move_to(&self, x: u16, y: u16) -> Vec<u8>;

    /// Bytes that apply `style` on top of reset attributes.
    fn apply_style(&self, style: &Style) -> Vec<u8>;

    /// Bytes that reset all attributes to the terminal default.
    fn reset_attrs(&self) -> Vec<u8>;
}

// ---------------------------------------------------------------------------
// FramePresenter
// ---------------------------------------------------------------------------

/// Byte/call accounting for one presented frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PresentStats {
    /// Patches actually emitted (in-bounds).
    pub patches: usize,
    /// Cells emitted, excluding skipped continuations.
    pub cells: usize,
    /// Total bytes handed to the sink.
    pub bytes: usize,
}

/// Serializes patch lists into encoder calls against a sink.
pub struct FramePresenter {
    encoder: Box<dyn StyleEncoder>,
}

impl FramePresenter {
    /// Create a presenter around a style encoder.
    pub fn new(encoder: Box<dyn StyleEncoder>) -> Self {
        Self { encoder }
    }

    /// Emit `patches` in order to `sink`, then flush.
    ///
    /// Patches that do not fit the sink's advertised surface are dropped
    /// and logged. Any sink failure aborts the call; nothing is retried
    /// and no tracking state survives to the next call.
    pub fn present(
        &mut self,
        patches: &[Patch],
        sink: &mut dyn WriterSink,
    ) -> Result<PresentStats, RenderError> {
        let mut stats = PresentStats::default();
        // (-1, -1): the cursor position is unknown until the first move.
        let mut cursor: Option<(u16, u16)> = None;
        let mut open_style: Option<Style> = None;

        for patch in patches {
            if patch.y >= sink.rows() || patch.end_x() > sink.columns() {
                warn!(
                    x = patch.x,
                    y = patch.y,
                    span = patch.span(),
                    columns = sink.columns(),
                    rows = sink.rows(),
                    "dropping patch outside sink surface"
                );
                continue;
            }

            if cursor != Some((patch.x, patch.y)) {
                stats.bytes += self.emit(sink, self.encoder.move_to(patch.x, patch.y))?;
            }
            let mut x = patch.x;

            for cell in &patch.cells {
                if cell.width() == 0 {
                    // The continuation column was advanced over by its head.
                    continue;
                }

                if !styles_equivalent(open_style.as_ref(), cell.style.as_ref()) {
                    stats.bytes += self.emit(sink, self.encoder.reset_attrs())?;
                    if let Some(style) = cell.style.filter(|s| !s.is_empty()) {
                        stats.bytes += self.emit(sink, self.encoder.apply_style(&style))?;
                    }
                    open_style = cell.style;
                }

                stats.bytes += self.emit(sink, cell.content.as_str().as_bytes().to_vec())?;
                stats.cells += 1;
                x += cell.width() as u16;
            }

            if !styles_equivalent(open_style.as_ref(), None) {
                stats.bytes += self.emit(sink, self.encoder.reset_attrs())?;
            }
            open_style = None;

            cursor = Some((x, patch.y));
            stats.patches += 1;
        }

        sink.flush()?;
        Ok(stats)
    }

    fn emit(&self, sink: &mut dyn WriterSink, bytes: Vec<u8>) -> Result<usize, RenderError> {
        if bytes.is_empty() {
            return Ok(0);
        }
        sink.write(&bytes)?;
        Ok(bytes.len())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
