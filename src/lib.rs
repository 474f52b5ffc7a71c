//! # scrim
//!
//! A double-buffered, layer-compositing screen renderer for terminal user
//! interfaces.
//!
//! scrim is the rendering core of a terminal UI stack: a Unicode-aware cell
//! grid with dirty tracking, a cell-run differ, a layered compositor, a
//! fixed-FPS frame scheduler, and a writer pipeline that emits the minimal
//! byte stream to bring a terminal from its previous frame to the next one.
//! Input handling, widgets, and the concrete escape encoding live outside
//! the core — the pipeline talks to the world through the narrow
//! [`WriterSink`](writer::WriterSink) and
//! [`StyleEncoder`](writer::StyleEncoder) interfaces, with crossterm-backed
//! defaults in [`term`].

pub mod geometry;

pub mod cell;
pub mod style;
pub mod width;

pub mod grid;
pub mod patch;

pub mod compose;
pub mod sched;
pub mod writer;

pub mod error;
pub mod metrics;
pub mod term;

pub mod testing;

pub use cell::{Cell, CellContent};
pub use compose::{
    BatchOp, BatchToken, BlendMode, Compositor, CompositorOptions, DrawContext, Drawable, Layer,
    LayerId, Scene,
};
pub use error::RenderError;
pub use geometry::Rect;
pub use grid::{BoxKind, CellGrid};
pub use metrics::{CompositorMetrics, SchedulerMetrics};
pub use patch::{apply_patch, apply_patches, diff, optimize_patches, Patch};
pub use sched::{Clock, FrameId, FrameScheduler, MonotonicClock, SchedulerHandle};
pub use style::{Attrs, Color, Style, UnderlineShape};
pub use term::{StdoutSink, TermEncoder};
pub use writer::{FramePresenter, PresentStats, StyleEncoder, WriterSink};
