//! The terminal cell: one column position on one row.
//!
//! A cell holds one user-perceived character. Wide glyphs (CJK, emoji)
//! occupy two columns: the head cell carries the glyph, and the following
//! cell is a [`CellContent::Continuation`] with the same style so the pair
//! styles and diffs as a unit.

use crate::style::Style;
use crate::width::{char_width, cluster_width};
use std::fmt;

// ---------------------------------------------------------------------------
// CellContent
// ---------------------------------------------------------------------------

/// What a cell displays.
///
/// Blank cells are `Glyph(' ')` — there is deliberately no separate "empty"
/// variant, so a cleared cell and a written space compare equal and the
/// differ never sees a phantom change.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellContent {
    /// A single-scalar character.
    Glyph(char),
    /// A multi-scalar grapheme cluster (emoji ZWJ sequence, combining
    /// sequence) perceived as one character.
    Cluster(Box<str>),
    /// The trailing half of a wide glyph in the previous column.
    Continuation,
}

impl CellContent {
    /// Columns this content occupies: 0 for continuations, otherwise the
    /// glyph's display width.
    pub fn width(&self) -> u8 {
        match self {
            CellContent::Glyph(c) => char_width(*c),
            CellContent::Cluster(s) => cluster_width(s),
            CellContent::Continuation => 0,
        }
    }

    /// Whether this is the trailing half of a wide glyph.
    pub fn is_continuation(&self) -> bool {
        matches!(self, CellContent::Continuation)
    }

    /// The text this content contributes to output. Continuations emit
    /// nothing (the head glyph already advanced the terminal cursor).
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        match self {
            CellContent::Glyph(c) => {
                let mut buf = [0u8; 4];
                std::borrow::Cow::Owned(c.encode_utf8(&mut buf).to_string())
            }
            CellContent::Cluster(s) => std::borrow::Cow::Borrowed(s),
            CellContent::Continuation => std::borrow::Cow::Borrowed(""),
        }
    }
}

impl Default for CellContent {
    fn default() -> Self {
        CellContent::Glyph(' ')
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A single terminal cell: content plus optional style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub content: CellContent,
    pub style: Option<Style>,
}

impl Cell {
    /// Create a cell from a single character.
    pub fn new(ch: char, style: Option<Style>) -> Self {
        Self {
            content: CellContent::Glyph(ch),
            style,
        }
    }

    /// Create a cell from a grapheme cluster string.
    ///
    /// Single-scalar clusters collapse to the `Glyph` form.
    pub fn from_cluster(cluster: &str, style: Option<Style>) -> Self {
        let mut chars = cluster.chars();
        let content = match (chars.next(), chars.next()) {
            (Some(c), None) => CellContent::Glyph(c),
            _ => CellContent::Cluster(cluster.into()),
        };
        Self { content, style }
    }

    /// A blank (space) cell with no style.
    pub fn blank() -> Self {
        Self::default()
    }

    /// A blank (space) cell with the given style.
    pub fn blank_styled(style: Option<Style>) -> Self {
        Self {
            content: CellContent::Glyph(' '),
            style,
        }
    }

    /// The continuation marker for a wide glyph, mirroring its style.
    pub fn continuation(style: Option<Style>) -> Self {
        Self {
            content: CellContent::Continuation,
            style,
        }
    }

    /// Columns this cell occupies.
    pub fn width(&self) -> u8 {
        self.content.width()
    }

    /// Whether this is the trailing half of a wide glyph.
    pub fn is_continuation(&self) -> bool {
        self.content.is_continuation()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content.as_str())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
