//! Layers, drawables, and the draw context.
//!
//! Layers are owned by the compositor's slotmap store and addressed by
//! [`LayerId`]; they hold no pointer back to their owner. A layer is an
//! ordered list of boxed [`Drawable`]s plus compositing attributes and a
//! list of dirty regions.

use slotmap::new_key_type;

use crate::cell::Cell;
use crate::geometry::{merge_rects, Rect};
use crate::grid::CellGrid;
use crate::style::Style;

new_key_type! {
    /// Stable handle for a layer in the compositor's store.
    pub struct LayerId;
}

// ---------------------------------------------------------------------------
// BlendMode
// ---------------------------------------------------------------------------

/// How a layer's cells combine with what is already on the scratch grid.
///
/// At the cell level every mode overwrites the destination; the variants are
/// carried through [`DrawContext`] and metrics for future RGB blending. The
/// one behavioral rule today is the opacity gate: with any mode other than
/// [`BlendMode::Replace`], a layer with opacity below 0.5 leaves the
/// destination cells untouched, and at or above 0.5 it overwrites. This rule
/// is stable until real color blending lands.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Add,
    Subtract,
    /// Unconditional overwrite regardless of opacity.
    Replace,
}

// ---------------------------------------------------------------------------
// Drawable
// ---------------------------------------------------------------------------

/// Something that can paint cells into a layer's slice of the scene.
///
/// Implementations write through the [`DrawContext`], which clips every
/// write to `bounds() ∩ viewport`; a drawable cannot touch cells outside
/// its own bounds even if it tries.
pub trait Drawable {
    /// This drawable's extent in scene coordinates.
    fn bounds(&self) -> Rect;

    /// Whether the drawable changed since it was last painted.
    fn is_dirty(&self) -> bool {
        true
    }

    /// Paint into the context.
    fn draw(&self, ctx: &mut DrawContext<'_>);
}

// ---------------------------------------------------------------------------
// DrawContext
// ---------------------------------------------------------------------------

/// The surface handed to [`Drawable::draw`].
///
/// Write methods take scene coordinates, translate by the viewport origin,
/// clip to the context's clip rectangle, and apply the layer's opacity
/// gate. `opacity` and `blend` are visible to drawables that want to adapt
/// their output.
pub struct DrawContext<'a> {
    buffer: &'a mut CellGrid,
    /// The scene viewport being rendered.
    pub viewport: Rect,
    /// Clip region for this drawable: `bounds ∩ viewport`.
    pub clip: Rect,
    /// Effective layer opacity, in `[0, 1]`.
    pub opacity: f32,
    /// The owning layer's blend mode.
    pub blend: BlendMode,
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(
        buffer: &'a mut CellGrid,
        viewport: Rect,
        clip: Rect,
        opacity: f32,
        blend: BlendMode,
    ) -> Self {
        Self {
            buffer,
            viewport,
            clip,
            opacity,
            blend,
        }
    }

    /// Whether writes land on the destination under the opacity gate.
    fn writes_through(&self) -> bool {
        matches!(self.blend, BlendMode::Replace) || self.opacity >= 0.5
    }

    /// Write one character at scene coordinates (x, y).
    pub fn put(&mut self, x: i32, y: i32, ch: char, style: Option<Style>) {
        self.put_cell(x, y, Cell::new(ch, style));
    }

    /// Write one cell at scene coordinates (x, y).
    ///
    /// A wide cell needs both its columns inside the clip; otherwise it is
    /// dropped whole rather than leaking a continuation past the edge.
    pub fn put_cell(&mut self, x: i32, y: i32, cell: Cell) {
        if !self.writes_through() || !self.clip.contains(x, y) {
            return;
        }
        if cell.width() == 2 && !self.clip.contains(x + 1, y) {
            return;
        }
        let gx = x - self.viewport.x;
        let gy = y - self.viewport.y;
        if gx < 0 || gy < 0 {
            return;
        }
        self.buffer.put(gx as u16, gy as u16, cell);
    }

    /// Write a single-row string starting at scene coordinates (x, y).
    ///
    /// Each grapheme is clipped independently; wide glyphs that straddle
    /// the clip edge are dropped whole.
    pub fn write_text(&mut self, x: i32, y: i32, text: &str, style: Option<Style>) {
        use unicode_segmentation::UnicodeSegmentation;

        if !self.writes_through() {
            return;
        }
        let mut cur = x;
        for grapheme in text.graphemes(true) {
            let cell = Cell::from_cluster(grapheme, style);
            let w = cell.width() as i32;
            if w == 0 {
                continue;
            }
            let covered = Rect::new(cur, y, w, 1);
            if self.clip.intersection(covered) == covered {
                self.put_cell(cur, y, cell);
            }
            cur += w;
        }
    }

    /// Fill a scene-space rectangle with a character.
    pub fn fill(&mut self, rect: Rect, ch: char, style: Option<Style>) {
        let clip = rect.intersection(self.clip);
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                self.put(x, y, ch, style);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Layer
// ---------------------------------------------------------------------------

/// An ordered collection of drawables with compositing attributes.
pub struct Layer {
    pub(crate) z_index: i32,
    /// Creation order; breaks z-index ties.
    pub(crate) seq: u64,
    visible: bool,
    opacity: f32,
    blend: BlendMode,
    elements: Vec<Box<dyn Drawable>>,
    dirty: Vec<Rect>,
}

impl Layer {
    pub(crate) fn new(z_index: i32, seq: u64, blend: BlendMode) -> Self {
        Self {
            z_index,
            seq,
            visible: true,
            opacity: 1.0,
            blend,
            elements: Vec::new(),
            dirty: Vec::new(),
        }
    }

    /// The layer's z-index (set through the compositor, which keeps the
    /// paint order sorted).
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.dirty.push(Rect::EVERYTHING);
        }
    }

    /// Opacity in `[0, 1]`; out-of-range values are clamped.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        let clamped = opacity.clamp(0.0, 1.0);
        if (self.opacity - clamped).abs() > f32::EPSILON {
            self.opacity = clamped;
            self.dirty.push(Rect::EVERYTHING);
        }
    }

    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    pub fn set_blend(&mut self, blend: BlendMode) {
        if self.blend != blend {
            self.blend = blend;
            self.dirty.push(Rect::EVERYTHING);
        }
    }

    /// Append a drawable; its bounds become dirty.
    pub fn add(&mut self, drawable: Box<dyn Drawable>) {
        self.dirty.push(drawable.bounds());
        self.elements.push(drawable);
    }

    /// Remove the drawable at `index`, marking its bounds dirty.
    ///
    /// Returns the drawable, or `None` if the index is out of range.
    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Drawable>> {
        if index >= self.elements.len() {
            return None;
        }
        let drawable = self.elements.remove(index);
        self.dirty.push(drawable.bounds());
        Some(drawable)
    }

    /// Drop every drawable and mark the entire layer dirty.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.dirty.push(Rect::EVERYTHING);
    }

    /// Record an externally-invalidated region.
    pub fn update_region(&mut self, region: Rect) {
        self.dirty.push(region);
    }

    /// Number of drawables on this layer.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether anything on this layer needs repainting.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty() || self.elements.iter().any(|e| e.is_dirty())
    }

    /// The recorded dirty regions, merged where they overlap.
    pub fn merged_dirty(&self) -> Vec<Rect> {
        merge_rects(&self.dirty)
    }

    /// Union of all element bounds; [`Rect::EMPTY`] for an empty layer.
    pub fn bounds_union(&self) -> Rect {
        self.elements
            .iter()
            .fold(Rect::EMPTY, |acc, e| acc.union(e.bounds()))
    }

    pub(crate) fn elements(&self) -> &[Box<dyn Drawable>] {
        &self.elements
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty.clear();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
