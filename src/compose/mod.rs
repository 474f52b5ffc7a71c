//! The compositor: layer store, scene rendering, and the double buffer.
//!
//! The compositor owns everything a frame needs: the layers (in a slotmap
//! keyed by [`LayerId`]), the displayed and scratch grids, the
//! [`FramePresenter`], and the metrics accumulator. One `render` call walks
//! the full pipeline — compose, diff, write, flush, swap — and a failure
//! anywhere in the write path leaves the displayed grid untouched, so the
//! next frame produces a correct patch set.

mod batch;
mod layer;

pub use batch::{BatchOp, BatchToken};
pub use layer::{BlendMode, DrawContext, Drawable, Layer, LayerId};

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::error::RenderError;
use crate::geometry::Rect;
use crate::grid::CellGrid;
use crate::metrics::CompositorMetrics;
use crate::patch::{apply_patches, diff, optimize_patches, Patch};
use crate::style::{Color, Style};
use crate::writer::{FramePresenter, StyleEncoder, WriterSink};

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// What one frame presents: a viewport over scene space and an optional
/// background. Layers come from the compositor's store.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    /// The region of scene space mapped onto the output surface.
    pub viewport: Rect,
    /// Background color for the frame; falls back to the compositor's
    /// configured clear color when `None`.
    pub clear_color: Option<Color>,
}

impl Scene {
    /// A scene over the given viewport with no explicit background.
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            clear_color: None,
        }
    }

    /// Set the background color (builder).
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = Some(color);
        self
    }
}

// ---------------------------------------------------------------------------
// CompositorOptions
// ---------------------------------------------------------------------------

/// Explicit configuration for a compositor instance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CompositorOptions {
    /// Initial surface width in columns.
    pub width: u16,
    /// Initial surface height in rows.
    pub height: u16,
    /// Default background used when a scene sets none.
    pub clear_color: Option<Color>,
    /// Blend mode given to newly created layers.
    pub blend_default: BlendMode,
    /// Whether per-frame timing is recorded.
    pub profiling: bool,
}

impl Default for CompositorOptions {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            clear_color: None,
            blend_default: BlendMode::Normal,
            profiling: false,
        }
    }
}

impl CompositorOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial surface size (builder).
    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the default clear color (builder).
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = Some(color);
        self
    }

    /// Set the default blend mode for new layers (builder).
    pub fn with_blend_default(mut self, blend: BlendMode) -> Self {
        self.blend_default = blend;
        self
    }

    /// Enable profiling (builder).
    pub fn with_profiling(mut self, on: bool) -> Self {
        self.profiling = on;
        self
    }
}

// ---------------------------------------------------------------------------
// Compositor
// ---------------------------------------------------------------------------

/// Internal counter state backing [`CompositorMetrics`].
#[derive(Debug, Default)]
struct Stats {
    frames: u64,
    draw_calls: u64,
    culled: u64,
    dirty_regions: u64,
    cells_emitted: u64,
    bytes_emitted: u64,
    last_frame_ms: f64,
}

/// Owns the layers, the double buffer, and the writer pipeline.
pub struct Compositor {
    layers: SlotMap<LayerId, Layer>,
    /// Paint order: sorted by (z_index, creation sequence).
    order: Vec<LayerId>,
    next_seq: u64,
    /// The grid the terminal currently shows.
    front: CellGrid,
    /// The grid being composed for the next frame.
    back: CellGrid,
    presenter: FramePresenter,
    pub(crate) open_batch: Option<batch::OpenBatch>,
    pub(crate) next_batch_id: u64,
    stats: Stats,
    profiling: bool,
    clear_color: Option<Color>,
    blend_default: BlendMode,
    /// Viewport of the most recent render, for translating scene-space
    /// invalidation onto the front grid.
    last_viewport: Option<Rect>,
}

impl Compositor {
    /// Create a compositor with the given options and style encoder.
    pub fn new(
        options: CompositorOptions,
        encoder: Box<dyn StyleEncoder>,
    ) -> Result<Self, RenderError> {
        let front = CellGrid::new(options.width, options.height)?;
        let back = front.clone();
        Ok(Self {
            layers: SlotMap::with_key(),
            order: Vec::new(),
            next_seq: 0,
            front,
            back,
            presenter: FramePresenter::new(encoder),
            open_batch: None,
            next_batch_id: 0,
            stats: Stats::default(),
            profiling: options.profiling,
            clear_color: options.clear_color,
            blend_default: options.blend_default,
            last_viewport: None,
        })
    }

    // -----------------------------------------------------------------------
    // Layer management
    // -----------------------------------------------------------------------

    /// Create a layer at the given z-index and return its handle.
    ///
    /// Layers with equal z-index paint in creation order.
    pub fn create_layer(&mut self, z_index: i32) -> LayerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = self
            .layers
            .insert(Layer::new(z_index, seq, self.blend_default));
        self.order.push(id);
        self.resort();
        id
    }

    /// Remove a layer. Returns `false` for an unknown id.
    ///
    /// The cells the layer covered are invalidated on the displayed grid so
    /// the next frame repaints that area even for dirty-driven callers.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let Some(layer) = self.layers.remove(id) else {
            return false;
        };
        self.order.retain(|&o| o != id);
        let bounds = layer.bounds_union();
        if let Some(vp) = self.last_viewport {
            self.front
                .mark_rect_dirty(bounds.intersection(vp).translate(-vp.x, -vp.y));
        }
        true
    }

    /// Shared access to a layer.
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    /// Mutable access to a layer.
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id)
    }

    /// Move a layer to a new z-index, re-sorting the paint order.
    pub fn set_layer_z(&mut self, id: LayerId, z_index: i32) {
        if let Some(layer) = self.layers.get_mut(id) {
            layer.z_index = z_index;
            layer.update_region(Rect::EVERYTHING);
            self.resort();
        }
    }

    /// Number of live layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Layer ids in paint order (back to front).
    pub fn paint_order(&self) -> &[LayerId] {
        &self.order
    }

    fn resort(&mut self) {
        let layers = &self.layers;
        self.order
            .sort_by_key(|&id| layers.get(id).map(|l| (l.z_index, l.seq)).unwrap_or((0, 0)));
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Render a scene: compose all layers, diff against the displayed grid,
    /// emit the difference, and swap buffers.
    ///
    /// A sink failure leaves the displayed grid and all dirty state exactly
    /// as they were; the scene can be rendered again.
    pub fn render(&mut self, scene: &Scene, sink: &mut dyn WriterSink) -> Result<(), RenderError> {
        let vw = scene.viewport.width.clamp(0, u16::MAX as i32) as u16;
        let vh = scene.viewport.height.clamp(0, u16::MAX as i32) as u16;
        if vw == 0 || vh == 0 {
            trace!("empty viewport, nothing to render");
            return Ok(());
        }

        let started = self.profiling.then(std::time::Instant::now);

        if self.back.width() != vw || self.back.height() != vh {
            debug!(width = vw, height = vh, "resizing render surface");
            // Fresh blank buffers: the previous surface contents are stale
            // at the new size, so the whole frame re-emits.
            self.back = CellGrid::new(vw, vh)?;
            self.front = CellGrid::new(vw, vh)?;
        }

        // Compose the scratch grid from scratch each frame; the diff below
        // keeps the terminal traffic minimal regardless.
        let clear_style = scene
            .clear_color
            .or(self.clear_color)
            .map(|c| Style::EMPTY.with_bg(c));
        self.back.clear(clear_style);

        for &id in &self.order {
            let Some(layer) = self.layers.get(id) else {
                continue;
            };
            if !layer.visible() || layer.opacity() <= 0.0 {
                continue;
            }
            self.stats.dirty_regions += layer.merged_dirty().len() as u64;

            for element in layer.elements() {
                if !element.bounds().overlaps(scene.viewport) {
                    self.stats.culled += 1;
                    continue;
                }
                let clip = element.bounds().intersection(scene.viewport);
                let mut ctx = DrawContext::new(
                    &mut self.back,
                    scene.viewport,
                    clip,
                    layer.opacity(),
                    layer.blend(),
                );
                element.draw(&mut ctx);
                self.stats.draw_calls += 1;
            }
        }

        let patches = optimize_patches(diff(&self.front, &self.back));
        let present = self.presenter.present(&patches, sink)?;

        // Success: the scratch grid becomes the displayed grid and the old
        // displayed grid is recycled as the next scratch.
        std::mem::swap(&mut self.front, &mut self.back);
        self.front.clear_dirty();
        for &id in &self.order {
            if let Some(layer) = self.layers.get_mut(id) {
                layer.clear_dirty();
            }
        }
        self.last_viewport = Some(scene.viewport);

        self.stats.frames += 1;
        self.stats.cells_emitted += present.cells as u64;
        self.stats.bytes_emitted += present.bytes as u64;
        if let Some(started) = started {
            self.stats.last_frame_ms = started.elapsed().as_secs_f64() * 1000.0;
        }
        Ok(())
    }

    /// Push explicit patches straight through the writer pipeline,
    /// bypassing composition.
    ///
    /// On success the patches are also applied to the displayed grid, so a
    /// later full render does not re-emit the same cells.
    pub fn render_partial(
        &mut self,
        patches: Vec<Patch>,
        sink: &mut dyn WriterSink,
    ) -> Result<(), RenderError> {
        let optimized = optimize_patches(patches);
        let present = self.presenter.present(&optimized, sink)?;

        apply_patches(&mut self.front, &optimized);
        self.front.clear_dirty();

        self.stats.cells_emitted += present.cells as u64;
        self.stats.bytes_emitted += present.bytes as u64;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// The grid currently shown on the output surface.
    pub fn displayed(&self) -> &CellGrid {
        &self.front
    }

    /// Read-only metrics snapshot.
    pub fn metrics(&self) -> CompositorMetrics {
        CompositorMetrics {
            frames: self.stats.frames,
            draw_calls: self.stats.draw_calls,
            culled: self.stats.culled,
            dirty_regions: self.stats.dirty_regions,
            cells_emitted: self.stats.cells_emitted,
            bytes_emitted: self.stats.bytes_emitted,
            buffer_bytes: self.front.byte_size(),
            last_frame_ms: self.stats.last_frame_ms,
        }
    }

    /// Toggle per-frame timing capture.
    pub fn set_profiling(&mut self, on: bool) {
        self.profiling = on;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
