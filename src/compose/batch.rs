//! Batched layer mutations.
//!
//! A batch records draw / clear / update-region operations and applies them
//! to their layers in one commit, so a frame never observes half of a
//! multi-layer update. Exactly one batch may be open at a time; the
//! [`BatchToken`] returned by `begin_batch` is deliberately not cloneable
//! and must be surrendered to commit.

use tracing::warn;

use crate::error::RenderError;
use crate::geometry::Rect;

use super::layer::{Drawable, LayerId};
use super::Compositor;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Opaque handle to the currently open batch.
#[derive(Debug)]
pub struct BatchToken {
    pub(crate) id: u64,
}

/// One recorded batch operation.
pub enum BatchOp {
    /// Add a drawable to a layer.
    Draw {
        layer: LayerId,
        drawable: Box<dyn Drawable>,
    },
    /// Remove every drawable from a layer.
    Clear { layer: LayerId },
    /// Invalidate a region of a layer.
    UpdateRegion { layer: LayerId, region: Rect },
}

/// Recorder state held by the compositor while a batch is open.
pub(crate) struct OpenBatch {
    pub(crate) id: u64,
    pub(crate) ops: Vec<BatchOp>,
}

// ---------------------------------------------------------------------------
// Compositor batch API
// ---------------------------------------------------------------------------

impl Compositor {
    /// Open a batch. Fails with [`RenderError::BatchInProgress`] if one is
    /// already open.
    pub fn begin_batch(&mut self) -> Result<BatchToken, RenderError> {
        if self.open_batch.is_some() {
            return Err(RenderError::BatchInProgress);
        }
        let id = self.next_batch_id;
        self.next_batch_id += 1;
        self.open_batch = Some(OpenBatch {
            id,
            ops: Vec::new(),
        });
        Ok(BatchToken { id })
    }

    /// Record an operation into the open batch.
    ///
    /// Fails with [`RenderError::StaleBatchToken`] when `token` is not the
    /// batch that is currently open (including when none is).
    pub fn batch_op(&mut self, token: &BatchToken, op: BatchOp) -> Result<(), RenderError> {
        let batch = self
            .open_batch
            .as_mut()
            .filter(|b| b.id == token.id)
            .ok_or(RenderError::StaleBatchToken { token: token.id })?;
        batch.ops.push(op);
        Ok(())
    }

    /// Record a drawable addition.
    pub fn batch_draw(
        &mut self,
        token: &BatchToken,
        layer: LayerId,
        drawable: Box<dyn Drawable>,
    ) -> Result<(), RenderError> {
        self.batch_op(token, BatchOp::Draw { layer, drawable })
    }

    /// Record a layer clear.
    pub fn batch_clear(&mut self, token: &BatchToken, layer: LayerId) -> Result<(), RenderError> {
        self.batch_op(token, BatchOp::Clear { layer })
    }

    /// Record a region invalidation.
    pub fn batch_update_region(
        &mut self,
        token: &BatchToken,
        layer: LayerId,
        region: Rect,
    ) -> Result<(), RenderError> {
        self.batch_op(token, BatchOp::UpdateRegion { layer, region })
    }

    /// Apply every recorded operation and close the batch.
    ///
    /// The token is consumed. Operations naming a layer that has since been
    /// removed are skipped with a log line; everything else applies in
    /// recording order.
    pub fn commit_batch(&mut self, token: BatchToken) -> Result<(), RenderError> {
        let Some(batch) = self.open_batch.take_if(|b| b.id == token.id) else {
            return Err(RenderError::StaleBatchToken { token: token.id });
        };

        for op in batch.ops {
            match op {
                BatchOp::Draw { layer, drawable } => match self.layer_mut(layer) {
                    Some(l) => l.add(drawable),
                    None => warn!(?layer, "batched draw targets a removed layer"),
                },
                BatchOp::Clear { layer } => match self.layer_mut(layer) {
                    Some(l) => l.clear(),
                    None => warn!(?layer, "batched clear targets a removed layer"),
                },
                BatchOp::UpdateRegion { layer, region } => match self.layer_mut(layer) {
                    Some(l) => l.update_region(region),
                    None => warn!(?layer, "batched invalidation targets a removed layer"),
                },
            }
        }
        Ok(())
    }

    /// Whether a batch is currently open.
    pub fn batch_open(&self) -> bool {
        self.open_batch.is_some()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
