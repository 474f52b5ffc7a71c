//! The cell grid: a dirty-tracked 2D buffer of styled cells.
//!
//! [`CellGrid`] is the drawing surface everything else renders into. Every
//! mutation keeps two invariants:
//!
//! * **Wide pairing** — a width-2 glyph at column `x` is always followed by
//!   a width-0 continuation at `x + 1` with the same style; overwriting
//!   either half heals the orphaned half to a blank. A wide glyph that
//!   would hang off the right edge degrades to `'?'`.
//! * **Dirty monotonicity** — a cell's dirty bit is set whenever its value
//!   changes and cleared only by [`CellGrid::clear_dirty`].
//!
//! Out-of-range coordinates are tolerated everywhere (no-op or clamp);
//! only creation with impossible dimensions fails.

mod draw;
mod text;

pub use draw::BoxKind;

use crate::cell::Cell;
use crate::error::RenderError;
use crate::geometry::Rect;
use crate::patch::Patch;
use crate::style::Style;

/// Replacement glyph for wide characters that cannot be placed whole.
pub(crate) const REPLACEMENT: char = '?';

/// Upper bound on grid area, in cells.
const MAX_CELLS: u64 = 1 << 24;

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// A cell plus its dirty bit. The bit never leaves the grid: `get` returns
/// the cell value only.
#[derive(Clone, Debug, Default)]
struct Slot {
    cell: Cell,
    dirty: bool,
}

// ---------------------------------------------------------------------------
// CellGrid
// ---------------------------------------------------------------------------

/// A 2D buffer of styled cells with per-cell dirty tracking.
#[derive(Clone, Debug)]
pub struct CellGrid {
    /// Row-major storage: `slots[y][x]`.
    slots: Vec<Vec<Slot>>,
    width: u16,
    height: u16,
}

impl CellGrid {
    /// Create a grid of blank cells.
    ///
    /// Fails with [`RenderError::InvalidDimensions`] when either dimension
    /// is zero or the area exceeds the implementation limit.
    pub fn new(width: u16, height: u16) -> Result<Self, RenderError> {
        if width == 0 || height == 0 || width as u64 * height as u64 > MAX_CELLS {
            return Err(RenderError::InvalidDimensions {
                width: width as u32,
                height: height as u32,
            });
        }
        let slots = vec![vec![Slot::default(); width as usize]; height as usize];
        Ok(Self {
            slots,
            width,
            height,
        })
    }

    /// Grid width in columns.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Grid height in rows.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Whether (x, y) addresses a cell.
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    // -----------------------------------------------------------------------
    // Cell access
    // -----------------------------------------------------------------------

    /// The cell value at (x, y), or `None` out of bounds.
    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.peek(x, y).cloned()
    }

    /// Borrow the cell at (x, y) without cloning.
    pub(crate) fn peek(&self, x: u16, y: u16) -> Option<&Cell> {
        self.slots
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .map(|s| &s.cell)
    }

    /// Write a single character at (x, y). No-op out of bounds.
    ///
    /// Wide characters claim (x, y) and (x+1, y) as a pair; at the last
    /// column they degrade to a single-width `'?'`. Zero-width scalars are
    /// not representable as standalone cells and are ignored.
    pub fn set(&mut self, x: u16, y: u16, ch: char, style: Option<Style>) {
        self.put(x, y, Cell::new(ch, style));
    }

    /// Write one cell, maintaining the wide-pair invariant.
    ///
    /// This is the single write path used by text writing, fills, copies,
    /// and patch application.
    pub(crate) fn put(&mut self, x: u16, y: u16, cell: Cell) {
        if !self.in_bounds(x, y) {
            return;
        }
        match cell.width() {
            0 => {}
            2 => {
                if x + 1 >= self.width {
                    let style = cell.style;
                    self.store(x, y, Cell::new(REPLACEMENT, style));
                } else {
                    let style = cell.style;
                    self.store(x, y, cell);
                    self.store(x + 1, y, Cell::continuation(style));
                }
            }
            _ => self.store(x, y, cell),
        }
    }

    /// Raw single-slot store with pair healing and change-only dirtying.
    fn store(&mut self, x: u16, y: u16, cell: Cell) {
        self.heal(x, y, &cell);
        let slot = &mut self.slots[y as usize][x as usize];
        if slot.cell != cell {
            slot.cell = cell;
            slot.dirty = true;
        }
    }

    /// Blank the partner of any wide pair that the write at (x, y) splits.
    fn heal(&mut self, x: u16, y: u16, incoming: &Cell) {
        let xi = x as usize;
        let row = &mut self.slots[y as usize];
        let existing_is_continuation = row[xi].cell.is_continuation();
        let existing_is_wide_head = row[xi].cell.width() == 2;

        // Overwriting a continuation orphans the head to its left.
        if existing_is_continuation && !incoming.is_continuation() && x > 0 {
            let head = &mut row[xi - 1];
            if head.cell.width() == 2 {
                let style = head.cell.style;
                head.cell = Cell::blank_styled(style);
                head.dirty = true;
            }
        }

        // Overwriting a head with something that is not a new head orphans
        // the continuation to its right.
        if existing_is_wide_head && incoming.width() != 2 && x + 1 < self.width {
            let tail = &mut row[xi + 1];
            if tail.cell.is_continuation() {
                let style = tail.cell.style;
                tail.cell = Cell::blank_styled(style);
                tail.dirty = true;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Clearing and filling
    // -----------------------------------------------------------------------

    /// Reset every cell to a blank with the given style.
    ///
    /// Only cells whose value actually changes are marked dirty.
    pub fn clear(&mut self, style: Option<Style>) {
        for y in 0..self.height {
            self.clear_line(y, style);
        }
    }

    /// Reset one row to blanks. No-op if `y` is out of bounds.
    pub fn clear_line(&mut self, y: u16, style: Option<Style>) {
        if y >= self.height {
            return;
        }
        let blank = Cell::blank_styled(style);
        for slot in &mut self.slots[y as usize] {
            if slot.cell != blank {
                slot.cell = blank.clone();
                slot.dirty = true;
            }
        }
    }

    /// Reset a rectangular region to blanks, clamped to the grid.
    pub fn clear_rect(&mut self, rect: Rect, style: Option<Style>) {
        let clip = rect.intersection(Rect::sized(self.width as i32, self.height as i32));
        if clip.is_empty() {
            return;
        }
        let blank = Cell::blank_styled(style);
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                // Blanking one half of a wide pair must heal the other, so
                // this goes through the normal write path.
                self.put(x as u16, y as u16, blank.clone());
            }
        }
    }

    /// Fill a rectangular region with copies of `cell`, clamped to the grid.
    ///
    /// Wide fill glyphs are laid out in non-overlapping pairs; a trailing
    /// odd column inside the region degrades per the wide edge rule.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let clip = rect.intersection(Rect::sized(self.width as i32, self.height as i32));
        if clip.is_empty() {
            return;
        }
        let step = cell.width().max(1) as i32;
        for y in clip.y..clip.bottom() {
            let mut x = clip.x;
            while x < clip.right() {
                if step == 2 && x + 1 >= clip.right() {
                    self.put(x as u16, y as u16, Cell::new(REPLACEMENT, cell.style));
                } else {
                    self.put(x as u16, y as u16, cell.clone());
                }
                x += step;
            }
        }
    }

    /// Fill by coordinates and character.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, ch: char, style: Option<Style>) {
        self.fill(Rect::new(x, y, w, h), Cell::new(ch, style));
    }

    // -----------------------------------------------------------------------
    // Copying
    // -----------------------------------------------------------------------

    /// Copy a region of `src` into this grid.
    ///
    /// The region is clamped to both grids. A wide pair split by the region
    /// edge copies as a single-width `'?'` with no continuation.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_from(
        &mut self,
        src: &CellGrid,
        src_x: u16,
        src_y: u16,
        dst_x: u16,
        dst_y: u16,
        w: u16,
        h: u16,
    ) {
        let w = w
            .min(src.width.saturating_sub(src_x))
            .min(self.width.saturating_sub(dst_x));
        let h = h
            .min(src.height.saturating_sub(src_y))
            .min(self.height.saturating_sub(dst_y));

        for row in 0..h {
            let mut col = 0u16;
            while col < w {
                let cell = match src.get(src_x + col, src_y + row) {
                    Some(c) => c,
                    None => break,
                };
                if cell.is_continuation() {
                    if col == 0 {
                        // Leading half of the pair lies outside the region.
                        self.put(dst_x, dst_y + row, Cell::new(REPLACEMENT, cell.style));
                    }
                    // Otherwise the head one column back already wrote it.
                    col += 1;
                } else if cell.width() == 2 {
                    if col + 1 < w {
                        self.put(dst_x + col, dst_y + row, cell);
                        col += 2;
                    } else {
                        // Trailing half would fall outside the region.
                        self.put(dst_x + col, dst_y + row, Cell::new(REPLACEMENT, cell.style));
                        col += 1;
                    }
                } else {
                    self.put(dst_x + col, dst_y + row, cell);
                    col += 1;
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Scrolling
    // -----------------------------------------------------------------------

    /// Shift every row up by `n`, blanking the vacated bottom rows.
    ///
    /// `n >= height` clears the whole grid. Every moved or cleared cell is
    /// marked dirty.
    pub fn scroll_up(&mut self, n: u16) {
        if n == 0 {
            return;
        }
        if n >= self.height {
            self.clear(None);
            self.mark_all_dirty();
            return;
        }
        let n = n as usize;
        self.slots.rotate_left(n);
        let h = self.slots.len();
        for row in &mut self.slots[h - n..] {
            for slot in row.iter_mut() {
                slot.cell = Cell::blank();
            }
        }
        self.mark_all_dirty();
    }

    /// Shift every row down by `n`, blanking the vacated top rows.
    ///
    /// `n >= height` clears the whole grid. Every moved or cleared cell is
    /// marked dirty.
    pub fn scroll_down(&mut self, n: u16) {
        if n == 0 {
            return;
        }
        if n >= self.height {
            self.clear(None);
            self.mark_all_dirty();
            return;
        }
        let n = n as usize;
        self.slots.rotate_right(n);
        for row in &mut self.slots[..n] {
            for slot in row.iter_mut() {
                slot.cell = Cell::blank();
            }
        }
        self.mark_all_dirty();
    }

    // -----------------------------------------------------------------------
    // Resizing
    // -----------------------------------------------------------------------

    /// Resize the grid, preserving the top-left content.
    ///
    /// New cells are blank. The whole grid is marked dirty afterward so the
    /// next diff repaints everything.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<(), RenderError> {
        if width == 0 || height == 0 || width as u64 * height as u64 > MAX_CELLS {
            return Err(RenderError::InvalidDimensions {
                width: width as u32,
                height: height as u32,
            });
        }
        self.slots
            .resize(height as usize, vec![Slot::default(); width as usize]);
        for row in &mut self.slots {
            row.resize(width as usize, Slot::default());
        }
        self.width = width;
        self.height = height;
        // A truncated row may now end in a dangling wide head.
        for y in 0..height {
            let last = &self.slots[y as usize][width as usize - 1];
            if last.cell.width() == 2 {
                let style = last.cell.style;
                self.store(width - 1, y, Cell::new(REPLACEMENT, style));
            }
        }
        self.mark_all_dirty();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// A value snapshot of every cell, suitable for external diffing.
    pub fn snapshot(&self) -> Vec<Vec<Cell>> {
        self.slots
            .iter()
            .map(|row| row.iter().map(|s| s.cell.clone()).collect())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Dirty tracking
    // -----------------------------------------------------------------------

    /// Collect maximal horizontal runs of dirty cells as patches.
    pub fn dirty_patches(&self) -> Vec<Patch> {
        let mut patches = Vec::new();
        for (y, row) in self.slots.iter().enumerate() {
            let mut x = 0usize;
            while x < row.len() {
                if !row[x].dirty {
                    x += 1;
                    continue;
                }
                let start = x;
                let mut cells = Vec::new();
                while x < row.len() && row[x].dirty {
                    cells.push(row[x].cell.clone());
                    x += 1;
                }
                patches.push(Patch {
                    x: start as u16,
                    y: y as u16,
                    cells,
                });
            }
        }
        patches
    }

    /// Whether any cell is dirty.
    pub fn has_dirty(&self) -> bool {
        self.slots
            .iter()
            .any(|row| row.iter().any(|slot| slot.dirty))
    }

    /// Unset every dirty flag.
    pub fn clear_dirty(&mut self) {
        for row in &mut self.slots {
            for slot in row.iter_mut() {
                slot.dirty = false;
            }
        }
    }

    /// Set every dirty flag.
    pub fn mark_all_dirty(&mut self) {
        for row in &mut self.slots {
            for slot in row.iter_mut() {
                slot.dirty = true;
            }
        }
    }

    /// Mark every cell inside `rect` dirty, clamped to the grid.
    pub fn mark_rect_dirty(&mut self, rect: Rect) {
        let clip = rect.intersection(Rect::sized(self.width as i32, self.height as i32));
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                self.slots[y as usize][x as usize].dirty = true;
            }
        }
    }

    /// Approximate memory footprint of the cell storage, for metrics.
    pub fn byte_size(&self) -> usize {
        self.width as usize * self.height as usize * std::mem::size_of::<Slot>()
    }

    /// Assert the wide-pair invariant over the whole grid (debug aid).
    #[cfg(test)]
    pub(crate) fn check_wide_pairing(&self) {
        for (y, row) in self.slots.iter().enumerate() {
            for (x, slot) in row.iter().enumerate() {
                if slot.cell.width() == 2 {
                    assert!(
                        x + 1 < row.len(),
                        "wide head at right edge ({x},{y})"
                    );
                    assert!(
                        row[x + 1].cell.is_continuation(),
                        "wide head at ({x},{y}) lacks continuation"
                    );
                    assert_eq!(
                        row[x + 1].cell.style,
                        slot.cell.style,
                        "continuation style mismatch at ({},{y})",
                        x + 1
                    );
                }
                if slot.cell.is_continuation() {
                    assert!(x > 0, "continuation at column 0 (row {y})");
                    assert_eq!(
                        row[x - 1].cell.width(),
                        2,
                        "continuation at ({x},{y}) not preceded by wide head"
                    );
                }
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
