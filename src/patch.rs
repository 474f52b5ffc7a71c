//! Cell-run patches: the unit of work between grids and the writer.
//!
//! A [`Patch`] is a horizontal run of cells at a starting coordinate. The
//! differ produces one patch per maximal run of differing cells; the
//! optimizer sorts and merges touching runs; the patcher replays patches
//! onto a grid. All three agree on the same cell equality (content and
//! style), so a change is detected exactly once.

use tracing::warn;

use crate::cell::Cell;
use crate::grid::CellGrid;

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// A horizontal run of cells to be written at (x, y).
///
/// Runs are row-local: a patch never wraps to the next row. Each entry in
/// `cells` covers one column, so a wide glyph contributes two entries (its
/// head and its continuation).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patch {
    pub x: u16,
    pub y: u16,
    pub cells: Vec<Cell>,
}

impl Patch {
    /// Create a patch from cells.
    pub fn new(x: u16, y: u16, cells: Vec<Cell>) -> Self {
        Self { x, y, cells }
    }

    /// Columns covered by this run.
    pub fn span(&self) -> u16 {
        self.cells.len() as u16
    }

    /// The column one past the end of the run.
    pub fn end_x(&self) -> u16 {
        self.x + self.span()
    }
}

// ---------------------------------------------------------------------------
// Diffing
// ---------------------------------------------------------------------------

/// Compute the patches that transform grid `a` into grid `b`.
///
/// Rows and columns beyond the smaller grid are ignored; callers either
/// pre-resize or accept truncation. A run never starts on a continuation
/// cell: if the first differing column is the trailing half of a wide pair,
/// the run is extended one column left to include the head, so applying the
/// patch can never split a pair.
pub fn diff(a: &CellGrid, b: &CellGrid) -> Vec<Patch> {
    let width = a.width().min(b.width());
    let height = a.height().min(b.height());
    let mut patches = Vec::new();

    for y in 0..height {
        let mut x = 0u16;
        while x < width {
            if a.peek(x, y) == b.peek(x, y) {
                x += 1;
                continue;
            }

            let mut start = x;
            if start > 0 && b.peek(start, y).is_some_and(|c| c.is_continuation()) {
                start -= 1;
            }

            let mut cells = Vec::new();
            let mut end = start;
            while end < width && (end < x || a.peek(end, y) != b.peek(end, y)) {
                if let Some(cell) = b.get(end, y) {
                    cells.push(cell);
                }
                end += 1;
            }
            // Never end a run on a wide head whose continuation was equal:
            // include the continuation so the pair travels together.
            if cells.last().is_some_and(|c| c.width() == 2) && end < width {
                if let Some(cont) = b.get(end, y) {
                    if cont.is_continuation() {
                        cells.push(cont);
                        end += 1;
                    }
                }
            }

            patches.push(Patch::new(start, y, cells));
            x = end;
        }
    }

    patches
}

// ---------------------------------------------------------------------------
// Applying
// ---------------------------------------------------------------------------

/// Apply one patch to a grid.
///
/// A patch whose run does not fit the grid is dropped whole and logged;
/// nothing is partially applied.
pub fn apply_patch(grid: &mut CellGrid, patch: &Patch) {
    if patch.y >= grid.height() || patch.end_x() > grid.width() {
        warn!(
            x = patch.x,
            y = patch.y,
            span = patch.span(),
            grid_width = grid.width(),
            grid_height = grid.height(),
            "dropping patch outside grid bounds"
        );
        return;
    }

    let mut col = patch.x;
    let mut prev_was_head = false;
    for cell in &patch.cells {
        if cell.is_continuation() {
            if !prev_was_head {
                // An orphaned continuation still occupies its column.
                col += 1;
            }
            prev_was_head = false;
            continue;
        }
        let w = cell.width().max(1) as u16;
        grid.put(col, patch.y, cell.clone());
        prev_was_head = w == 2;
        col += w;
    }
}

/// Apply patches in order.
pub fn apply_patches(grid: &mut CellGrid, patches: &[Patch]) {
    for patch in patches {
        apply_patch(grid, patch);
    }
}

// ---------------------------------------------------------------------------
// Optimizing
// ---------------------------------------------------------------------------

/// Sort patches by (row, column) and merge runs that touch.
///
/// Two patches on the same row merge when the first ends exactly where the
/// second starts. The result is stable under re-optimization.
pub fn optimize_patches(mut patches: Vec<Patch>) -> Vec<Patch> {
    if patches.is_empty() {
        return patches;
    }
    patches.sort_by_key(|p| (p.y, p.x));

    let mut merged: Vec<Patch> = Vec::with_capacity(patches.len());
    for patch in patches {
        match merged.last_mut() {
            Some(prev) if prev.y == patch.y && prev.end_x() == patch.x => {
                prev.cells.extend(patch.cells);
            }
            _ => merged.push(patch),
        }
    }
    merged
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellContent;
    use crate::style::{Color, Style};

    fn grid(w: u16, h: u16) -> CellGrid {
        CellGrid::new(w, h).unwrap()
    }

    fn cells(s: &str) -> Vec<Cell> {
        s.chars().map(|c| Cell::new(c, None)).collect()
    }

    // -----------------------------------------------------------------------
    // diff
    // -----------------------------------------------------------------------

    #[test]
    fn diff_identical_grids_is_empty() {
        let a = grid(10, 5);
        let b = grid(10, 5);
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn diff_self_is_empty() {
        let mut a = grid(10, 5);
        a.write_text(0, 0, "content", Some(Style::bold()));
        assert!(diff(&a, &a).is_empty());
    }

    #[test]
    fn diff_single_run() {
        let a = grid(10, 1);
        let mut b = grid(10, 1);
        b.set(2, 0, 'X', None);
        b.set(3, 0, 'X', None);
        b.set(4, 0, 'X', None);

        let patches = diff(&a, &b);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0], Patch::new(2, 0, cells("XXX")));
    }

    #[test]
    fn diff_detects_style_only_change() {
        let mut a = grid(4, 1);
        a.set(1, 0, 'A', None);
        let mut b = grid(4, 1);
        b.set(1, 0, 'A', Some(Style::fg(Color::Red)));

        let patches = diff(&a, &b);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].x, 1);
        assert_eq!(patches[0].cells[0].style, Some(Style::fg(Color::Red)));
    }

    #[test]
    fn diff_separate_runs_per_row() {
        let a = grid(10, 2);
        let mut b = grid(10, 2);
        b.set(0, 0, 'a', None);
        b.set(5, 0, 'b', None);
        b.set(0, 1, 'c', None);

        let patches = diff(&a, &b);
        assert_eq!(patches.len(), 3);
        assert_eq!((patches[0].x, patches[0].y), (0, 0));
        assert_eq!((patches[1].x, patches[1].y), (5, 0));
        assert_eq!((patches[2].x, patches[2].y), (0, 1));
    }

    #[test]
    fn diff_ignores_rows_beyond_smaller_grid() {
        let a = grid(4, 2);
        let mut b = grid(4, 5);
        b.set(0, 4, 'z', None);
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn diff_wide_pair_travels_together() {
        let a = grid(6, 1);
        let mut b = grid(6, 1);
        b.set(1, 0, '世', None);

        let patches = diff(&a, &b);
        assert_eq!(patches.len(), 1);
        let p = &patches[0];
        assert_eq!(p.x, 1);
        assert_eq!(p.cells.len(), 2);
        assert_eq!(p.cells[0].content, CellContent::Glyph('世'));
        assert!(p.cells[1].is_continuation());
    }

    #[test]
    fn diff_applied_reproduces_target() {
        let mut a = grid(12, 3);
        a.write_text(0, 0, "hello world", None);
        let mut b = a.clone();
        b.write_text(0, 0, "HELLO", Some(Style::bold()));
        b.write_text(2, 2, "a世b", None);

        let mut patched = a.clone();
        apply_patches(&mut patched, &diff(&a, &b));
        assert_eq!(patched.snapshot(), b.snapshot());
    }

    // -----------------------------------------------------------------------
    // apply
    // -----------------------------------------------------------------------

    #[test]
    fn apply_writes_run() {
        let mut g = grid(10, 1);
        apply_patch(&mut g, &Patch::new(3, 0, cells("ab")));
        assert_eq!(g.get(3, 0).unwrap().content, CellContent::Glyph('a'));
        assert_eq!(g.get(4, 0).unwrap().content, CellContent::Glyph('b'));
    }

    #[test]
    fn apply_wide_head_writes_pair() {
        let mut g = grid(6, 1);
        let patch = Patch::new(
            0,
            0,
            vec![
                Cell::new('世', None),
                Cell::continuation(None),
                Cell::new('x', None),
            ],
        );
        apply_patch(&mut g, &patch);
        assert_eq!(g.get(0, 0).unwrap().content, CellContent::Glyph('世'));
        assert!(g.get(1, 0).unwrap().is_continuation());
        assert_eq!(g.get(2, 0).unwrap().content, CellContent::Glyph('x'));
        g.check_wide_pairing();
    }

    #[test]
    fn apply_out_of_bounds_patch_is_dropped_whole() {
        let mut g = grid(4, 2);
        // Row out of range.
        apply_patch(&mut g, &Patch::new(0, 5, cells("ab")));
        // Run hangs past the right edge.
        apply_patch(&mut g, &Patch::new(3, 0, cells("ab")));
        assert!(!g.has_dirty());
    }

    #[test]
    fn dirty_patches_roundtrip() {
        let mut base = grid(10, 2);
        base.write_text(0, 0, "0123456789", None);
        base.clear_dirty();

        let mut mutated = base.clone();
        mutated.write_text(2, 0, "XY", Some(Style::bold()));
        mutated.set(7, 1, 'z', None);

        let mut replay = base.clone();
        apply_patches(&mut replay, &mutated.dirty_patches());
        replay.clear_dirty();
        assert_eq!(replay.snapshot(), mutated.snapshot());
    }

    // -----------------------------------------------------------------------
    // optimize
    // -----------------------------------------------------------------------

    #[test]
    fn optimize_merges_touching_runs() {
        let input = vec![
            Patch::new(0, 0, cells("A")),
            Patch::new(1, 0, cells("B")),
            Patch::new(5, 0, cells("C")),
        ];
        let out = optimize_patches(input);
        assert_eq!(
            out,
            vec![Patch::new(0, 0, cells("AB")), Patch::new(5, 0, cells("C"))]
        );
    }

    #[test]
    fn optimize_sorts_by_row_then_column() {
        let input = vec![
            Patch::new(4, 1, cells("d")),
            Patch::new(0, 0, cells("a")),
            Patch::new(2, 1, cells("c")),
            Patch::new(3, 0, cells("b")),
        ];
        let out = optimize_patches(input);
        let coords: Vec<(u16, u16)> = out.iter().map(|p| (p.y, p.x)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 3), (1, 2), (1, 4)]);
    }

    #[test]
    fn optimize_does_not_merge_across_rows() {
        let input = vec![Patch::new(0, 0, cells("ab")), Patch::new(2, 1, cells("c"))];
        let out = optimize_patches(input);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn optimize_does_not_merge_gapped_runs() {
        let input = vec![Patch::new(0, 0, cells("a")), Patch::new(2, 0, cells("b"))];
        let out = optimize_patches(input);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn optimize_is_idempotent() {
        let input = vec![
            Patch::new(0, 0, cells("A")),
            Patch::new(1, 0, cells("B")),
            Patch::new(5, 0, cells("C")),
            Patch::new(0, 2, cells("qq")),
            Patch::new(2, 2, cells("r")),
        ];
        let once = optimize_patches(input);
        let twice = optimize_patches(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn optimize_empty_input() {
        assert!(optimize_patches(Vec::new()).is_empty());
    }

    #[test]
    fn optimize_chain_of_three() {
        let input = vec![
            Patch::new(2, 3, cells("cd")),
            Patch::new(0, 3, cells("ab")),
            Patch::new(4, 3, cells("ef")),
        ];
        let out = optimize_patches(input);
        assert_eq!(out, vec![Patch::new(0, 3, cells("abcdef"))]);
    }
}
