//! Snapshot rendering helpers.
//!
//! Functions for converting grids and patch lists into plain-text strings
//! suitable for snapshot testing and assertions.

use crate::grid::CellGrid;
use crate::patch::Patch;

/// Render a grid as plain text.
///
/// Each row becomes one line with trailing spaces trimmed; lines are joined
/// by `'\n'` and the final line has no trailing newline. Continuation cells
/// contribute nothing, so a wide glyph appears once and reads naturally.
pub fn grid_to_string(grid: &CellGrid) -> String {
    let mut lines = Vec::with_capacity(grid.height() as usize);

    for y in 0..grid.height() {
        let mut row = String::with_capacity(grid.width() as usize);
        for x in 0..grid.width() {
            if let Some(cell) = grid.get(x, y) {
                row.push_str(&cell.content.as_str());
            }
        }
        lines.push(row.trim_end().to_owned());
    }

    while matches!(lines.last(), Some(l) if l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Compact, readable description of a patch list: one `y x "text"` line per
/// patch, in list order.
pub fn patch_summary(patches: &[Patch]) -> Vec<String> {
    patches
        .iter()
        .map(|p| {
            let text: String = p.cells.iter().map(|c| c.content.as_str()).collect();
            format!("y{} x{} {:?}", p.y, p.x, text)
        })
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================
