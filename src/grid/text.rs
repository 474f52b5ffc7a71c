//! Text writing on the cell grid.
//!
//! Text is iterated by user-perceived characters (grapheme clusters), so a
//! ZWJ emoji or a combining sequence lands in a single cell. Newlines return
//! to the starting column and advance the row; tabs expand with spaces to
//! the next multiple-of-8 column. Wide glyphs that would straddle the right
//! edge are dropped whole — neither half is written.

use unicode_segmentation::UnicodeSegmentation;

use crate::cell::Cell;
use crate::style::Style;

use super::CellGrid;

/// Tab stops sit at multiples of this column count.
const TAB_STOP: u16 = 8;

impl CellGrid {
    /// Write `text` starting at (x, y).
    ///
    /// `\n` moves to the next row at the original `x`; `\t` fills with
    /// styled spaces up to the next tab stop. Writing clips at the right
    /// edge and stops entirely once the row index leaves the grid.
    pub fn write_text(&mut self, x: u16, y: u16, text: &str, style: Option<Style>) {
        let mut cur_x = x;
        let mut cur_y = y;

        for grapheme in text.graphemes(true) {
            if cur_y >= self.height() {
                break;
            }
            match grapheme {
                "\n" => {
                    cur_y += 1;
                    cur_x = x;
                    continue;
                }
                "\t" => {
                    let stop = (cur_x / TAB_STOP + 1) * TAB_STOP;
                    while cur_x < stop && cur_x < self.width() {
                        self.put(cur_x, cur_y, Cell::blank_styled(style));
                        cur_x += 1;
                    }
                    continue;
                }
                "\r" => continue,
                _ => {}
            }

            let cell = Cell::from_cluster(grapheme, style);
            let w = cell.width() as u16;
            if w == 0 {
                // A bare combining mark or control scalar has no column of
                // its own; there is nothing to attach it to.
                continue;
            }
            if cur_x >= self.width() {
                continue;
            }
            if w == 2 && cur_x + 1 >= self.width() {
                // Dropped whole: neither the head nor a continuation lands.
                continue;
            }
            self.put(cur_x, cur_y, cell);
            cur_x += w;
        }
    }

    /// Clear row `y` to styled blanks, then write `text` from column 0.
    pub fn write_line(&mut self, y: u16, text: &str, style: Option<Style>) {
        self.clear_line(y, style);
        self.write_text(0, y, text, style);
    }

    /// Measure `text` as the writer would lay it out, without touching any
    /// grid: columns of the widest line, and the number of lines.
    ///
    /// Empty text measures (0, 0); otherwise the height is one more than
    /// the number of newlines.
    pub fn measure_text(text: &str) -> (u16, u16) {
        if text.is_empty() {
            return (0, 0);
        }

        let mut widest: u16 = 0;
        let mut cur: u16 = 0;
        let mut height: u16 = 1;

        for grapheme in text.graphemes(true) {
            match grapheme {
                "\n" => {
                    widest = widest.max(cur);
                    cur = 0;
                    height += 1;
                    continue;
                }
                "\t" => {
                    cur = (cur / TAB_STOP + 1) * TAB_STOP;
                    continue;
                }
                "\r" => continue,
                _ => {}
            }
            cur = cur.saturating_add(crate::width::cluster_width(grapheme) as u16);
        }
        widest = widest.max(cur);

        (widest, height)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
