//! Line and box drawing primitives.
//!
//! Lines use Bresenham's algorithm over signed endpoints and clip to the
//! grid cell by cell. Boxes come in four border variants with a fixed glyph
//! table; degenerate rectangles collapse to single lines.

use crate::cell::Cell;
use crate::style::Style;

use super::CellGrid;

// ---------------------------------------------------------------------------
// Box glyphs
// ---------------------------------------------------------------------------

/// Border variant for [`CellGrid::draw_box`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BoxKind {
    #[default]
    Single,
    Double,
    Rounded,
    Thick,
}

/// Corner and edge glyphs: (top-left, top-right, bottom-left, bottom-right,
/// horizontal, vertical).
struct BoxGlyphs {
    tl: char,
    tr: char,
    bl: char,
    br: char,
    h: char,
    v: char,
}

impl BoxKind {
    fn glyphs(self) -> BoxGlyphs {
        match self {
            BoxKind::Single => BoxGlyphs {
                tl: '┌',
                tr: '┐',
                bl: '└',
                br: '┘',
                h: '─',
                v: '│',
            },
            BoxKind::Double => BoxGlyphs {
                tl: '╔',
                tr: '╗',
                bl: '╚',
                br: '╝',
                h: '═',
                v: '║',
            },
            BoxKind::Rounded => BoxGlyphs {
                tl: '╭',
                tr: '╮',
                bl: '╰',
                br: '╯',
                h: '─',
                v: '│',
            },
            BoxKind::Thick => BoxGlyphs {
                tl: '┏',
                tr: '┓',
                bl: '┗',
                br: '┛',
                h: '━',
                v: '┃',
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

impl CellGrid {
    /// Draw a straight line of `ch` from `from` to `to` (inclusive).
    ///
    /// Bresenham's algorithm; each touched cell is written exactly once.
    /// Segments outside the grid are clipped away cell by cell.
    pub fn draw_line(
        &mut self,
        from: (i32, i32),
        to: (i32, i32),
        ch: char,
        style: Option<Style>,
    ) {
        let (mut x, mut y) = from;
        let (x1, y1) = to;

        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put_signed(x, y, Cell::new(ch, style));
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw a box border over `rect` with the given variant.
    ///
    /// One-cell-thin rectangles degrade to plain lines. When `fill` is set,
    /// the interior becomes spaces carrying the same style.
    pub fn draw_box(
        &mut self,
        rect: crate::geometry::Rect,
        kind: BoxKind,
        style: Option<Style>,
        fill: bool,
    ) {
        if rect.is_empty() {
            return;
        }
        let g = kind.glyphs();
        let (x0, y0) = (rect.x, rect.y);
        let (x1, y1) = (rect.right() - 1, rect.bottom() - 1);

        if rect.width == 1 && rect.height == 1 {
            self.put_signed(x0, y0, Cell::new(g.h, style));
            return;
        }
        if rect.height == 1 {
            self.draw_line((x0, y0), (x1, y0), g.h, style);
            return;
        }
        if rect.width == 1 {
            self.draw_line((x0, y0), (x0, y1), g.v, style);
            return;
        }

        self.put_signed(x0, y0, Cell::new(g.tl, style));
        self.put_signed(x1, y0, Cell::new(g.tr, style));
        self.put_signed(x0, y1, Cell::new(g.bl, style));
        self.put_signed(x1, y1, Cell::new(g.br, style));

        for x in x0 + 1..x1 {
            self.put_signed(x, y0, Cell::new(g.h, style));
            self.put_signed(x, y1, Cell::new(g.h, style));
        }
        for y in y0 + 1..y1 {
            self.put_signed(x0, y, Cell::new(g.v, style));
            self.put_signed(x1, y, Cell::new(g.v, style));
        }

        if fill && rect.width > 2 && rect.height > 2 {
            self.clear_rect(
                crate::geometry::Rect::new(x0 + 1, y0 + 1, rect.width - 2, rect.height - 2),
                style,
            );
        }
    }

    /// Bounds-checked write for signed coordinates.
    fn put_signed(&mut self, x: i32, y: i32, cell: Cell) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        self.put(x as u16, y as u16, cell);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
