//! Crossterm-backed defaults for the writer pipeline's boundary traits.
//!
//! The core renders against [`StyleEncoder`] and [`WriterSink`] and never
//! names a terminal library; this module provides the stock implementations
//! so the crate works end-to-end out of the box. [`TermEncoder`] serializes
//! cursor and style state to ANSI via crossterm commands; [`StdoutSink`]
//! wraps a buffered stdout handle and the usual raw-mode / alternate-screen
//! lifecycle.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor,
    queue,
    style::{
        Attribute, Color as CtColor, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor, SetUnderlineColor,
    },
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::style::{Attrs, Color, Style, UnderlineShape};
use crate::writer::{StyleEncoder, WriterSink};

// ---------------------------------------------------------------------------
// TermEncoder
// ---------------------------------------------------------------------------

/// [`StyleEncoder`] producing ANSI escape bytes through crossterm.
#[derive(Debug, Default, Clone, Copy)]
pub struct TermEncoder;

impl TermEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl StyleEncoder for TermEncoder {
    fn move_to(&self, x: u16, y: u16) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = queue!(buf, cursor::MoveTo(x, y));
        buf
    }

    fn apply_style(&self, style: &Style) -> Vec<u8> {
        let mut buf = Vec::new();
        if let Some(fg) = style.fg {
            let _ = queue!(buf, SetForegroundColor(to_crossterm(fg)));
        }
        if let Some(bg) = style.bg {
            let _ = queue!(buf, SetBackgroundColor(to_crossterm(bg)));
        }
        for attr in attribute_sequence(style) {
            let _ = queue!(buf, SetAttribute(attr));
        }
        if let Some(uc) = style.underline_color {
            let _ = queue!(buf, SetUnderlineColor(to_crossterm(uc)));
        }
        buf
    }

    fn reset_attrs(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        let _ = queue!(buf, SetAttribute(Attribute::Reset), ResetColor);
        buf
    }
}

/// Crossterm attributes for a style, underline shape included.
fn attribute_sequence(style: &Style) -> Vec<Attribute> {
    let mut attrs = Vec::new();
    if style.attrs.contains(Attrs::BOLD) {
        attrs.push(Attribute::Bold);
    }
    if style.attrs.contains(Attrs::DIM) {
        attrs.push(Attribute::Dim);
    }
    if style.attrs.contains(Attrs::ITALIC) {
        attrs.push(Attribute::Italic);
    }
    if style.attrs.contains(Attrs::UNDERLINE) {
        attrs.push(match style.underline {
            UnderlineShape::Single => Attribute::Underlined,
            UnderlineShape::Double => Attribute::DoubleUnderlined,
            UnderlineShape::Curly => Attribute::Undercurled,
            UnderlineShape::Dotted => Attribute::Underdotted,
            UnderlineShape::Dashed => Attribute::Underdashed,
        });
    }
    if style.attrs.contains(Attrs::STRIKETHROUGH) {
        attrs.push(Attribute::CrossedOut);
    }
    if style.attrs.contains(Attrs::INVERSE) {
        attrs.push(Attribute::Reverse);
    }
    if style.attrs.contains(Attrs::HIDDEN) {
        attrs.push(Attribute::Hidden);
    }
    if style.attrs.contains(Attrs::BLINK) {
        attrs.push(Attribute::SlowBlink);
    }
    if style.attrs.contains(Attrs::OVERLINE) {
        attrs.push(Attribute::OverLined);
    }
    attrs
}

/// Map the core color type onto crossterm's.
fn to_crossterm(color: Color) -> CtColor {
    match color {
        Color::Black => CtColor::Black,
        Color::Red => CtColor::DarkRed,
        Color::Green => CtColor::DarkGreen,
        Color::Yellow => CtColor::DarkYellow,
        Color::Blue => CtColor::DarkBlue,
        Color::Magenta => CtColor::DarkMagenta,
        Color::Cyan => CtColor::DarkCyan,
        Color::White => CtColor::Grey,
        Color::BrightBlack => CtColor::DarkGrey,
        Color::BrightRed => CtColor::Red,
        Color::BrightGreen => CtColor::Green,
        Color::BrightYellow => CtColor::Yellow,
        Color::BrightBlue => CtColor::Blue,
        Color::BrightMagenta => CtColor::Magenta,
        Color::BrightCyan => CtColor::Cyan,
        Color::BrightWhite => CtColor::White,
        Color::Ansi(n) => CtColor::AnsiValue(n),
        Color::Rgb { r, g, b } => CtColor::Rgb { r, g, b },
    }
}

// ---------------------------------------------------------------------------
// StdoutSink
// ---------------------------------------------------------------------------

/// [`WriterSink`] over buffered stdout.
///
/// Does NOT enter the alternate screen on creation — call
/// [`StdoutSink::enter_alt_screen`] explicitly, and pair it with
/// [`StdoutSink::leave_alt_screen`] on shutdown.
pub struct StdoutSink {
    writer: io::BufWriter<Stdout>,
    columns: u16,
    rows: u16,
}

impl StdoutSink {
    /// Create a sink sized from the current terminal.
    pub fn new() -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        Ok(Self {
            writer: io::BufWriter::new(io::stdout()),
            columns,
            rows,
        })
    }

    /// Re-query the terminal size (after a resize event).
    pub fn refresh_size(&mut self) -> io::Result<(u16, u16)> {
        let (columns, rows) = terminal::size()?;
        self.columns = columns;
        self.rows = rows;
        Ok((columns, rows))
    }

    /// Enter the alternate screen and enable raw mode.
    pub fn enter_alt_screen(&mut self) -> io::Result<()> {
        queue!(self.writer, EnterAlternateScreen, cursor::Hide)?;
        self.writer.flush()?;
        terminal::enable_raw_mode()?;
        Ok(())
    }

    /// Leave the alternate screen and disable raw mode.
    pub fn leave_alt_screen(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        queue!(self.writer, cursor::Show, LeaveAlternateScreen)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Hide the cursor.
    pub fn hide_cursor(&mut self) -> io::Result<()> {
        queue!(self.writer, cursor::Hide)?;
        self.writer.flush()
    }

    /// Show the cursor.
    pub fn show_cursor(&mut self) -> io::Result<()> {
        queue!(self.writer, cursor::Show)?;
        self.writer.flush()
    }
}

impl WriterSink for StdoutSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_to_emits_cursor_sequence() {
        let enc = TermEncoder::new();
        let bytes = enc.move_to(3, 1);
        // CSI row+1 ; col+1 H
        assert_eq!(String::from_utf8(bytes).unwrap(), "\x1b[2;4H");
    }

    #[test]
    fn reset_emits_sgr_reset() {
        let enc = TermEncoder::new();
        let s = String::from_utf8(enc.reset_attrs()).unwrap();
        assert!(s.starts_with("\x1b["));
        assert!(s.contains('m'));
    }

    #[test]
    fn empty_style_emits_nothing() {
        let enc = TermEncoder::new();
        assert!(enc.apply_style(&Style::EMPTY).is_empty());
    }

    #[test]
    fn fg_color_appears_in_output() {
        let enc = TermEncoder::new();
        let s = String::from_utf8(enc.apply_style(&Style::fg(Color::Red))).unwrap();
        assert!(!s.is_empty());
        assert!(s.contains('m'));
    }

    #[test]
    fn rgb_color_uses_truecolor_sequence() {
        let enc = TermEncoder::new();
        let style = Style::fg(Color::Rgb { r: 1, g: 2, b: 3 });
        let s = String::from_utf8(enc.apply_style(&style)).unwrap();
        assert!(s.contains("38;2;1;2;3"));
    }

    #[test]
    fn attributes_map_one_to_one() {
        let style = Style::EMPTY
            .with_attrs(Attrs::BOLD | Attrs::ITALIC | Attrs::INVERSE)
            .with_underline(UnderlineShape::Curly);
        let attrs = attribute_sequence(&style);
        assert!(attrs.contains(&Attribute::Bold));
        assert!(attrs.contains(&Attribute::Italic));
        assert!(attrs.contains(&Attribute::Reverse));
        assert!(attrs.contains(&Attribute::Undercurled));
        assert_eq!(attrs.len(), 4);
    }

    #[test]
    fn underline_shapes_select_variants() {
        for (shape, attr) in [
            (UnderlineShape::Single, Attribute::Underlined),
            (UnderlineShape::Double, Attribute::DoubleUnderlined),
            (UnderlineShape::Dotted, Attribute::Underdotted),
            (UnderlineShape::Dashed, Attribute::Underdashed),
        ] {
            let style = Style::EMPTY.with_underline(shape);
            assert!(attribute_sequence(&style).contains(&attr));
        }
    }

    #[test]
    fn color_mapping_covers_palette_and_rgb() {
        assert_eq!(to_crossterm(Color::Ansi(17)), CtColor::AnsiValue(17));
        assert_eq!(
            to_crossterm(Color::Rgb { r: 9, g: 8, b: 7 }),
            CtColor::Rgb { r: 9, g: 8, b: 7 }
        );
        assert_eq!(to_crossterm(Color::BrightWhite), CtColor::White);
        assert_eq!(to_crossterm(Color::Red), CtColor::DarkRed);
    }
}
