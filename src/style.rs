//! Cell styling: colors, text attributes, and the `Style` record.
//!
//! `Style` is plain data with a single derived equality — grid writes, the
//! differ, and the writer pipeline all compare styles through the same
//! `PartialEq`, so a style change is detected exactly once and in one way.
//! Serialization to escape sequences happens outside the core, behind the
//! [`StyleEncoder`](crate::writer::StyleEncoder) interface.

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A terminal color: the 16 standard ANSI colors, a palette index, or 24-bit
/// RGB.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    /// 256-color palette index.
    Ansi(u8),
    /// 24-bit color.
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    /// Parse a color from a named string or `#rgb` / `#rrggbb` hex value.
    ///
    /// Names are case-insensitive; surrounding whitespace is ignored.
    /// Returns `None` if the string is not a recognized color.
    pub fn parse(s: &str) -> Option<Color> {
        let s = s.trim();

        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }

        match s.to_ascii_lowercase().as_str() {
            "black" => Some(Color::Black),
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "yellow" => Some(Color::Yellow),
            "blue" => Some(Color::Blue),
            "magenta" => Some(Color::Magenta),
            "cyan" => Some(Color::Cyan),
            "white" => Some(Color::White),
            "bright_black" | "brightblack" | "grey" | "gray" => Some(Color::BrightBlack),
            "bright_red" | "brightred" => Some(Color::BrightRed),
            "bright_green" | "brightgreen" => Some(Color::BrightGreen),
            "bright_yellow" | "brightyellow" => Some(Color::BrightYellow),
            "bright_blue" | "brightblue" => Some(Color::BrightBlue),
            "bright_magenta" | "brightmagenta" => Some(Color::BrightMagenta),
            "bright_cyan" | "brightcyan" => Some(Color::BrightCyan),
            "bright_white" | "brightwhite" => Some(Color::BrightWhite),
            _ => None,
        }
    }

    /// Parse a hex color body (without the leading `#`).
    ///
    /// Supports 6-digit (`rrggbb`) and 3-digit (`rgb`) forms.
    fn parse_hex(hex: &str) -> Option<Color> {
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color::Rgb { r, g, b })
            }
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                // Expand: 0xA -> 0xAA
                Some(Color::Rgb {
                    r: r * 16 + r,
                    g: g * 16 + g,
                    b: b * 16 + b,
                })
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Attrs
// ---------------------------------------------------------------------------

bitflags! {
    /// Text rendering attributes for a cell.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Attrs: u16 {
        const BOLD          = 1 << 0;
        const ITALIC        = 1 << 1;
        const DIM           = 1 << 2;
        const UNDERLINE     = 1 << 3;
        const STRIKETHROUGH = 1 << 4;
        const INVERSE       = 1 << 5;
        const HIDDEN        = 1 << 6;
        const BLINK         = 1 << 7;
        const OVERLINE      = 1 << 8;
    }
}

// ---------------------------------------------------------------------------
// Underline shape
// ---------------------------------------------------------------------------

/// Underline rendering variant, for terminals that distinguish them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum UnderlineShape {
    #[default]
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Visual style for a single terminal cell.
///
/// All fields are optional or defaulted; [`Style::EMPTY`] carries nothing
/// and the writer emits no sequences for it. Two styles are equal iff every
/// field matches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attrs: Attrs,
    /// Underline variant; meaningful when `attrs` contains `UNDERLINE`.
    pub underline: UnderlineShape,
    /// Separate underline color, where supported.
    pub underline_color: Option<Color>,
}

impl Style {
    /// A style carrying no colors and no attributes.
    pub const EMPTY: Style = Style {
        fg: None,
        bg: None,
        attrs: Attrs::empty(),
        underline: UnderlineShape::Single,
        underline_color: None,
    };

    /// Create an empty style.
    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Whether this style would produce no output at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Set the foreground color (builder).
    pub fn with_fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color (builder).
    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add attribute flags (builder).
    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs |= attrs;
        self
    }

    /// Enable underline with the given shape (builder).
    pub fn with_underline(mut self, shape: UnderlineShape) -> Self {
        self.attrs |= Attrs::UNDERLINE;
        self.underline = shape;
        self
    }

    /// Set the underline color (builder).
    pub fn with_underline_color(mut self, color: Color) -> Self {
        self.underline_color = Some(color);
        self
    }

    /// Shorthand for a bold style.
    pub fn bold() -> Self {
        Self::EMPTY.with_attrs(Attrs::BOLD)
    }

    /// Shorthand for a foreground-only style.
    pub fn fg(color: Color) -> Self {
        Self::EMPTY.with_fg(color)
    }

    /// Shorthand for a background-only style.
    pub fn bg(color: Color) -> Self {
        Self::EMPTY.with_bg(color)
    }
}

/// Equality over optional styles: `None` and the empty style both mean
/// "unstyled" to the writer, but remain distinct values; this helper is the
/// single comparison used when deciding whether a style *change* must be
/// emitted.
pub fn styles_equivalent(a: Option<&Style>, b: Option<&Style>) -> bool {
    let empty = Style::EMPTY;
    let a = a.unwrap_or(&empty);
    let b = b.unwrap_or(&empty);
    a == b
}

// ===========================================================================
// Tests
// ===========================================================================
