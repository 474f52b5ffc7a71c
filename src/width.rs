//! Display-width classification for terminal cells.
//!
//! Every scalar is classified as occupying 0, 1, or 2 columns. The ranges
//! below are the documented width table this crate commits to; anything not
//! covered falls through to [`unicode_width`], which picks up the remaining
//! wide symbol blocks and defaults to a single column. Exotic fonts may
//! still clip — that is out of contract.
//!
//! Tabs are control characters here (width 0); expansion to the next
//! multiple-of-8 column is the text writer's job, not the table's.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// Columns occupied by a single scalar: 0, 1, or 2.
pub fn char_width(ch: char) -> u8 {
    let cp = ch as u32;

    // Control characters render nothing.
    if cp < 0x20 || (0x7F..=0x9F).contains(&cp) {
        return 0;
    }

    if is_zero_width(cp) {
        return 0;
    }

    if is_wide(cp) {
        return 2;
    }

    UnicodeWidthChar::width(ch).unwrap_or(1).min(2) as u8
}

/// Columns occupied by one grapheme cluster.
///
/// A cluster renders as a single user-perceived character, so its width is
/// the widest scalar it contains, except that an emoji variation selector
/// (U+FE0F) forces emoji presentation and therefore two columns.
pub fn cluster_width(cluster: &str) -> u8 {
    if cluster.chars().any(|c| c as u32 == 0xFE0F) {
        return 2;
    }
    cluster.chars().map(char_width).max().unwrap_or(0)
}

/// Columns occupied by a string laid out on a single row.
pub fn str_width(s: &str) -> usize {
    s.graphemes(true).map(|g| cluster_width(g) as usize).sum()
}

/// Combining marks, joiners, variation selectors, BOM.
fn is_zero_width(cp: u32) -> bool {
    matches!(
        cp,
        0x200B..=0x200D       // zero-width space, ZWNJ, ZWJ
        | 0x0300..=0x036F     // combining diacritical marks
        | 0x1AB0..=0x1AFF     // combining diacritical marks extended
        | 0x1DC0..=0x1DFF     // combining diacritical marks supplement
        | 0x20D0..=0x20FF     // combining marks for symbols
        | 0xFE00..=0xFE0F     // variation selectors
        | 0xFE20..=0xFE2F     // combining half marks
        | 0xFEFF              // BOM / zero-width no-break space
    )
}

/// CJK, Hangul, fullwidth forms, emoji.
fn is_wide(cp: u32) -> bool {
    matches!(
        cp,
        0x1100..=0x115F       // Hangul Jamo leading consonants
        | 0x2E80..=0x9FFF     // CJK radicals through unified ideographs
        | 0xAC00..=0xD7AF     // Hangul syllables
        | 0xF900..=0xFAFF     // CJK compatibility ideographs
        | 0xFE30..=0xFE4F     // CJK compatibility forms
        | 0xFF00..=0xFF60     // fullwidth forms
        | 0xFFE0..=0xFFE6     // fullwidth signs
        | 0x1F300..=0x1FAF8   // emoji and pictographs
    )
}

// ===========================================================================
// Tests
// ===========================================================================
