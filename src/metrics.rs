//! Advance widths for the two standard PDF fonts the document uses.
//!
//! Widths are in 1/1000 em for the printable ASCII range, from the Adobe core
//! font metrics. Latin-1 characters above ASCII use an average glyph width.

use crate::layout::FontStyle;

const FIRST: u32 = 0x20;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const FALLBACK: u16 = 556;

/// Points to millimetres.
pub const PT_TO_MM: f32 = 25.4 / 72.0;

fn glyph_width(c: char, style: FontStyle) -> u16 {
    let table = match style {
        FontStyle::Regular => &HELVETICA,
        FontStyle::Bold => &HELVETICA_BOLD,
    };
    (c as u32)
        .checked_sub(FIRST)
        .and_then(|i| table.get(i as usize))
        .copied()
        .unwrap_or(FALLBACK)
}

/// Rendered width of `text` in millimetres.
pub fn text_width(text: &str, style: FontStyle, size_pt: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(glyph_width(c, style))).sum();
    units as f32 / 1000.0 * size_pt * PT_TO_MM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        assert_eq!(glyph_width(' ', FontStyle::Regular), 278);
        assert_eq!(glyph_width('W', FontStyle::Regular), 944);
        assert_eq!(glyph_width('~', FontStyle::Bold), 584);
        assert_eq!(glyph_width('b', FontStyle::Bold), 611);
        assert_eq!(glyph_width('é', FontStyle::Regular), FALLBACK);
    }

    #[test]
    fn test_width_scales_with_size() {
        let small = text_width("DISCHARGE SUMMARY", FontStyle::Bold, 7.0);
        let large = text_width("DISCHARGE SUMMARY", FontStyle::Bold, 14.0);
        assert!((large - 2.0 * small).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_wider() {
        let text = "Treating Consultant";
        assert!(text_width(text, FontStyle::Bold, 11.0) > text_width(text, FontStyle::Regular, 11.0));
    }
}
