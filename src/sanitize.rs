//! Text sanitization for the PDF's single-byte Latin-1 text encoding.
//!
//! Text is decomposed with NFKD and every character above U+00FF is dropped.
//! Accents fall away from their base letters, and anything with no Latin-1
//! form (en dashes, emoji, non-Latin scripts) vanishes silently.

use unicode_normalization::UnicodeNormalization;

/// Highest code point the document text encoding can carry.
const MAX_ENCODABLE: char = '\u{ff}';

/// Decompose and strip `text` down to what the document can encode.
pub fn sanitize(text: &str) -> String {
    text.nfkd().filter(|c| *c <= MAX_ENCODABLE).collect()
}

/// First character in `text` the document cannot encode, if any.
pub fn first_unencodable(text: &str) -> Option<char> {
    text.chars().find(|c| *c > MAX_ENCODABLE)
}

pub fn is_encodable(text: &str) -> bool {
    first_unencodable(text).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accents_are_stripped() {
        assert_eq!(sanitize("Café résumé"), "Cafe resume");
    }

    #[test]
    fn test_unencodable_characters_vanish() {
        assert_eq!(sanitize("BP 120/80 – stable ✓"), "BP 120/80  stable ");
        assert_eq!(sanitize("温度 37"), " 37");
    }

    #[test]
    fn test_compatibility_forms_are_folded() {
        assert_eq!(sanitize("ﬁne ½"), "fine 12");
        assert_eq!(sanitize("x²"), "x2");
    }

    #[test]
    fn test_ascii_and_line_breaks_survive() {
        let text = "Patient recovered well.\nDischarged in stable condition.";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let samples = [
            "Café – naïve coöperation ½ ﬁ ™ 温度 😀",
            "Ångström µg 98.6°F",
            "",
            "plain",
        ];
        for s in samples {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once);
            assert!(is_encodable(&once));
        }
    }

    #[test]
    fn test_first_unencodable() {
        assert_eq!(first_unencodable("Jane Doe"), None);
        assert_eq!(first_unencodable("José"), None);
        assert_eq!(first_unencodable("Zoë – x"), Some('–'));
    }
}
