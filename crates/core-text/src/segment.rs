//! Input normalization and grapheme segmentation.
//!
//! Typed and pasted text is normalized to NFC before it reaches a search
//! query or a bash pattern buffer so that visually identical input compares
//! equal. Truncation walks grapheme clusters so that a combining mark is never
//! separated from its base character.

use crate::width::char_width;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// NFC-normalize a chunk of user input.
pub fn normalize_input(input: &str) -> String {
    input.nfc().collect()
}

/// Iterate `(cluster, columns)` pairs over the grapheme clusters of `text`.
///
/// Text must already be free of styling sequences.
pub fn clusters(text: &str) -> impl Iterator<Item = (&str, usize)> {
    text.graphemes(true)
        .map(|g| (g, g.chars().map(char_width).sum()))
}

/// Drop the last grapheme cluster of `text`.
pub fn pop_cluster(text: &str) -> &str {
    match text.grapheme_indices(true).next_back() {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfc_equivalence() {
        let decomposed = "e\u{0301}";
        let composed = "\u{00E9}";
        assert_eq!(normalize_input(decomposed), composed);
        assert_eq!(normalize_input(composed), composed);
    }

    #[test]
    fn clusters_cover_input() {
        let s = "漢a\u{0065}\u{0301}📦";
        let joined: String = clusters(s).map(|(g, _)| g).collect();
        assert_eq!(joined, s);
        let widths: Vec<usize> = clusters(s).map(|(_, w)| w).collect();
        // Combining marks count one column like any other non-wide code point.
        assert_eq!(widths, vec![2, 1, 2, 2]);
    }

    #[test]
    fn pop_cluster_keeps_combining_pairs_together() {
        assert_eq!(pop_cluster("ae\u{0301}"), "a");
        assert_eq!(pop_cluster("ab"), "a");
        assert_eq!(pop_cluster(""), "");
    }
}
