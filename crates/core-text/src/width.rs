//! Terminal column width of styled text.
//!
//! Every width decision made by the renderer flows through `visible_width`.
//! Styling escape sequences (`ESC [ params letter`) are stripped first and
//! never contribute columns; the remaining text is measured per code point
//! with a small range table.
//!
//! Width table:
//! - Variation selectors (U+FE00..=U+FE0F): 0 columns.
//! - CJK ideographs (unified, compatibility, extensions B..G), Hangul
//!   syllables, fullwidth forms and signs, misc symbols + dingbats, and the
//!   emoji planes from U+1F300 upward: 2 columns.
//! - Everything else: 1 column.

use std::borrow::Cow;

const ESC: char = '\u{1b}';

/// Column width of a single code point.
pub fn char_width(c: char) -> usize {
    let cp = c as u32;
    if (0xFE00..=0xFE0F).contains(&cp) {
        return 0;
    }
    if is_wide(cp) { 2 } else { 1 }
}

fn is_wide(cp: u32) -> bool {
    // Emoji planes and everything above, which also covers CJK extensions B..G.
    cp >= 0x1F300
        || (0x2600..=0x27BF).contains(&cp)
        || (0x4E00..=0x9FFF).contains(&cp)
        || (0xF900..=0xFAFF).contains(&cp)
        || (0xAC00..=0xD7AF).contains(&cp)
        || (0xFF01..=0xFF60).contains(&cp)
        || (0xFFE0..=0xFFE6).contains(&cp)
}

/// Remove SGR / CSI styling sequences of the form `ESC [ [0-9;]* letter`.
///
/// Returns the input unchanged (borrowed) when it carries no escape byte.
pub fn strip_styling(text: &str) -> Cow<'_, str> {
    if !text.contains(ESC) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c == ESC
            && let Some(len) = csi_len(&text[idx..])
        {
            // Skip the remainder of the sequence (ESC already consumed).
            for _ in 1..len {
                chars.next();
            }
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Length in chars of a styling sequence at the start of `s`, if one is present.
fn csi_len(s: &str) -> Option<usize> {
    let mut it = s.chars();
    if it.next()? != ESC || it.next()? != '[' {
        return None;
    }
    let mut len = 2;
    for c in it {
        len += 1;
        if c.is_ascii_digit() || c == ';' {
            continue;
        }
        return c.is_ascii_alphabetic().then_some(len);
    }
    None
}

/// Visible terminal columns of `text` after styling is removed.
pub fn visible_width(text: &str) -> usize {
    strip_styling(text).chars().map(char_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii() {
        assert_eq!(visible_width("agent"), 5);
    }

    #[test]
    fn wide_cjk_and_hangul() {
        assert_eq!(visible_width("漢字"), 4);
        assert_eq!(visible_width("한"), 2);
    }

    #[test]
    fn emoji_and_variation_selector() {
        assert_eq!(char_width('📦'), 2);
        assert_eq!(char_width('\u{FE0F}'), 0);
        assert_eq!(visible_width("⚙\u{FE0F}"), 2);
    }

    #[test]
    fn cjk_extension_b() {
        assert_eq!(char_width('\u{20000}'), 2);
        assert_eq!(char_width('\u{30000}'), 2);
    }

    #[test]
    fn fullwidth_forms() {
        assert_eq!(char_width('Ａ'), 2);
        assert_eq!(char_width('￥'), 2);
    }

    #[test]
    fn styling_is_invisible() {
        let styled = "\u{1b}[1m\u{1b}[96mbold\u{1b}[0m";
        assert_eq!(strip_styling(styled), "bold");
        assert_eq!(visible_width(styled), 4);
    }

    #[test]
    fn clear_line_prefix_is_invisible() {
        assert_eq!(visible_width("\u{1b}[2K│ x │"), 5);
    }

    #[test]
    fn unterminated_escape_is_kept() {
        assert_eq!(strip_styling("\u{1b}[12"), "\u{1b}[12");
    }

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(strip_styling("plain"), Cow::Borrowed(_)));
    }
}
