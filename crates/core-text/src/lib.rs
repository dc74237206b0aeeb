//! Unicode-aware text metrics for the session renderer.
//!
//! `visible_width` ignores styling escapes; `pad` and `truncate` are built on
//! it so that every bordered row of a frame lands on the same column.

pub mod segment;
pub mod width;

pub use segment::normalize_input;
pub use width::{char_width, strip_styling, visible_width};

/// Marker appended by [`truncate`] when text does not fit.
pub const ELLIPSIS: char = '…';

/// Right-pad `text` with spaces to `width` visible columns.
///
/// Text already at or beyond `width` is returned unchanged.
pub fn pad(text: &str, width: usize) -> String {
    let visible = visible_width(text);
    let mut out = String::with_capacity(text.len() + width.saturating_sub(visible));
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(visible)));
    out
}

/// Fit `text` into `max` visible columns.
///
/// Text that already fits is returned unchanged with its styling intact.
/// Otherwise styling is dropped, whole grapheme clusters are kept while they
/// fit in `max - 1` columns, and an ellipsis fills the final column.
pub fn truncate(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if visible_width(text) <= max {
        return text.to_string();
    }
    let plain = strip_styling(text);
    let budget = max - 1;
    let mut used = 0;
    let mut out = String::new();
    for (cluster, w) in segment::clusters(&plain) {
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(cluster);
    }
    out.push(ELLIPSIS);
    out
}
