//! Cursor + scroll offset over a list viewport.
//!
//! Invariants maintained by every constructor here, for a list of `len` rows
//! shown through a viewport of `viewport` rows:
//! - `index < max(1, len)`
//! - `scroll <= index < scroll + viewport`

use core_events::Action;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
    pub scroll: usize,
}

impl Cursor {
    /// Move to `index` (clamped to the list) and scroll it into view.
    /// An empty list leaves the cursor untouched.
    pub fn moved_to(self, index: usize, len: usize, viewport: usize) -> Self {
        if len == 0 {
            return self;
        }
        Self {
            index: index.min(len - 1),
            scroll: self.scroll,
        }
        .in_view(viewport)
    }

    pub fn moved_by(self, delta: isize, len: usize, viewport: usize) -> Self {
        let target = self.index.saturating_add_signed(delta);
        self.moved_to(target, len, viewport)
    }

    /// Clamp after the list changed length, resetting scroll to the top first.
    pub fn refiltered(self, len: usize, viewport: usize) -> Self {
        Self {
            index: self.index.min(len.saturating_sub(1)),
            scroll: 0,
        }
        .in_view(viewport)
    }

    /// Re-establish the viewport invariant, e.g. after a resize.
    pub fn in_view(self, viewport: usize) -> Self {
        let viewport = viewport.max(1);
        let mut scroll = self.scroll;
        if self.index >= scroll + viewport {
            scroll = self.index + 1 - viewport;
        }
        if self.index < scroll {
            scroll = self.index;
        }
        Self {
            index: self.index,
            scroll,
        }
    }

    /// Apply a list navigation action. Returns `None` for non-navigation actions.
    pub fn navigate(self, action: &Action, len: usize, viewport: usize) -> Option<Self> {
        let page = viewport.max(1) as isize;
        let next = match action {
            Action::Up => self.moved_by(-1, len, viewport),
            Action::Down => self.moved_by(1, len, viewport),
            Action::PageUp => self.moved_by(-page, len, viewport),
            Action::PageDown => self.moved_by(page, len, viewport),
            Action::Home => self.moved_to(0, len, viewport),
            Action::End => self.moved_to(len.saturating_sub(1), len, viewport),
            _ => return None,
        };
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrolls_down_and_back() {
        let mut c = Cursor::default();
        for _ in 0..7 {
            c = c.moved_by(1, 10, 5);
        }
        assert_eq!(c, Cursor { index: 7, scroll: 3 });
        for _ in 0..7 {
            c = c.moved_by(-1, 10, 5);
        }
        assert_eq!(c, Cursor::default());
    }

    #[test]
    fn clamps_at_both_ends() {
        let c = Cursor::default().moved_by(-3, 4, 5);
        assert_eq!(c.index, 0);
        let c = c.moved_by(100, 4, 5);
        assert_eq!(c.index, 3);
    }

    #[test]
    fn empty_list_is_a_no_op() {
        let c = Cursor::default();
        assert_eq!(c.navigate(&Action::End, 0, 5), Some(c));
    }

    #[test]
    fn refilter_keeps_cursor_visible() {
        let c = Cursor {
            index: 12,
            scroll: 8,
        };
        assert_eq!(c.refiltered(20, 5), Cursor { index: 12, scroll: 8 });
        assert_eq!(c.refiltered(3, 5), Cursor { index: 2, scroll: 0 });
        assert_eq!(c.refiltered(0, 5), Cursor::default());
    }

    #[test]
    fn non_navigation_is_none() {
        assert_eq!(Cursor::default().navigate(&Action::Select, 3, 5), None);
    }
}
