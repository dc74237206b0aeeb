//! Frames and the bordered canvas views draw into.

use crate::style::{CYAN, HEADING, SUCCESS, Theme};
use core_text::{pad, truncate, visible_width};

/// Erase-line prefix carried by every frame line.
pub const CLEAR_LINE: &str = "\x1b[2K";

/// One complete screen: exactly one entry per terminal row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    lines: Vec<String>,
}

impl Frame {
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The frame as newline-separated text.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Builder for the boxed session layout: every row is `│ content │` padded
/// to the terminal width.
pub(crate) struct Canvas {
    theme: Theme,
    width: usize,
    lines: Vec<String>,
}

impl Canvas {
    pub(crate) fn new(theme: Theme, width: usize) -> Self {
        Self {
            theme,
            width,
            lines: Vec::new(),
        }
    }

    pub(crate) fn theme(&self) -> Theme {
        self.theme
    }

    /// Columns available between the borders and their inner spaces.
    pub(crate) fn inner(&self) -> usize {
        self.width.saturating_sub(4)
    }

    pub(crate) fn raw(&mut self, line: &str) {
        self.lines.push(format!("{CLEAR_LINE}{line}"));
    }

    pub(crate) fn row(&mut self, content: &str) {
        let line = self.bordered(content, false);
        self.lines.push(line);
    }

    pub(crate) fn cursor_row(&mut self, content: &str) {
        let line = self.bordered(content, true);
        self.lines.push(line);
    }

    pub(crate) fn blank(&mut self) {
        self.row("");
    }

    fn bordered(&self, content: &str, highlight: bool) -> String {
        let inner = self.inner();
        let fitted = truncate(content, inner);
        let body = format!(" {} ", pad(&fitted, inner));
        let body = if highlight {
            self.theme.highlight_row(&body)
        } else {
            body
        };
        let bar = self.theme.paint(CYAN, "│");
        format!("{CLEAR_LINE}{bar}{body}{bar}")
    }

    pub(crate) fn top_border(&mut self, title: &str, selected: usize) {
        let t = self.theme;
        let prefix = format!(
            "{}{}{}",
            t.paint(CYAN, "┌─"),
            t.paint(HEADING, &format!(" {title} ")),
            t.paint(CYAN, "─")
        );
        let suffix = if selected > 0 {
            t.paint(SUCCESS, &format!("─ {selected} selected "))
        } else {
            String::new()
        };
        let fill = self
            .width
            .saturating_sub(visible_width(&prefix) + visible_width(&suffix) + 1);
        let line = format!(
            "{prefix}{}{suffix}{}",
            t.paint(CYAN, &"─".repeat(fill)),
            t.paint(CYAN, "┐")
        );
        self.raw(&line);
    }

    /// Pad or clip the body to `rows - 1` lines and close the box.
    pub(crate) fn finish(mut self, rows: usize) -> Frame {
        let body = rows.saturating_sub(1);
        self.lines.truncate(body);
        while self.lines.len() < body {
            self.blank();
        }
        if rows > 0 {
            let bottom = format!("└{}┘", "─".repeat(self.width.saturating_sub(2)));
            let line = self.theme.paint(CYAN, &bottom);
            self.raw(&line);
        }
        Frame::from_lines(self.lines)
    }
}

/// `  [key] label  [key] label ...` hint bar.
pub(crate) fn hints(theme: Theme, keys: &[(&str, &str)]) -> String {
    keys.iter()
        .map(|(key, label)| {
            format!(
                "  {} {}",
                theme.paint(CYAN, key),
                theme.paint(crate::style::WHITE, label)
            )
        })
        .collect()
}

/// Left padding that centers `text` within `width` columns.
pub(crate) fn centered(text: &str, width: usize) -> String {
    let left = width.saturating_sub(visible_width(text)) / 2;
    format!("{}{text}", " ".repeat(left))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bordered_rows_fill_the_width() {
        let mut canvas = Canvas::new(Theme::colored(), 60);
        canvas.row("hello");
        canvas.cursor_row("world");
        canvas.row(&"x".repeat(200));
        for line in &canvas.lines {
            assert_eq!(visible_width(line), 60, "{line:?}");
        }
    }

    #[test]
    fn finish_produces_requested_rows() {
        let mut canvas = Canvas::new(Theme::plain(), 60);
        canvas.top_border("AGENTDECK", 2);
        let frame = canvas.finish(20);
        assert_eq!(frame.len(), 20);
        assert!(frame.lines()[0].contains("─ 2 selected "));
        assert!(frame.lines()[19].contains('└'));

        let mut canvas = Canvas::new(Theme::plain(), 60);
        for _ in 0..40 {
            canvas.blank();
        }
        assert_eq!(canvas.finish(15).len(), 15);
    }

    #[test]
    fn top_border_spans_the_width() {
        let mut canvas = Canvas::new(Theme::plain(), 70);
        canvas.top_border("AGENTDECK", 0);
        let line = &canvas.lines[0];
        assert_eq!(visible_width(line), 70);
        assert!(line.ends_with('┐'));
    }
}
