//! State to frame.
//!
//! The layout is a box the full size of the terminal: top border, a blank
//! row, the tab bar (always two rows, the second blank when the tabs fit on
//! one), another blank row, the mode's body, and the bottom border. Bodies are
//! padded or clipped so a frame always has exactly `rows` lines.

mod dialog;
mod list;
mod perm;
mod progress;

use crate::frame::{CLEAR_LINE, Canvas, Frame};
use crate::style::{ACTIVE_TAB, CYAN, DIM, HEADING, RED, SUCCESS, Theme, WHITE, YELLOW, tab_style};
use core_events::Mode;
use core_state::{MIN_COLS, MIN_ROWS, State};
use core_text::{pad, truncate, visible_width};

pub const TITLE: &str = "AGENTDECK";

/// Render the whole screen for `state`. Pure: equal states give equal frames.
pub fn render(state: &State, theme: &Theme) -> Frame {
    let size = state.terminal;
    if size.too_small() {
        return too_small(size.cols, size.rows, *theme);
    }

    let mut canvas = Canvas::new(*theme, size.cols as usize);
    canvas.top_border(TITLE, state.selection.len());
    canvas.blank();
    let tabs = tab_lines(state, *theme, canvas.inner());
    let tab_rows = tabs.len();
    for line in &tabs {
        canvas.row(line);
    }
    if tab_rows < 2 {
        canvas.blank();
    }
    canvas.blank();

    match state.mode {
        Mode::Browse | Mode::Search | Mode::Quit => list::main_list(&mut canvas, state),
        Mode::PackDetail => list::pack_detail(&mut canvas, state),
        Mode::Confirm => dialog::confirm(&mut canvas, state),
        Mode::UninstallConfirm => dialog::uninstall_confirm(&mut canvas, state),
        Mode::Uninstalling => dialog::uninstalling(&mut canvas, state),
        Mode::Installing => progress::installing(&mut canvas, state),
        Mode::Done => progress::done(&mut canvas, state),
        Mode::PresetSelect => perm::preset_select(&mut canvas, state),
        Mode::PermissionEdit => perm::permission_edit(&mut canvas, state),
        Mode::BashEdit | Mode::BashInput => perm::bash_edit(&mut canvas, state),
    }

    canvas.finish(size.rows as usize)
}

/// Tab labels joined on one row, or split over two when they do not fit.
fn tab_lines(state: &State, theme: Theme, inner: usize) -> Vec<String> {
    let parts: Vec<String> = state
        .catalog
        .tabs()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            if i == state.active_tab {
                return theme.paint(ACTIVE_TAB, &format!("[{}]", tab.label));
            }
            let style = tab_style(&tab.id);
            match tab.label.rfind('(') {
                Some(at) => format!(
                    "{}{}",
                    theme.paint(style, &tab.label[..at]),
                    theme.paint(DIM, &tab.label[at..])
                ),
                None => theme.paint(style, &tab.label),
            }
        })
        .collect();

    let full = format!(" {}", parts.join(" "));
    if visible_width(&full) <= inner {
        return vec![full];
    }
    let mut first = Vec::new();
    let mut second = Vec::new();
    let mut used = 1;
    for part in parts {
        let w = visible_width(&part);
        if second.is_empty() && used + w + 1 <= inner {
            used += w + 1;
            first.push(part);
        } else {
            second.push(part);
        }
    }
    let mut lines = vec![format!(" {}", first.join(" "))];
    if !second.is_empty() {
        lines.push(format!(" {}", second.join(" ")));
    }
    lines
}

/// Notice shown instead of the session while the terminal is below the minimum size.
fn too_small(cols: u16, rows: u16, theme: Theme) -> Frame {
    let width = cols as usize;
    let inner = width.saturating_sub(4);
    let body = [
        String::new(),
        theme.paint(HEADING, "⚠  TERMINAL TOO SMALL"),
        String::new(),
        format!(
            "{} {}",
            theme.paint(YELLOW, "Current:"),
            theme.paint(RED.bold(), &format!("{cols}×{rows}"))
        ),
        format!(
            "{} {}",
            theme.paint(YELLOW, "Minimum:"),
            theme.paint(SUCCESS, &format!("{MIN_COLS}×{MIN_ROWS}"))
        ),
        String::new(),
        theme.paint(WHITE, "Resize your terminal to continue."),
        String::new(),
    ];

    let rule = "─".repeat(width.saturating_sub(2));
    let bar = theme.paint(CYAN, "│");
    let mut lines = vec![theme.paint(CYAN, &format!("┌{rule}┐"))];
    for text in &body {
        let text = truncate(text, inner);
        let left = inner.saturating_sub(visible_width(&text)) / 2;
        let centered = pad(&format!("{}{text}", " ".repeat(left)), inner);
        lines.push(format!("{bar} {centered} {bar}"));
    }
    lines.push(theme.paint(CYAN, &format!("└{rule}┘")));

    let rows = rows as usize;
    lines.truncate(rows);
    lines.resize(rows, String::new());
    Frame::from_lines(lines.into_iter().map(|l| format!("{CLEAR_LINE}{l}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_small_matches_terminal_rows() {
        for rows in [0u16, 3, 10, 14, 40] {
            let frame = too_small(50, rows, Theme::plain());
            assert_eq!(frame.len(), rows as usize);
            assert!(frame.lines().iter().all(|l| l.starts_with(CLEAR_LINE)));
        }
        let frame = too_small(50, 12, Theme::plain());
        assert!(frame.to_text().contains("Current: 50×12"));
        assert!(frame.to_text().contains("Minimum: 60×15"));
    }
}
