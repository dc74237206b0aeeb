//! Centered yes/no dialogs and the uninstall spinner.

use crate::frame::Canvas;
use crate::style::{BOLD_CYAN, BRIGHT_WHITE, CYAN, GREEN, RED, Style, Theme, WHITE};
use core_state::{InstallContext, State};
use core_text::{pad, truncate};

/// A box drawn inside the session frame, centered horizontally.
struct Dialog {
    theme: Theme,
    indent: String,
    width: usize,
}

impl Dialog {
    fn new(c: &Canvas) -> Self {
        let inner = c.inner();
        let width = inner.saturating_sub(10).min(50);
        Self {
            theme: c.theme(),
            indent: " ".repeat(inner.saturating_sub(width) / 2),
            width,
        }
    }

    fn top(&self, title: &str) -> String {
        let t = self.theme;
        // "┌─ " + title + " " + fill + "┐"
        let fill = self.width.saturating_sub(title.chars().count() + 5);
        format!(
            "{}{} {} {}",
            self.indent,
            t.paint(CYAN, "┌─"),
            t.paint(BOLD_CYAN, title),
            t.paint(CYAN, &format!("{}┐", "─".repeat(fill)))
        )
    }

    fn line(&self, content: &str) -> String {
        let inner = self.width.saturating_sub(4);
        let bar = self.theme.paint(CYAN, "│");
        format!(
            "{}{bar} {} {bar}",
            self.indent,
            pad(&truncate(content, inner), inner)
        )
    }

    fn bottom(&self) -> String {
        let rule = "─".repeat(self.width.saturating_sub(2));
        format!("{}{}", self.indent, self.theme.paint(CYAN, &format!("└{rule}┘")))
    }

    fn yes_no(&self) -> String {
        let t = self.theme;
        format!("  {} Yes  {} No", t.paint(GREEN, "[y]"), t.paint(RED, "[n]"))
    }
}

pub(super) fn confirm(c: &mut Canvas, state: &State) {
    let Some(install) = state.install.as_ref() else {
        return;
    };
    let t = c.theme();
    let dialog = Dialog::new(c);
    let count = install.agents.len();
    let title = match &install.context {
        InstallContext::Pack { label } => format!("Install pack \"{label}\" ({count} agents)?"),
        InstallContext::Agents => format!("Install {count} agent(s)?"),
    };

    c.blank();
    c.row(&dialog.top("Install"));
    c.row(&dialog.line(""));
    c.row(&dialog.line(&t.paint(Style::default().bold(), &title)));
    let max_show = state.viewport_height().saturating_sub(6).max(1);
    for name in install.agents.iter().take(max_show) {
        c.row(&dialog.line(&format!("  - {}", t.paint(WHITE, name))));
    }
    if count > max_show {
        c.row(&dialog.line(&t.paint(WHITE, &format!("  ... and {} more", count - max_show))));
    }
    c.row(&dialog.line(""));
    c.row(&dialog.line(&dialog.yes_no()));
    c.row(&dialog.bottom());
    c.blank();
}

pub(super) fn uninstall_confirm(c: &mut Canvas, state: &State) {
    let Some(name) = state.uninstall_target.as_deref() else {
        return;
    };
    let t = c.theme();
    let dialog = Dialog::new(c);
    let manifest = state.catalog.manifest();
    let location = manifest
        .get_agent(name)
        .map(|agent| format!("{}/{}", manifest.base_path, agent.relative_path()));

    c.blank();
    c.row(&dialog.top("Uninstall"));
    c.row(&dialog.line(""));
    c.row(&dialog.line(&t.paint(Style::default().bold(), &format!("Uninstall \"{name}\"?"))));
    if let Some(location) = location {
        c.row(&dialog.line(&format!("  {}", t.paint(CYAN, &location))));
    }
    c.row(&dialog.line(""));
    c.row(&dialog.line(&dialog.yes_no()));
    c.row(&dialog.bottom());
    c.blank();
}

pub(super) fn uninstalling(c: &mut Canvas, state: &State) {
    let t = c.theme();
    let name = state.uninstall_target.as_deref().unwrap_or_default();
    c.blank();
    c.row(&format!(
        "  {} {}",
        t.paint(CYAN, &state.spinner().to_string()),
        t.paint(BRIGHT_WHITE, &format!("Uninstalling {name}..."))
    ));
}
