//! Install progress and the completion summary.

use crate::frame::{Canvas, hints};
use crate::style::{BRIGHT_CYAN, BRIGHT_WHITE, CYAN, ERROR, GREEN, HEADING, RED, SUCCESS, WHITE, YELLOW};
use core_registry::InstallOutcome;
use core_state::{State, done_viewport, progress_viewport};
use core_text::{truncate, visible_width};

/// First visible row of a window of `viewport` rows kept centered on `current`.
fn centered_scroll(current: usize, total: usize, viewport: usize) -> usize {
    if total <= viewport {
        return 0;
    }
    current.saturating_sub(viewport / 2).min(total - viewport)
}

pub(super) fn installing(c: &mut Canvas, state: &State) {
    let Some(install) = state.install.as_ref() else {
        return;
    };
    let t = c.theme();
    let inner = c.inner();
    let total = install.agents.len();
    let manifest = state.catalog.manifest();

    c.blank();
    c.row(&format!("  {}", t.paint(HEADING, &format!("Installing {total} agent(s)..."))));
    c.blank();

    let viewport = progress_viewport(state.terminal.rows);
    let scroll = centered_scroll(install.current, total, viewport);
    if scroll > 0 {
        c.row(&t.paint(CYAN, &format!("  ↑ {scroll} more above")));
    }
    let end = total.min(scroll + viewport);
    for i in scroll..end {
        let name = &install.agents[i];
        let line = match install.results.get(i) {
            Some(result) => {
                let (mark, detail) = match result.outcome {
                    InstallOutcome::Installed => {
                        let path = manifest
                            .get_agent(name)
                            .map(|a| format!(" → {}/{}", manifest.base_path, a.relative_path()))
                            .unwrap_or_default();
                        (t.paint(SUCCESS, "✓"), t.paint(CYAN, &path))
                    }
                    InstallOutcome::Skipped => (t.paint(YELLOW, "⚠"), t.paint(YELLOW, " (skipped)")),
                    InstallOutcome::Failed => (t.paint(RED, "✗"), t.paint(RED, " (failed)")),
                };
                let room = inner.saturating_sub(visible_width(name) + 6).max(10);
                format!("  {mark} {}{}", t.paint(WHITE, name), truncate(&detail, room))
            }
            None if i == install.current => format!(
                "  {} {} {}",
                t.paint(CYAN, &state.spinner().to_string()),
                t.paint(BRIGHT_WHITE, name),
                t.paint(YELLOW, "(installing...)")
            ),
            None => format!(
                "  {} {} {}",
                t.paint(WHITE, "·"),
                t.paint(WHITE, name),
                t.paint(WHITE, "(pending)")
            ),
        };
        c.row(&line);
    }
    if end < total {
        c.row(&t.paint(CYAN, &format!("  ↓ {} more below", total - end)));
    }

    c.blank();
    let done = install.results.len().min(total);
    let bar = inner.saturating_sub(20).min(30);
    let (filled, pct) = if total > 0 {
        (
            (done * bar * 2 + total) / (2 * total),
            (done * 200 + total) / (2 * total),
        )
    } else {
        (0, 0)
    };
    c.row(&format!(
        "  [{done}/{total}] {}{} {pct}%",
        t.paint(CYAN, &"█".repeat(filled)),
        t.paint(WHITE, &"░".repeat(bar - filled))
    ));
}

pub(super) fn done(c: &mut Canvas, state: &State) {
    let Some(install) = state.install.as_ref() else {
        return;
    };
    let t = c.theme();
    let installed = install.count(InstallOutcome::Installed);
    let skipped = install.count(InstallOutcome::Skipped);
    let failed = install.count(InstallOutcome::Failed);

    c.blank();
    c.row(&format!(
        "  {} {}",
        t.paint(SUCCESS, "✓"),
        t.paint(SUCCESS, "Installation complete!")
    ));
    c.blank();
    c.row(&format!(
        "  {} {}  {} {}  {} {}",
        t.paint(GREEN, "Installed:"),
        t.paint(GREEN, &installed.to_string()),
        t.paint(YELLOW, "Skipped:"),
        t.paint(YELLOW, &skipped.to_string()),
        t.paint(RED, "Failed:"),
        t.paint(if failed > 0 { RED } else { WHITE }, &failed.to_string())
    ));
    c.blank();

    let viewport = done_viewport(state.terminal.rows);
    let cursor = install.done;
    for (i, result) in install
        .results
        .iter()
        .enumerate()
        .skip(cursor.scroll)
        .take(viewport)
    {
        let on = skipped > 0 && i == cursor.index;
        let pointer = if on { t.paint(HEADING, "▸") } else { " ".to_string() };
        let forced = if install.force_selection.contains(&result.name) {
            t.paint(SUCCESS, " ✓")
        } else {
            "  ".to_string()
        };
        let body = match result.outcome {
            InstallOutcome::Installed => {
                format!("{} {}", t.paint(SUCCESS, "✓"), t.paint(WHITE, &result.name))
            }
            InstallOutcome::Skipped => format!(
                "{} {} {}",
                t.paint(YELLOW, "⚠"),
                t.paint(YELLOW, &result.name),
                t.paint(YELLOW, "(already exists)")
            ),
            InstallOutcome::Failed => format!(
                "{} {} {}",
                t.paint(ERROR, "✗"),
                t.paint(RED, &result.name),
                t.paint(RED, "(failed)")
            ),
        };
        c.row(&format!("  {pointer} {body}{forced}"));
    }
    for _ in install.results.len().saturating_sub(cursor.scroll).min(viewport)..viewport {
        c.blank();
    }

    c.blank();
    if skipped > 0 {
        c.row(&hints(
            t,
            &[("[Space]", "Select"), ("[f]", "Force reinstall"), ("[Enter]", "Continue")],
        ));
    } else {
        c.row(&t.paint(BRIGHT_CYAN, "  Press any key to continue..."));
    }
}
