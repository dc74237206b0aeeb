//! Agent list, pack list and pack detail bodies.

use crate::frame::{Canvas, centered, hints};
use crate::style::{
    BRIGHT_CYAN, BRIGHT_GREEN, BRIGHT_WHITE, CYAN, DIM, DIM_WHITE, GREEN, HEADING, Style, SUCCESS,
    Theme, WHITE, YELLOW, category_style,
};
use core_registry::AgentEntry;
use core_state::{ListItem, State, pack_viewport};
use core_text::{pad, truncate};

const COL_ICON: usize = 4;
const COL_CAT: usize = 10;
const COL_NAME: usize = 30;
const COL_PACK: usize = 20;
const COL_AGENTS: usize = 8;
const DEFAULT_ICON: &str = "📦";

fn name_style(cursor: bool, selected: bool) -> Style {
    if selected {
        GREEN
    } else if cursor {
        BRIGHT_WHITE.bold()
    } else {
        BRIGHT_WHITE
    }
}

fn description(theme: Theme, text: &str, width: usize, cursor: bool) -> String {
    let style = if cursor { DIM_WHITE } else { DIM };
    theme.paint(style, &truncate(text, width))
}

fn icon<'a>(state: &'a State, category: &str) -> &'a str {
    state
        .catalog
        .category(category)
        .map(|meta| meta.icon.as_str())
        .filter(|icon| !icon.is_empty())
        .unwrap_or(DEFAULT_ICON)
}

pub(super) fn main_list(c: &mut Canvas, state: &State) {
    if state.on_packs_tab() {
        packs(c, state);
    } else {
        agents(c, state);
    }
}

fn agents(c: &mut Canvas, state: &State) {
    let t = c.theme();
    let inner = c.inner();
    c.row(&format!(
        "  {}{}{}",
        t.paint(HEADING, &pad("CATEGORY", COL_CAT + COL_ICON)),
        t.paint(HEADING, &pad("NAME", COL_NAME)),
        t.paint(HEADING, "DESCRIPTION")
    ));
    let rule = inner
        .saturating_sub(COL_CAT + COL_ICON + COL_NAME + 4)
        .clamp(5, 20);
    c.row(&format!(
        "  {}",
        t.paint(
            CYAN,
            &format!(
                "{}{}{}",
                pad(&"─".repeat(COL_CAT), COL_CAT + COL_ICON),
                pad(&"─".repeat(COL_NAME - 2), COL_NAME),
                "─".repeat(rule)
            )
        )
    ));

    let vh = state.viewport_height();
    let cursor = state.list.cursor;
    let desc_width = inner
        .saturating_sub(COL_ICON + COL_CAT + COL_NAME + 6)
        .max(10);

    if state.list.items.is_empty() {
        empty(c, state, vh);
    } else {
        for row in cursor.scroll..cursor.scroll + vh {
            let agent = match state.list.items.get(row) {
                Some(ListItem::Agent(i)) => state.catalog.agent(*i),
                _ => None,
            };
            match agent {
                Some(agent) => agent_row(c, state, agent, row == cursor.index, desc_width),
                None => c.blank(),
            }
        }
    }

    info(c, state, state.list.items.len(), vh, cursor.scroll);
    status(c, state);
}

fn agent_row(c: &mut Canvas, state: &State, agent: &AgentEntry, cursor: bool, desc_width: usize) {
    let t = c.theme();
    let selected = state.selection.contains(&agent.name);
    let marker = if cursor {
        t.paint(HEADING, "▸")
    } else if selected {
        t.paint(SUCCESS, "✓")
    } else if state.installed.contains(&agent.name) {
        t.paint(BRIGHT_GREEN, "✔")
    } else {
        " ".to_string()
    };
    let row = format!(
        " {marker} {} {}{}{}",
        icon(state, &agent.category),
        t.paint(category_style(&agent.category), &pad(&agent.category, COL_CAT)),
        t.paint(name_style(cursor, selected), &pad(&agent.name, COL_NAME)),
        description(t, &agent.description, desc_width, cursor)
    );
    if cursor {
        c.cursor_row(&row);
    } else {
        c.row(&row);
    }
}

fn packs(c: &mut Canvas, state: &State) {
    let t = c.theme();
    let inner = c.inner();
    c.row(&format!(
        "  {}{}{}",
        t.paint(HEADING, &pad("PACK", COL_PACK)),
        t.paint(HEADING, &pad("AGENTS", COL_AGENTS)),
        t.paint(HEADING, "DESCRIPTION")
    ));
    let rule = inner.saturating_sub(COL_PACK + COL_AGENTS + 4).min(15);
    c.row(&format!(
        "  {}",
        t.paint(
            CYAN,
            &format!(
                "{}{}{}",
                pad(&"─".repeat(COL_PACK - 2), COL_PACK),
                pad(&"─".repeat(COL_AGENTS - 2), COL_AGENTS),
                "─".repeat(rule)
            )
        )
    ));

    let vh = state.viewport_height();
    let cursor = state.list.cursor;
    let desc_width = inner.saturating_sub(COL_PACK + COL_AGENTS + 6).max(10);
    let packs = state.catalog.packs();

    for row in cursor.scroll..cursor.scroll + vh {
        let Some(pack) = packs.get(row) else {
            c.blank();
            continue;
        };
        let on = row == cursor.index;
        let pointer = if on { t.paint(HEADING, "▸") } else { " ".to_string() };
        let line = format!(
            " {pointer} {}{}{}",
            t.paint(name_style(on, false), &pad(&pack.label, COL_PACK - 2)),
            t.paint(BRIGHT_CYAN, &pad(&pack.agents.len().to_string(), COL_AGENTS)),
            description(t, &pack.description, desc_width, on)
        );
        if on {
            c.cursor_row(&line);
        } else {
            c.row(&line);
        }
    }

    info(c, state, packs.len(), vh, cursor.scroll);
    status(c, state);
}

fn empty(c: &mut Canvas, state: &State, vh: usize) {
    let t = c.theme();
    let inner = c.inner();
    let query = &state.search.query;
    let mid = vh / 2;
    for i in 0..vh {
        let text = if i + 1 == mid {
            if query.is_empty() {
                "No agents to display".to_string()
            } else {
                format!("No agents match \"{query}\"")
            }
        } else if i == mid && !query.is_empty() {
            "Try a different search term".to_string()
        } else {
            c.blank();
            continue;
        };
        c.row(&centered(&t.paint(YELLOW, &text), inner));
    }
}

fn legend(t: Theme) -> String {
    format!(
        "  {} {}  {} {}  {} {}",
        t.paint(BRIGHT_GREEN, "✔"),
        t.paint(DIM, "installed"),
        t.paint(BRIGHT_GREEN, "✓"),
        t.paint(DIM, "selected"),
        t.paint(BRIGHT_CYAN, "▸"),
        t.paint(DIM, "cursor")
    )
}

fn flash_line(t: Theme, message: &str) -> String {
    format!("  {} {}", t.paint(YELLOW, "⚠"), t.paint(YELLOW, message))
}

fn info(c: &mut Canvas, state: &State, total: usize, vh: usize, scroll: usize) {
    let t = c.theme();
    let line = if state.search.active {
        format!(
            "  {} {}{}",
            t.paint(HEADING, "Search:"),
            t.paint(WHITE, &state.search.query),
            t.paint(CYAN, "█")
        )
    } else if let Some(flash) = &state.flash {
        flash_line(t, flash)
    } else if total > vh {
        let range = format!("  ↑↓ {}-{} of {total}", scroll + 1, (scroll + vh).min(total));
        format!("{}{}", t.paint(CYAN, &range), legend(t))
    } else {
        legend(t)
    };
    c.row(&line);
}

fn status(c: &mut Canvas, state: &State) {
    let t = c.theme();
    let line = if state.search.active {
        hints(t, &[("[Enter]", "Apply"), ("[Esc]", "Cancel")])
    } else if !state.search.query.is_empty() {
        format!(
            "  {} {}{}",
            t.paint(WHITE, "Filter:"),
            t.paint(CYAN, &format!("\"{}\"", state.search.query)),
            hints(
                t,
                &[
                    ("[/]", "Search"),
                    ("[Space]", "Select"),
                    ("[Enter]", "Install"),
                    ("[Tab]", "Next"),
                    ("[q]", "Quit"),
                ]
            )
        )
    } else {
        hints(
            t,
            &[
                ("[/]", "Search"),
                ("[Space]", "Select"),
                ("[Enter]", "Install"),
                ("[Tab]", "Next tab"),
                ("[q]", "Quit"),
            ],
        )
    };
    c.row(&line);
}

pub(super) fn pack_detail(c: &mut Canvas, state: &State) {
    let Some(detail) = state.pack_detail.as_ref() else {
        return;
    };
    let t = c.theme();
    let inner = c.inner();
    let label = state
        .catalog
        .pack(detail.pack)
        .map(|p| p.label.as_str())
        .unwrap_or_default();

    c.row(&format!(
        "  {}  {}  Pack: {} ({} agents)",
        t.paint(WHITE, "◀ Back to Packs"),
        t.paint(CYAN, "│"),
        t.paint(HEADING, label),
        detail.agents.len()
    ));
    c.blank();
    c.row(&format!(
        "  {}{}",
        t.paint(HEADING, &pad("NAME", COL_NAME)),
        t.paint(HEADING, "DESCRIPTION")
    ));
    let rule = inner.saturating_sub(COL_NAME + 6).clamp(5, 20);
    c.row(&format!(
        "  {}",
        t.paint(
            CYAN,
            &format!("{}{}", pad(&"─".repeat(COL_NAME - 2), COL_NAME), "─".repeat(rule))
        )
    ));

    let vh = pack_viewport(state.terminal.rows);
    let desc_width = inner.saturating_sub(COL_NAME + 6).max(10);
    for row in detail.cursor.scroll..detail.cursor.scroll + vh {
        let Some(agent) = detail.agents.get(row).and_then(|i| state.catalog.agent(*i)) else {
            c.blank();
            continue;
        };
        let on = row == detail.cursor.index;
        let selected = state.selection.contains(&agent.name);
        let marker = match (selected, on) {
            (true, true) => format!("{}{}", t.paint(SUCCESS, "✓"), t.paint(HEADING, "▸")),
            (false, true) => format!(" {}", t.paint(HEADING, "▸")),
            (true, false) => format!("{} ", t.paint(SUCCESS, "✓")),
            (false, false) if state.installed.contains(&agent.name) => {
                format!("{} ", t.paint(GREEN.dim(), "✔"))
            }
            (false, false) => "  ".to_string(),
        };
        let line = format!(
            " {marker} {}{}",
            t.paint(name_style(on, selected), &pad(&agent.name, COL_NAME)),
            description(t, &agent.description, desc_width, on)
        );
        if on {
            c.cursor_row(&line);
        } else {
            c.row(&line);
        }
    }

    match &state.flash {
        Some(flash) => c.row(&flash_line(t, flash)),
        None => c.blank(),
    }
    c.row(&hints(
        t,
        &[
            ("[Space]", "Select"),
            ("[a]", "Select all"),
            ("[Enter]", "Install selected"),
            ("[Esc]", "Back"),
        ],
    ));
}
