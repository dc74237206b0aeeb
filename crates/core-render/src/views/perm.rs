//! Preset selector, per-agent permission editor and bash pattern editor.

use crate::frame::{Canvas, hints};
use crate::style::{
    BRIGHT_WHITE, CYAN, DIM, ERROR, GREEN, HEADING, RED, Style, Theme, WHITE, YELLOW,
};
use core_events::Mode;
use core_registry::permissions::{
    PermAction, PermValue, Permission, Preset, PresetChoice, WarningLevel, permission_warning,
    preset_warning,
};
use core_state::State;
use core_text::pad;

const COL_CHOICE: usize = 14;
const COL_PERMISSION: usize = 22;
const COL_PATTERN: usize = 32;

fn action_style(action: PermAction) -> Style {
    match action {
        PermAction::Allow => GREEN,
        PermAction::Ask => YELLOW,
        PermAction::Deny => RED,
    }
}

fn level_style(level: WarningLevel) -> Style {
    match level {
        WarningLevel::Critical => ERROR,
        WarningLevel::High | WarningLevel::Medium => YELLOW,
        WarningLevel::Info => CYAN,
    }
}

fn pointer(t: Theme, on: bool) -> String {
    if on { t.paint(HEADING, "▸") } else { " ".to_string() }
}

/// First row of a window of `viewport` rows that keeps `cursor` visible.
fn follow(cursor: usize, viewport: usize) -> usize {
    (cursor + 1).saturating_sub(viewport.max(1))
}

pub(super) fn preset_select(c: &mut Canvas, state: &State) {
    let Some(perm) = state.perm.as_ref() else {
        return;
    };
    let t = c.theme();
    let count = state.install.as_ref().map_or(0, |i| i.agents.len());
    // Spacer rows only when the body has room for them.
    let roomy = state.viewport_height() >= 7;

    c.row(&format!(
        "  {}",
        t.paint(HEADING, &format!("Permissions for {count} agent(s)"))
    ));
    if roomy {
        c.blank();
    }
    for (i, choice) in PresetChoice::ALL.iter().enumerate() {
        let on = i == perm.preset_cursor;
        let name_style = match choice {
            PresetChoice::Preset(Preset::Yolo) => RED.bold(),
            _ if on => BRIGHT_WHITE.bold(),
            _ => BRIGHT_WHITE,
        };
        let line = format!(
            " {} {}{}",
            pointer(t, on),
            t.paint(name_style, &pad(choice.label(), COL_CHOICE)),
            t.paint(DIM, choice.description())
        );
        if on {
            c.cursor_row(&line);
        } else {
            c.row(&line);
        }
    }
    if roomy {
        c.blank();
    }

    let detail = if perm.yolo_confirm {
        t.paint(
            ERROR,
            "  ⛔ yolo allows everything. Press [y] to confirm, any other key to go back.",
        )
    } else {
        match perm.preset_choice() {
            PresetChoice::Preset(preset) => {
                let warning = preset_warning(preset);
                t.paint(
                    level_style(warning.level),
                    &format!("  {} {}", warning.level.icon(), warning.message),
                )
            }
            PresetChoice::Skip => t.paint(DIM, "  ℹ Agent files are installed unchanged."),
            PresetChoice::Custom => {
                t.paint(DIM, "  ℹ Edit every permission for each agent in the batch.")
            }
        }
    };
    c.row(&detail);
    c.row(&hints(
        t,
        &[("[↑↓]", "Move"), ("[Enter]", "Choose"), ("[Esc]", "Back")],
    ));
}

pub(super) fn permission_edit(c: &mut Canvas, state: &State) {
    let Some(perm) = state.perm.as_ref() else {
        return;
    };
    let t = c.theme();
    let agent = state.perm_agent().unwrap_or_default();
    let count = state.install.as_ref().map_or(0, |i| i.agents.len());
    let map = perm.permissions.get(agent);

    c.row(&format!(
        "  {}  {} {}",
        t.paint(HEADING, "Permissions"),
        t.paint(BRIGHT_WHITE.bold(), agent),
        t.paint(DIM, &format!("({}/{count})", perm.agent_index + 1))
    ));
    c.blank();

    let viewport = state.viewport_height();
    let scroll = follow(perm.perm_cursor, viewport);
    for row in scroll..scroll + viewport {
        let Some(permission) = Permission::ALL.get(row) else {
            c.blank();
            continue;
        };
        let on = row == perm.perm_cursor;
        let value = map
            .and_then(|m| m.get(permission))
            .cloned()
            .unwrap_or(PermValue::Flat(PermAction::Ask));
        let action = value.flat_action();
        let mut shown = t.paint(action_style(action), action.as_str());
        if on {
            shown = format!("◀ {shown} ▶");
        }
        if let PermValue::Patterned(patterns) = &value {
            shown.push_str(&t.paint(DIM, &format!("  ({} patterns)", patterns.len())));
        }
        let line = format!(
            " {} {}{shown}",
            pointer(t, on),
            t.paint(WHITE, &pad(permission.as_str(), COL_PERMISSION))
        );
        if on {
            c.cursor_row(&line);
        } else {
            c.row(&line);
        }
    }

    let current = perm.current_permission();
    let action = map
        .and_then(|m| m.get(&current))
        .map_or(PermAction::Ask, PermValue::flat_action);
    match (&state.flash, permission_warning(current, action)) {
        (Some(flash), _) => c.row(&format!("  {}", t.paint(YELLOW, flash))),
        (None, Some(warning)) => c.row(&t.paint(
            level_style(warning.level),
            &format!("  {} {}", warning.level.icon(), warning.message),
        )),
        (None, None) => c.blank(),
    }

    let mut keys = vec![("[←→]", "Change"), ("[Tab]", "Agent")];
    if current == Permission::Bash {
        keys.push(("[Enter]", "Patterns"));
    }
    keys.extend([("[a]", "Apply to all"), ("[y]", "Install"), ("[Esc]", "Back")]);
    c.row(&hints(t, &keys));
}

pub(super) fn bash_edit(c: &mut Canvas, state: &State) {
    let Some(perm) = state.perm.as_ref() else {
        return;
    };
    let t = c.theme();
    let agent = state.perm_agent().unwrap_or_default();

    c.row(&format!(
        "  {}  {}",
        t.paint(HEADING, "Bash patterns"),
        t.paint(BRIGHT_WHITE.bold(), agent)
    ));
    c.blank();

    let viewport = state.viewport_height();
    let scroll = follow(perm.bash_cursor, viewport);
    for row in scroll..scroll + viewport {
        let on = row == perm.bash_cursor;
        let line = match perm.bash_patterns.get(row) {
            Some((pattern, action)) => {
                let mut shown = t.paint(action_style(*action), action.as_str());
                if on {
                    shown = format!("◀ {shown} ▶");
                }
                format!(
                    " {} {}{shown}",
                    pointer(t, on),
                    t.paint(WHITE, &pad(pattern, COL_PATTERN))
                )
            }
            None if row == perm.bash_patterns.len() => {
                format!(" {} {}", pointer(t, on), t.paint(CYAN, "+ Add pattern"))
            }
            None => {
                c.blank();
                continue;
            }
        };
        if on {
            c.cursor_row(&line);
        } else {
            c.row(&line);
        }
    }

    if state.mode == Mode::BashInput {
        c.row(&format!(
            "  {} {}{}",
            t.paint(HEADING, "Pattern:"),
            t.paint(WHITE, &perm.bash_input),
            t.paint(CYAN, "█")
        ));
        c.row(&hints(t, &[("[Enter]", "Add"), ("[Esc]", "Cancel")]));
    } else {
        match &state.flash {
            Some(flash) => c.row(&format!("  {}", t.paint(YELLOW, flash))),
            None => c.blank(),
        }
        c.row(&hints(
            t,
            &[
                ("[←→]", "Change"),
                ("[a]", "Add"),
                ("[d]", "Delete"),
                ("[Esc]", "Done"),
            ],
        ));
    }
}
