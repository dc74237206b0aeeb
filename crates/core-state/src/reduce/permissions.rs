//! Preset selector, per-agent permission editor, and the bash pattern editor.

use super::{delete_word, reset_to_browse};
use crate::State;
use core_events::{Action, Mode};
use core_registry::permissions::{
    PermAction, PermValue, Permission, Preset, PresetChoice,
};
use core_text::segment::pop_cluster;

fn cycle(action: PermAction, input: &Action) -> PermAction {
    if matches!(input, Action::Right) {
        action.next()
    } else {
        action.prev()
    }
}

/// Leave the permission flow for the install run with the current batch.
fn start_install(s: &mut State) {
    match s.install.as_ref() {
        Some(install) => {
            s.install = Some(install.restarted());
            s.mode = Mode::Installing;
        }
        None => reset_to_browse(s),
    }
}

pub(super) fn preset_select(s: &mut State, action: &Action) {
    let Some(perm) = s.perm.as_mut() else {
        s.mode = Mode::Browse;
        return;
    };

    if perm.yolo_confirm {
        if matches!(action, Action::Yes) {
            perm.yolo_confirm = false;
            perm.apply_preset(Preset::Yolo);
            start_install(s);
        } else {
            perm.yolo_confirm = false;
        }
        return;
    }

    match action {
        Action::Up => perm.preset_cursor = perm.preset_cursor.saturating_sub(1),
        Action::Down => {
            perm.preset_cursor = (perm.preset_cursor + 1).min(PresetChoice::ALL.len() - 1);
        }
        Action::Confirm => match perm.preset_choice() {
            PresetChoice::Skip => {
                s.perm = None;
                start_install(s);
            }
            PresetChoice::Preset(Preset::Yolo) => perm.yolo_confirm = true,
            PresetChoice::Preset(preset) => {
                perm.apply_preset(preset);
                start_install(s);
            }
            PresetChoice::Custom => {
                perm.selected = Some(PresetChoice::Custom);
                perm.agent_index = 0;
                perm.perm_cursor = 0;
                s.mode = Mode::PermissionEdit;
            }
        },
        Action::Escape => {
            s.perm = None;
            s.mode = Mode::Confirm;
        }
        _ => {}
    }
}

pub(super) fn permission_edit(s: &mut State, action: &Action) {
    let Some(agent) = s.perm_agent().map(str::to_string) else {
        s.mode = Mode::Browse;
        return;
    };
    let batch_len = s.install.as_ref().map_or(0, |i| i.agents.len());
    let Some(perm) = s.perm.as_mut() else {
        return;
    };

    match action {
        Action::Up => perm.perm_cursor = perm.perm_cursor.saturating_sub(1),
        Action::Down => {
            perm.perm_cursor = (perm.perm_cursor + 1).min(Permission::ALL.len() - 1);
        }
        Action::Left | Action::Right => {
            let permission = perm.current_permission();
            let map = perm.permissions.entry(agent).or_default();
            let current = map
                .get(&permission)
                .cloned()
                .unwrap_or(PermValue::Flat(PermAction::Ask));
            let next = cycle(current.flat_action(), action);
            map.insert(permission, current.with_flat_action(next));
        }
        Action::Confirm if perm.current_permission() == Permission::Bash => {
            perm.bash_patterns = perm
                .permissions
                .get(&agent)
                .and_then(|m| m.get(&Permission::Bash))
                .unwrap_or(&PermValue::Flat(PermAction::Ask))
                .expand();
            perm.bash_cursor = 0;
            perm.bash_input.clear();
            s.mode = Mode::BashEdit;
        }
        Action::Tab => {
            perm.agent_index = (perm.agent_index + 1).min(batch_len.saturating_sub(1));
            perm.perm_cursor = 0;
        }
        Action::ShiftTab => {
            perm.agent_index = perm.agent_index.saturating_sub(1);
            perm.perm_cursor = 0;
        }
        Action::PermApplyAll => {
            let source = perm.permissions.get(&agent).cloned().unwrap_or_default();
            for map in perm.permissions.values_mut() {
                *map = source.clone();
            }
            s.flash = Some(format!("Applied {agent}'s permissions to all agents"));
        }
        Action::Yes => start_install(s),
        Action::Escape => s.mode = Mode::PresetSelect,
        _ => {}
    }
}

pub(super) fn bash_edit(s: &mut State, action: &Action) {
    let agent = s.perm_agent().map(str::to_string);
    let Some(perm) = s.perm.as_mut() else {
        s.mode = Mode::Browse;
        return;
    };
    // Patterns plus the trailing "add" row.
    let rows = perm.bash_patterns.len() + 1;

    match action {
        Action::Up => perm.bash_cursor = perm.bash_cursor.saturating_sub(1),
        Action::Down => perm.bash_cursor = (perm.bash_cursor + 1).min(rows - 1),
        Action::Left | Action::Right => {
            if let Some(entry) = perm.bash_patterns.get_mut(perm.bash_cursor) {
                entry.1 = cycle(entry.1, action);
            }
        }
        Action::Confirm if !perm.on_add_row() => {}
        Action::BashAdd | Action::Confirm => {
            perm.bash_input.clear();
            s.mode = Mode::BashInput;
        }
        Action::BashDelete => {
            if perm.on_add_row() {
                return;
            }
            if perm.bash_patterns.len() <= 1 {
                s.flash = Some("Cannot delete last pattern".to_string());
                return;
            }
            perm.bash_patterns.remove(perm.bash_cursor);
            perm.bash_cursor = perm.bash_cursor.min(perm.bash_patterns.len());
        }
        Action::Escape => {
            let patterns = std::mem::take(&mut perm.bash_patterns);
            if let Some(agent) = agent {
                perm.permissions
                    .entry(agent)
                    .or_default()
                    .insert(Permission::Bash, PermValue::collapse(patterns));
            }
            perm.bash_cursor = 0;
            perm.bash_input.clear();
            s.mode = Mode::PermissionEdit;
        }
        _ => {}
    }
}

pub(super) fn bash_input(s: &mut State, action: &Action) {
    let Some(perm) = s.perm.as_mut() else {
        s.mode = Mode::BashEdit;
        return;
    };
    match action {
        Action::Char(text) => perm.bash_input.push_str(text),
        Action::Backspace => perm.bash_input = pop_cluster(&perm.bash_input).to_string(),
        Action::DeleteWord => perm.bash_input = delete_word(&perm.bash_input),
        Action::Confirm => {
            let pattern = perm.bash_input.trim().to_string();
            perm.bash_input.clear();
            // Patterns are keys of the bash block: an existing one is selected, not repeated.
            if let Some(index) = perm.bash_patterns.iter().position(|(p, _)| *p == pattern) {
                perm.bash_cursor = index;
            } else if !pattern.is_empty() {
                perm.bash_patterns.push((pattern, PermAction::Ask));
                perm.bash_cursor = perm.bash_patterns.len() - 1;
            }
            s.mode = Mode::BashEdit;
        }
        Action::Escape => {
            perm.bash_input.clear();
            s.mode = Mode::BashEdit;
        }
        _ => {}
    }
}
