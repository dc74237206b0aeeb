use super::{begin_confirm, toggle, toggle_all};
use crate::install::InstallContext;
use crate::{State, pack_viewport};
use core_events::{Action, Mode};
use std::collections::BTreeSet;

pub(super) fn pack_detail(s: &mut State, action: &Action) {
    let Some(detail) = s.pack_detail.as_mut() else {
        s.mode = Mode::Browse;
        return;
    };
    let viewport = pack_viewport(s.terminal.rows);
    if let Some(cursor) = detail.cursor.navigate(action, detail.agents.len(), viewport) {
        detail.cursor = cursor;
        return;
    }
    let catalog = s.catalog.clone();
    let names: Vec<&str> = detail
        .agents
        .iter()
        .filter_map(|i| catalog.agent(*i).map(|a| a.name.as_str()))
        .collect();
    match action {
        Action::Select => {
            if let Some(name) = names.get(detail.cursor.index) {
                toggle(&mut s.selection, name);
            }
        }
        Action::SelectAll => toggle_all(&mut s.selection, &names),
        Action::Confirm => {
            let selection: BTreeSet<String> = if s.selection.is_empty() {
                names
                    .iter()
                    .filter(|n| !s.installed.contains(**n))
                    .map(|n| n.to_string())
                    .collect()
            } else {
                s.selection.clone()
            };
            if selection.is_empty() {
                s.flash = Some("All agents in this pack are already installed".to_string());
                return;
            }
            let label = catalog
                .pack(detail.pack)
                .map(|p| p.label.clone())
                .unwrap_or_default();
            let agents = catalog.ordered_names(|n| selection.contains(n));
            s.selection = selection;
            begin_confirm(s, agents, InstallContext::Pack { label });
        }
        Action::Escape => {
            s.mode = Mode::Browse;
            s.pack_detail = None;
            s.flash = None;
        }
        _ => {}
    }
}
