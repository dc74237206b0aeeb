use super::{begin_confirm, refilter, toggle, toggle_all};
use crate::install::InstallContext;
use crate::{Cursor, ListItem, PackDetail, SearchState, State};
use core_events::{Action, Mode};

pub(super) fn browse(s: &mut State, action: &Action) {
    if let Some(cursor) = s
        .list
        .cursor
        .navigate(action, s.list.items.len(), s.viewport_height())
    {
        s.list.cursor = cursor;
        return;
    }
    match action {
        Action::Left | Action::ShiftTab => switch_tab(s, -1),
        Action::Right | Action::Tab => switch_tab(s, 1),
        Action::Select | Action::Confirm if s.on_packs_tab() => open_pack(s),
        Action::Select => {
            if let Some(name) = s.cursor_agent().map(|a| a.name.clone()) {
                toggle(&mut s.selection, &name);
            }
        }
        Action::SelectAll => {
            let catalog = s.catalog.clone();
            let visible: Vec<&str> = s
                .list
                .items
                .iter()
                .filter_map(|item| match item {
                    ListItem::Agent(i) => catalog.agent(*i).map(|a| a.name.as_str()),
                    ListItem::Pack(_) => None,
                })
                .collect();
            toggle_all(&mut s.selection, &visible);
        }
        Action::Confirm => {
            let agents = if s.selection.is_empty() {
                s.cursor_agent().map(|a| vec![a.name.clone()]).unwrap_or_default()
            } else {
                let selection = &s.selection;
                s.catalog.ordered_names(|n| selection.contains(n))
            };
            begin_confirm(s, agents, InstallContext::Agents);
        }
        Action::Search => {
            s.mode = Mode::Search;
            s.search = SearchState {
                active: true,
                query: String::new(),
            };
            refilter(s);
        }
        Action::Uninstall => {
            let Some(name) = s.cursor_agent().map(|a| a.name.clone()) else {
                return;
            };
            if s.installed.contains(&name) {
                s.uninstall_target = Some(name);
                s.mode = Mode::UninstallConfirm;
            } else {
                s.flash = Some(format!("\"{name}\" is not installed"));
            }
        }
        Action::Quit | Action::Escape => s.mode = Mode::Quit,
        _ => {}
    }
}

/// Move to the neighbouring tab, wrapping at either end.
fn switch_tab(s: &mut State, direction: isize) {
    let count = s.catalog.tabs().len().max(1);
    s.active_tab = (s.active_tab as isize + direction).rem_euclid(count as isize) as usize;
    s.list.cursor = Cursor::default();
    refilter(s);
}

fn open_pack(s: &mut State) {
    let Some(ListItem::Pack(index)) = s.cursor_item() else {
        return;
    };
    let Some(pack) = s.catalog.pack(index) else {
        return;
    };
    s.pack_detail = Some(PackDetail {
        pack: index,
        agents: pack.agents.clone(),
        cursor: Cursor::default(),
    });
    s.mode = Mode::PackDetail;
}
