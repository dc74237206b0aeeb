//! One sub-reducer per mode, composed by a single dispatch on the mode tag.
//!
//! Every sub-reducer receives a private copy of the state and edits it in
//! place; [`reduce`] hands that copy back as the new state.

mod browse;
mod confirm;
mod done;
mod pack;
mod permissions;
mod search;

use crate::install::{InstallContext, InstallState};
use crate::{ListItem, SearchState, State};
use core_events::{Action, Mode};
use std::collections::BTreeSet;

pub fn reduce(state: &State, action: &Action) -> State {
    let mut next = state.clone();
    if action.is_none() {
        return next;
    }
    match state.mode {
        Mode::Browse => browse::browse(&mut next, action),
        Mode::Search => search::search(&mut next, action),
        Mode::Confirm => confirm::confirm(&mut next, action),
        Mode::PackDetail => pack::pack_detail(&mut next, action),
        Mode::Done => done::done(&mut next, action),
        Mode::UninstallConfirm => confirm::uninstall_confirm(&mut next, action),
        Mode::PresetSelect => permissions::preset_select(&mut next, action),
        Mode::PermissionEdit => permissions::permission_edit(&mut next, action),
        Mode::BashEdit => permissions::bash_edit(&mut next, action),
        Mode::BashInput => permissions::bash_input(&mut next, action),
        Mode::Installing | Mode::Uninstalling | Mode::Quit => {}
    }
    if next.mode != state.mode {
        tracing::debug!(
            target: "state.reduce",
            from = state.mode.as_str(),
            to = next.mode.as_str(),
            action = action.as_str(),
            "transition"
        );
    }
    next
}

/// Recompute the main list for the active tab and query.
fn refilter(s: &mut State) {
    s.list.items = match s.catalog.agents_for_tab(s.active_tab, &s.search.query) {
        Some(agents) => agents.into_iter().map(ListItem::Agent).collect(),
        None => (0..s.catalog.packs().len()).map(ListItem::Pack).collect(),
    };
    s.list.cursor = s
        .list
        .cursor
        .refiltered(s.list.items.len(), s.viewport_height());
}

/// Back to an unfiltered browse list with every in-flight flow dropped.
fn reset_to_browse(s: &mut State) {
    s.mode = Mode::Browse;
    s.selection.clear();
    s.install = None;
    s.pack_detail = None;
    s.search = SearchState::default();
    s.flash = None;
    s.perm = None;
    s.uninstall_target = None;
    refilter(s);
}

fn toggle(set: &mut BTreeSet<String>, name: &str) {
    if !set.remove(name) {
        set.insert(name.to_string());
    }
}

/// Select every name, or clear them all when every one is already selected.
fn toggle_all(set: &mut BTreeSet<String>, names: &[&str]) {
    if names.is_empty() {
        return;
    }
    if names.iter().all(|n| set.contains(*n)) {
        for n in names {
            set.remove(*n);
        }
    } else {
        set.extend(names.iter().map(|n| n.to_string()));
    }
}

/// Open the confirm dialog for `agents`; an empty batch is ignored.
fn begin_confirm(s: &mut State, agents: Vec<String>, context: InstallContext) {
    if agents.is_empty() {
        return;
    }
    s.install = Some(InstallState::new(agents, context));
    s.mode = Mode::Confirm;
}

/// Keep the text up to and including the last space of the right-trimmed input.
fn delete_word(text: &str) -> String {
    match text.trim_end().rfind(' ') {
        Some(idx) => text[..=idx].to_string(),
        None => String::new(),
    }
}
