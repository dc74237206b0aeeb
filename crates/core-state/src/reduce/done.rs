use super::{reset_to_browse, toggle};
use crate::{InstallState, State, done_viewport};
use core_events::{Action, Mode};
use core_registry::InstallOutcome;

pub(super) fn done(s: &mut State, action: &Action) {
    let Some(install) = s.install.as_mut() else {
        reset_to_browse(s);
        return;
    };
    let skipped: Vec<String> = install.skipped().map(str::to_string).collect();
    if skipped.is_empty() {
        match action {
            Action::Quit => s.mode = Mode::Quit,
            _ => reset_to_browse(s),
        }
        return;
    }
    let viewport = done_viewport(s.terminal.rows);
    match action {
        Action::Quit => s.mode = Mode::Quit,
        Action::Up => install.done = install.done.moved_by(-1, install.results.len(), viewport),
        Action::Down => install.done = install.done.moved_by(1, install.results.len(), viewport),
        Action::Select => {
            if let Some(r) = install.results.get(install.done.index)
                && r.outcome == InstallOutcome::Skipped
            {
                toggle(&mut install.force_selection, &r.name);
            }
        }
        Action::Force => {
            let targets = if install.force_selection.is_empty() {
                skipped
            } else {
                s.catalog
                    .ordered_names(|n| install.force_selection.contains(n))
            };
            let mut next = InstallState::new(targets, install.context.clone());
            next.force_mode = true;
            *install = next;
            s.mode = Mode::Installing;
        }
        Action::Confirm | Action::Escape => reset_to_browse(s),
        _ => {}
    }
}
