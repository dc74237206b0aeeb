use super::reset_to_browse;
use crate::{PermState, State};
use core_events::{Action, Mode};

pub(super) fn confirm(s: &mut State, action: &Action) {
    match action {
        Action::Yes | Action::Confirm => match &s.install {
            Some(install) => {
                s.perm = Some(PermState::new(&install.agents));
                s.mode = Mode::PresetSelect;
            }
            None => reset_to_browse(s),
        },
        Action::No | Action::Escape => {
            s.mode = Mode::Browse;
            s.selection.clear();
            s.install = None;
            s.pack_detail = None;
        }
        _ => {}
    }
}

pub(super) fn uninstall_confirm(s: &mut State, action: &Action) {
    match action {
        Action::Yes | Action::Confirm if s.uninstall_target.is_some() => {
            s.mode = Mode::Uninstalling;
        }
        Action::Yes | Action::Confirm | Action::No | Action::Escape => {
            s.mode = Mode::Browse;
            s.uninstall_target = None;
        }
        _ => {}
    }
}
