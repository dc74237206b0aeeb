use super::{delete_word, refilter};
use crate::{SearchState, State};
use core_events::{Action, Mode};
use core_text::segment::pop_cluster;

pub(super) fn search(s: &mut State, action: &Action) {
    match action {
        Action::Char(text) => {
            s.search.query.push_str(text);
            refilter(s);
        }
        Action::Backspace => {
            s.search.query = pop_cluster(&s.search.query).to_string();
            refilter(s);
        }
        Action::DeleteWord => {
            s.search.query = delete_word(&s.search.query);
            refilter(s);
        }
        Action::Escape => {
            s.mode = Mode::Browse;
            s.search = SearchState::default();
            refilter(s);
        }
        Action::Confirm => {
            s.mode = Mode::Browse;
            s.search.active = false;
        }
        _ => {}
    }
}
