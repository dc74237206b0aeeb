//! Property checks for navigation bounds and permission cycling.

mod common;

use common::*;
use core_events::{Action, Mode};
use core_registry::permissions::{PermAction, Permission};
use core_state::{TerminalSize, create_initial_state, reduce, resize};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn nav_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Up),
        Just(Action::Down),
        Just(Action::PageUp),
        Just(Action::PageDown),
        Just(Action::Home),
        Just(Action::End),
    ]
}

proptest! {
    #[test]
    fn cursor_stays_in_bounds(
        len in 0usize..40,
        rows in 15u16..60,
        actions in proptest::collection::vec(nav_action(), 0..60),
    ) {
        let mut s = create_initial_state(manifest_with(len), TerminalSize::new(80, rows), BTreeSet::new());
        let vh = s.viewport_height();
        for a in &actions {
            s = reduce(&s, a);
            let c = s.list.cursor;
            prop_assert!(c.index < len.max(1));
            prop_assert!(c.scroll <= c.index && c.index < c.scroll + vh);
        }
    }

    #[test]
    fn down_then_up_returns_home(len in 1usize..40, k in 0usize..50) {
        let start = create_initial_state(manifest_with(len), TerminalSize::new(80, 20), BTreeSet::new());
        let mut s = start.clone();
        for _ in 0..k { s = reduce(&s, &Action::Down); }
        for _ in 0..k { s = reduce(&s, &Action::Up); }
        prop_assert_eq!(s, start);
    }

    #[test]
    fn resize_keeps_cursor_visible(len in 1usize..40, k in 0usize..40, rows in 1u16..60) {
        let mut s = create_initial_state(manifest_with(len), TerminalSize::new(80, 50), BTreeSet::new());
        for _ in 0..k { s = reduce(&s, &Action::Down); }
        let s = resize(&s, TerminalSize::new(80, rows));
        let c = s.list.cursor;
        prop_assert!(c.scroll <= c.index && c.index < c.scroll + s.viewport_height());
    }
}

fn editor_on(permission: Permission) -> core_state::State {
    let mut s = run(
        &state(),
        &[
            Action::Confirm,
            Action::Yes,
            Action::Down,
            Action::Down,
            Action::Down,
            Action::Down,
            Action::Down,
            Action::Confirm,
        ],
    );
    assert_eq!(s.mode, Mode::PermissionEdit);
    s.perm.as_mut().unwrap().perm_cursor = permission.index();
    s
}

fn action_of(s: &core_state::State, permission: Permission) -> PermAction {
    s.perm.as_ref().unwrap().permissions["postgres-pro"][&permission].flat_action()
}

#[test]
fn right_cycles_with_period_three_and_left_inverts() {
    for permission in Permission::ALL {
        let s = editor_on(permission);
        let start = action_of(&s, permission);
        let mut seen = Vec::new();
        let mut cur = s.clone();
        for _ in 0..3 {
            cur = reduce(&cur, &Action::Right);
            seen.push(action_of(&cur, permission));
        }
        assert_eq!(seen[2], start, "{permission}");
        assert_eq!(seen.iter().collect::<BTreeSet<_>>().len(), 3);
        let back = reduce(&reduce(&s, &Action::Right), &Action::Left);
        assert_eq!(back, s, "{permission}");
    }
}

#[test]
fn allow_ask_deny_order() {
    let s = editor_on(Permission::Read);
    assert_eq!(action_of(&s, Permission::Read), PermAction::Allow);
    let s = reduce(&s, &Action::Right);
    assert_eq!(action_of(&s, Permission::Read), PermAction::Ask);
    let s = reduce(&s, &Action::Right);
    assert_eq!(action_of(&s, Permission::Read), PermAction::Deny);
    let s = reduce(&s, &Action::Right);
    assert_eq!(action_of(&s, Permission::Read), PermAction::Allow);
}
