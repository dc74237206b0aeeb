#![allow(dead_code)]

use core_events::{Action, Mode};
use core_registry::{InstallOutcome, Manifest};
use core_state::{Progress, State, TerminalSize, create_initial_state, reduce, reduce_progress};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const MANIFEST: &str = r#"{
    "repo": "acme/agents",
    "categories": {
        "data-api": { "label": "Data & API", "icon": "🗄" },
        "languages": { "label": "Languages", "icon": "🦀" },
        "misc": { "label": "Misc" }
    },
    "agents": [
        { "name": "postgres-pro", "category": "data-api", "path": "data-api/postgres-pro", "description": "PostgreSQL tuning and query plans" },
        { "name": "rust-pro", "category": "languages", "path": "languages/rust-pro", "description": "Rust systems programming" },
        { "name": "api-designer", "category": "languages", "path": "languages/api-designer", "description": "REST endpoints for posts and comments" },
        { "name": "orchestrator", "category": "misc", "path": "orchestrator", "mode": "primary", "description": "Routes work to the right subagent" }
    ],
    "packs": {
        "backend": { "label": "Backend", "description": "Server side essentials", "agents": ["postgres-pro", "api-designer"] }
    }
}"#;

pub fn manifest() -> Arc<Manifest> {
    Arc::new(Manifest::from_json(MANIFEST).unwrap())
}

pub fn state_sized(cols: u16, rows: u16, installed: &[&str]) -> State {
    create_initial_state(
        manifest(),
        TerminalSize::new(cols, rows),
        installed.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
    )
}

pub fn state() -> State {
    state_sized(100, 30, &[])
}

pub fn run(state: &State, actions: &[Action]) -> State {
    actions.iter().fold(state.clone(), |s, a| reduce(&s, a))
}

pub fn chars(text: &str) -> Action {
    Action::Char(text.to_string())
}

/// Select the first two agents and open the confirm dialog.
pub fn confirming(base: &State) -> State {
    run(
        base,
        &[Action::Select, Action::Down, Action::Select, Action::Confirm],
    )
}

/// Confirm and land on the preset selector.
pub fn preset_select(base: &State) -> State {
    run(&confirming(base), &[Action::Yes])
}

/// Custom preset: open the per-agent editor.
pub fn permission_edit(base: &State) -> State {
    let mut actions = vec![Action::Down; 5];
    actions.push(Action::Confirm);
    run(&preset_select(base), &actions)
}

/// Cursor on `bash` in the editor, then into the pattern list.
pub fn bash_edit(base: &State) -> State {
    run(
        &permission_edit(base),
        &[Action::Down, Action::Down, Action::Down, Action::Confirm],
    )
}

/// Skip preset: straight into the install run.
pub fn installing(base: &State) -> State {
    run(&preset_select(base), &[Action::Confirm])
}

pub fn done(base: &State, outcomes: &[InstallOutcome]) -> State {
    let mut s = installing(base);
    let names = s.install.as_ref().unwrap().agents.clone();
    for (name, outcome) in names.iter().zip(outcomes) {
        s = reduce_progress(
            &s,
            Progress::InstallFinished {
                name: name.clone(),
                outcome: *outcome,
            },
        );
    }
    reduce_progress(
        &s,
        Progress::InstallBatchComplete {
            installed: BTreeSet::new(),
        },
    )
}

/// One state per reachable mode, all at the size of `base`.
pub fn every_mode(base: &State) -> Vec<State> {
    let installed = State {
        installed: ["postgres-pro".to_string()].into_iter().collect(),
        ..base.clone()
    };
    let uninstall_confirm = run(&installed, &[Action::Uninstall]);
    let states = vec![
        base.clone(),
        run(base, &[Action::Search, chars("post")]),
        run(base, &[Action::Tab]),
        run(base, &[Action::Tab, Action::Confirm]),
        confirming(base),
        preset_select(base),
        permission_edit(base),
        bash_edit(base),
        run(&bash_edit(base), &[Action::BashAdd, chars("git *")]),
        installing(base),
        done(base, &[InstallOutcome::Installed, InstallOutcome::Skipped]),
        uninstall_confirm.clone(),
        run(&uninstall_confirm, &[Action::Yes]),
        run(base, &[Action::Quit]),
    ];
    let modes: BTreeSet<&str> = states.iter().map(|s| s.mode.as_str()).collect();
    assert_eq!(modes.len(), Mode::ALL.len(), "fixture misses a mode: {modes:?}");
    states
}
