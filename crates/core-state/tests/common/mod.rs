#![allow(dead_code)]

use core_events::Action;
use core_registry::Manifest;
use core_state::{State, TerminalSize, create_initial_state, reduce};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const MANIFEST: &str = r#"{
    "repo": "acme/agents",
    "categories": {
        "data": { "label": "Data & AI", "icon": "🗄" },
        "languages": { "label": "Languages", "icon": "🦀" }
    },
    "agents": [
        { "name": "postgres-pro", "category": "data", "path": "data/postgres-pro", "description": "PostgreSQL tuning" },
        { "name": "rust-pro", "category": "languages", "path": "languages/rust-pro", "description": "Rust systems programming" },
        { "name": "api-designer", "category": "languages", "path": "languages/api-designer", "description": "REST endpoints for posts and comments" }
    ],
    "packs": {
        "backend": { "label": "Backend", "description": "Server side", "agents": ["postgres-pro", "api-designer", "missing"] }
    }
}"#;

pub fn manifest() -> Arc<Manifest> {
    Arc::new(Manifest::from_json(MANIFEST).unwrap())
}

pub fn state() -> State {
    state_with_installed(&[])
}

pub fn state_with_installed(installed: &[&str]) -> State {
    create_initial_state(
        manifest(),
        TerminalSize::new(100, 30),
        installed.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
    )
}

/// Manifest with `n` agents in one category.
pub fn manifest_with(n: usize) -> Arc<Manifest> {
    let agents: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{ "name": "agent-{i}", "category": "misc", "path": "misc/agent-{i}", "description": "number {i}" }}"#
            )
        })
        .collect();
    let raw = format!(
        r#"{{ "categories": {{ "misc": {{ "label": "Misc" }} }}, "agents": [{}] }}"#,
        agents.join(",")
    );
    Arc::new(Manifest::from_json(&raw).unwrap())
}

pub fn run(state: &State, actions: &[Action]) -> State {
    actions.iter().fold(state.clone(), |s, a| reduce(&s, a))
}

pub fn chars(text: &str) -> Action {
    Action::Char(text.to_string())
}

pub fn visible_names(state: &State) -> Vec<String> {
    state
        .list
        .items
        .iter()
        .filter_map(|item| match item {
            core_state::ListItem::Agent(i) => state.catalog.agent(*i).map(|a| a.name.clone()),
            core_state::ListItem::Pack(_) => None,
        })
        .collect()
}
