//! Immutable catalog derived once from the manifest and shared by every state.

use core_registry::{AgentEntry, CategoryMeta, Manifest};
use std::sync::Arc;

pub const TAB_ALL: &str = "all";
pub const TAB_PACKS: &str = "packs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: String,
    pub label: String,
}

/// A pack with its agents resolved to catalog indices (unknown names dropped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackSummary {
    pub id: String,
    pub label: String,
    pub description: String,
    pub agents: Vec<usize>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Catalog {
    manifest: Arc<Manifest>,
    /// Lowercased `"{name} {description} {category}"` per agent, same order as the manifest.
    search_text: Vec<String>,
    packs: Vec<PackSummary>,
    tabs: Vec<Tab>,
}

impl Catalog {
    pub fn new(manifest: Arc<Manifest>) -> Self {
        let search_text = manifest
            .agents
            .iter()
            .map(|a| format!("{} {} {}", a.name, a.description, a.category).to_lowercase())
            .collect();
        let packs = manifest
            .packs
            .iter()
            .map(|(id, def)| PackSummary {
                id: id.clone(),
                label: def.label.clone(),
                description: def.description.clone(),
                agents: def
                    .agents
                    .iter()
                    .filter_map(|name| manifest.agents.iter().position(|a| &a.name == name))
                    .collect(),
            })
            .collect::<Vec<_>>();

        let mut tabs = vec![
            Tab {
                id: TAB_ALL.to_string(),
                label: format!("ALL({})", manifest.agents.len()),
            },
            Tab {
                id: TAB_PACKS.to_string(),
                label: format!("Packs({})", packs.len()),
            },
        ];
        for (id, meta) in &manifest.categories {
            let count = manifest.agents.iter().filter(|a| &a.category == id).count();
            tabs.push(Tab {
                id: id.clone(),
                label: format!("{}({count})", short_label(&meta.label)),
            });
        }

        Self {
            manifest,
            search_text,
            packs,
            tabs,
        }
    }

    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }

    pub fn agents(&self) -> &[AgentEntry] {
        &self.manifest.agents
    }

    pub fn agent(&self, index: usize) -> Option<&AgentEntry> {
        self.manifest.agents.get(index)
    }

    pub fn agent_index(&self, name: &str) -> Option<usize> {
        self.manifest.agents.iter().position(|a| a.name == name)
    }

    pub fn category(&self, id: &str) -> Option<&CategoryMeta> {
        self.manifest.category(id)
    }

    pub fn packs(&self) -> &[PackSummary] {
        &self.packs
    }

    pub fn pack(&self, index: usize) -> Option<&PackSummary> {
        self.packs.get(index)
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// Agent indices visible on tab `tab`, filtered by a lowercase substring query.
    /// Returns `None` for the packs tab.
    pub fn agents_for_tab(&self, tab: usize, query: &str) -> Option<Vec<usize>> {
        let id = self.tabs.get(tab).map(|t| t.id.as_str()).unwrap_or(TAB_ALL);
        if id == TAB_PACKS {
            return None;
        }
        let query = query.to_lowercase();
        Some(
            self.manifest
                .agents
                .iter()
                .enumerate()
                .filter(|(_, a)| id == TAB_ALL || a.category == id)
                .filter(|(i, _)| query.is_empty() || self.search_text[*i].contains(&query))
                .map(|(i, _)| i)
                .collect(),
        )
    }

    /// Agent names in manifest order for which `keep` holds.
    pub fn ordered_names(&self, keep: impl Fn(&str) -> bool) -> Vec<String> {
        self.manifest
            .agents
            .iter()
            .filter(|a| keep(&a.name))
            .map(|a| a.name.clone())
            .collect()
    }
}

/// Category label shortened to its first word, also cut at `&`.
fn short_label(label: &str) -> &str {
    label
        .split(|c: char| c.is_whitespace() || c == '&')
        .next()
        .unwrap_or(label)
}
