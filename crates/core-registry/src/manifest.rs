//! Agent manifest model and query helpers.

use crate::RegistryError;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_BASE_PATH: &str = ".opencode/agents";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    Primary,
    #[default]
    Subagent,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentEntry {
    pub name: String,
    pub category: String,
    pub path: String,
    #[serde(default)]
    pub mode: AgentMode,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryMeta {
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackDef {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub agents: Vec<String>,
}

/// The catalog of installable agents.
///
/// Categories and packs keep their file order; the session's tab bar and pack
/// list are laid out in that order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default, deserialize_with = "ordered::deserialize")]
    pub categories: Vec<(String, CategoryMeta)>,
    #[serde(default)]
    pub agents: Vec<AgentEntry>,
    #[serde(default, deserialize_with = "ordered::deserialize")]
    pub packs: Vec<(String, PackDef)>,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

fn lenient_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(d)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Agent names are used as file names, so they are restricted to a safe alphabet:
/// `^[a-z0-9][a-z0-9._-]*$`.
pub fn is_safe_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
}

impl AgentEntry {
    /// File location below the manifest's base path.
    pub fn relative_path(&self) -> String {
        match self.mode {
            AgentMode::Primary => format!("{}.md", self.name),
            AgentMode::Subagent => format!("{}/{}.md", self.category, self.name),
        }
    }
}

impl Manifest {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let raw = std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
        let manifest = Self::from_json(&raw).map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            target: "registry.manifest",
            agents = manifest.agents.len(),
            categories = manifest.categories.len(),
            packs = manifest.packs.len(),
            "manifest_loaded"
        );
        Ok(manifest)
    }

    pub fn get_agent(&self, name: &str) -> Option<&AgentEntry> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn agents_in_category(&self, category: &str) -> Vec<&AgentEntry> {
        self.agents.iter().filter(|a| a.category == category).collect()
    }

    pub fn category_ids(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(id, _)| id.as_str())
    }

    pub fn category(&self, id: &str) -> Option<&CategoryMeta> {
        self.categories
            .iter()
            .find(|(cid, _)| cid == id)
            .map(|(_, meta)| meta)
    }

    pub fn pack_ids(&self) -> impl Iterator<Item = &str> {
        self.packs.iter().map(|(id, _)| id.as_str())
    }

    pub fn get_pack(&self, id: &str) -> Option<&PackDef> {
        self.packs.iter().find(|(pid, _)| pid == id).map(|(_, p)| p)
    }

    /// Agents of a pack in pack order. Names missing from the catalog are skipped.
    pub fn resolve_pack_agents(&self, id: &str) -> Vec<&AgentEntry> {
        let Some(pack) = self.get_pack(id) else {
            return Vec::new();
        };
        pack.agents
            .iter()
            .filter_map(|name| self.get_agent(name))
            .collect()
    }

    /// Case-insensitive substring search over name, description, category and tags.
    /// A blank query matches nothing.
    pub fn search_agents(&self, query: &str) -> Vec<&AgentEntry> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return Vec::new();
        }
        self.agents
            .iter()
            .filter(|a| {
                a.name.to_lowercase().contains(&q)
                    || a.description.to_lowercase().contains(&q)
                    || a.category.to_lowercase().contains(&q)
                    || a.tags.iter().any(|t| t.to_lowercase().contains(&q))
            })
            .collect()
    }
}

mod ordered {
    use serde::de::{self, Deserialize, Deserializer, MapAccess};
    use std::fmt;
    use std::marker::PhantomData;

    /// Deserialize a JSON object into its entries, keeping document order.
    pub fn deserialize<'de, D, V>(d: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct Entries<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> de::Visitor<'de> for Entries<V> {
            type Value = Vec<(String, V)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, V>()? {
                    out.push(entry);
                }
                Ok(out)
            }
        }

        d.deserialize_map(Entries(PhantomData))
    }
}
