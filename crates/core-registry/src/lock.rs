//! Hash-based lock file used to tell installed, modified and foreign agent
//! files apart. The digest detects changes; it is not a security boundary.

use crate::RegistryError;
use crate::manifest::Manifest;
use crate::paths::destination;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub const LOCK_FILENAME: &str = ".manifest-lock.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockEntry {
    pub sha256: String,
    pub installed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub type LockData = BTreeMap<String, LockEntry>;

/// On-disk state of one manifest agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// File present and its digest matches the lock entry.
    Installed,
    /// File present but modified since it was recorded.
    Outdated,
    /// No file.
    New,
    /// File present without a lock entry (manual copy or pre-lock install).
    Unknown,
}

impl AgentState {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentState::Installed => "installed",
            AgentState::Outdated => "outdated",
            AgentState::New => "new",
            AgentState::Unknown => "unknown",
        }
    }
}

pub fn sha256_hex(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Handle on `{root}/.opencode/agents/.manifest-lock.json`.
#[derive(Debug, Clone)]
pub struct LockFile {
    path: PathBuf,
}

impl LockFile {
    pub fn for_root(root: &Path) -> Self {
        Self {
            path: root
                .join(".opencode")
                .join("agents")
                .join(LOCK_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the lock. A missing, unreadable or non-object file reads as empty;
    /// malformed entries are dropped individually.
    pub fn read(&self) -> LockData {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return LockData::new();
        };
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(&raw)
        else {
            tracing::warn!(target: "registry.lock", path = %self.path.display(), "lock_unreadable");
            return LockData::new();
        };
        map.into_iter()
            .filter_map(|(name, value)| {
                serde_json::from_value::<LockEntry>(value)
                    .ok()
                    .map(|entry| (name, entry))
            })
            .collect()
    }

    pub fn write(&self, data: &LockData) -> Result<(), RegistryError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| RegistryError::io(dir, e))?;
        }
        let mut json = serde_json::to_string_pretty(data).map_err(|source| RegistryError::Encode {
            what: "lock file",
            source,
        })?;
        json.push('\n');
        std::fs::write(&self.path, json).map_err(|e| RegistryError::io(&self.path, e))
    }

    /// Record (or refresh) an installation. The first `installedAt` is kept.
    pub fn record_install(&self, name: &str, content: &[u8]) -> Result<(), RegistryError> {
        let mut lock = self.read();
        let now = Utc::now();
        let installed_at = lock.get(name).map(|e| e.installed_at).unwrap_or(now);
        lock.insert(
            name.to_string(),
            LockEntry {
                sha256: sha256_hex(content),
                installed_at,
                updated_at: now,
            },
        );
        tracing::debug!(target: "registry.lock", agent = name, "record_install");
        self.write(&lock)
    }

    pub fn remove_entry(&self, name: &str) -> Result<(), RegistryError> {
        let mut lock = self.read();
        lock.remove(name);
        tracing::debug!(target: "registry.lock", agent = name, "remove_entry");
        self.write(&lock)
    }
}

/// Classify every manifest agent against the files under `root`.
pub fn detect_agent_states(manifest: &Manifest, root: &Path) -> BTreeMap<String, AgentState> {
    let lock = LockFile::for_root(root).read();
    manifest
        .agents
        .iter()
        .map(|agent| {
            let state = match destination(manifest, agent, root) {
                Ok(dest) => match std::fs::read(&dest.absolute) {
                    Err(_) => AgentState::New,
                    Ok(content) => match lock.get(&agent.name) {
                        None => AgentState::Unknown,
                        Some(entry) if entry.sha256 == sha256_hex(&content) => {
                            AgentState::Installed
                        }
                        Some(_) => AgentState::Outdated,
                    },
                },
                Err(_) => AgentState::New,
            };
            (agent.name.clone(), state)
        })
        .collect()
}

/// Names of every agent with a file on disk (installed, outdated or unknown).
pub fn detect_installed_set(manifest: &Manifest, root: &Path) -> BTreeSet<String> {
    detect_agent_states(manifest, root)
        .into_iter()
        .filter(|(_, state)| *state != AgentState::New)
        .map(|(name, _)| name)
        .collect()
}

/// Add lock entries for agent files that exist without one. Returns whether
/// the lock changed.
pub fn bootstrap_lock(manifest: &Manifest, root: &Path) -> Result<bool, RegistryError> {
    let file = LockFile::for_root(root);
    let mut lock = file.read();
    let mut changed = false;
    for agent in &manifest.agents {
        if lock.contains_key(&agent.name) {
            continue;
        }
        let Ok(dest) = destination(manifest, agent, root) else {
            continue;
        };
        let Ok(content) = std::fs::read(&dest.absolute) else {
            continue;
        };
        let now = Utc::now();
        lock.insert(
            agent.name.clone(),
            LockEntry {
                sha256: sha256_hex(&content),
                installed_at: now,
                updated_at: now,
            },
        );
        changed = true;
    }
    if changed {
        file.write(&lock)?;
        tracing::info!(target: "registry.lock", entries = lock.len(), "lock_bootstrapped");
    }
    Ok(changed)
}
