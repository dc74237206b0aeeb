//! Permission catalog: the 17 permission names, their actions, built-in
//! presets, warnings, the frontmatter writer, saved preferences and the
//! layered resolution used by non-interactive installs.

mod overrides;
mod prefs;
mod presets;
mod resolve;
mod warnings;
mod writer;

pub use overrides::OverrideSpec;
pub use prefs::{Preferences, PreferencesStore};
pub use presets::{Preset, PresetChoice};
pub use resolve::{ResolveInput, resolve_permissions};
pub use warnings::{Warning, WarningLevel, permission_warning, preset_warning};
pub use writer::{
    Frontmatter, apply_permissions, build_permission_yaml, read_frontmatter_boundaries,
    splice_frontmatter,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The wildcard pattern of a patterned permission.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermAction {
    Allow,
    Ask,
    Deny,
}

impl PermAction {
    pub const ALL: [PermAction; 3] = [PermAction::Allow, PermAction::Ask, PermAction::Deny];

    pub fn as_str(self) -> &'static str {
        match self {
            PermAction::Allow => "allow",
            PermAction::Ask => "ask",
            PermAction::Deny => "deny",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }

    /// Allow → Ask → Deny → Allow.
    pub fn next(self) -> Self {
        match self {
            PermAction::Allow => PermAction::Ask,
            PermAction::Ask => PermAction::Deny,
            PermAction::Deny => PermAction::Allow,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            PermAction::Allow => PermAction::Deny,
            PermAction::Ask => PermAction::Allow,
            PermAction::Deny => PermAction::Ask,
        }
    }
}

impl fmt::Display for PermAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission names in their fixed display and serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Edit,
    Bash,
    Glob,
    Grep,
    Webfetch,
    Task,
    Mcp,
    Todoread,
    Todowrite,
    Distill,
    Prune,
    Sequentialthinking,
    Memory,
    Browsermcp,
    Skill,
}

impl Permission {
    pub const ALL: [Permission; 17] = [
        Permission::Read,
        Permission::Write,
        Permission::Edit,
        Permission::Bash,
        Permission::Glob,
        Permission::Grep,
        Permission::Webfetch,
        Permission::Task,
        Permission::Mcp,
        Permission::Todoread,
        Permission::Todowrite,
        Permission::Distill,
        Permission::Prune,
        Permission::Sequentialthinking,
        Permission::Memory,
        Permission::Browsermcp,
        Permission::Skill,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Edit => "edit",
            Permission::Bash => "bash",
            Permission::Glob => "glob",
            Permission::Grep => "grep",
            Permission::Webfetch => "webfetch",
            Permission::Task => "task",
            Permission::Mcp => "mcp",
            Permission::Todoread => "todoread",
            Permission::Todowrite => "todowrite",
            Permission::Distill => "distill",
            Permission::Prune => "prune",
            Permission::Sequentialthinking => "sequentialthinking",
            Permission::Memory => "memory",
            Permission::Browsermcp => "browsermcp",
            Permission::Skill => "skill",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A permission is either one action or an ordered list of command patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermValue {
    Flat(PermAction),
    Patterned(Vec<(String, PermAction)>),
}

impl PermValue {
    pub fn patterns(pairs: &[(&str, PermAction)]) -> Self {
        PermValue::Patterned(pairs.iter().map(|(p, a)| (p.to_string(), *a)).collect())
    }

    /// Single action summarizing the value: the wildcard's action for a
    /// patterned value, `Ask` when it has no wildcard.
    pub fn flat_action(&self) -> PermAction {
        match self {
            PermValue::Flat(a) => *a,
            PermValue::Patterned(list) => list
                .iter()
                .find(|(p, _)| p == WILDCARD)
                .map(|(_, a)| *a)
                .unwrap_or(PermAction::Ask),
        }
    }

    /// Replace the flat action, or only the wildcard's action of a patterned value.
    pub fn with_flat_action(&self, action: PermAction) -> Self {
        match self {
            PermValue::Flat(_) => PermValue::Flat(action),
            PermValue::Patterned(list) => {
                let mut list = list.clone();
                match list.iter_mut().find(|(p, _)| p == WILDCARD) {
                    Some(entry) => entry.1 = action,
                    None => list.insert(0, (WILDCARD.to_string(), action)),
                }
                PermValue::Patterned(list)
            }
        }
    }

    /// Editable pattern list: a flat value becomes a single wildcard pattern.
    pub fn expand(&self) -> Vec<(String, PermAction)> {
        match self {
            PermValue::Flat(a) => vec![(WILDCARD.to_string(), *a)],
            PermValue::Patterned(list) => list.clone(),
        }
    }

    /// Inverse of [`expand`](Self::expand): a lone wildcard collapses back to a flat action.
    pub fn collapse(patterns: Vec<(String, PermAction)>) -> Self {
        match patterns.as_slice() {
            [(p, a)] if p == WILDCARD => PermValue::Flat(*a),
            _ => PermValue::Patterned(patterns),
        }
    }

    pub fn is_patterned(&self) -> bool {
        matches!(self, PermValue::Patterned(_))
    }
}

/// Permission name → value, iterated in the fixed permission order.
pub type PermissionMap = BTreeMap<Permission, PermValue>;
