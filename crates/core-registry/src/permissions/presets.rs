use super::{PermAction, PermValue, Permission, PermissionMap};
use crate::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;

use PermAction::{Allow, Ask, Deny};

/// Built-in permission profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Strict,
    Balanced,
    Permissive,
    Yolo,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Strict,
        Preset::Balanced,
        Preset::Permissive,
        Preset::Yolo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Strict => "strict",
            Preset::Balanced => "balanced",
            Preset::Permissive => "permissive",
            Preset::Yolo => "yolo",
        }
    }

    pub fn parse(name: &str) -> Result<Self, RegistryError> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == name)
            .ok_or_else(|| RegistryError::UnknownPreset(name.to_string()))
    }

    /// Full permission map of the preset.
    pub fn permissions(self) -> PermissionMap {
        Permission::ALL
            .into_iter()
            .map(|p| (p, self.value(p)))
            .collect()
    }

    fn value(self, p: Permission) -> PermValue {
        use Permission::*;
        match self {
            Preset::Strict => PermValue::Flat(match p {
                Write | Edit | Bash | Webfetch | Task | Mcp | Browsermcp => Deny,
                Memory => Ask,
                _ => Allow,
            }),
            Preset::Balanced => match p {
                Bash => PermValue::patterns(&[
                    ("*", Ask),
                    ("git status*", Allow),
                    ("git diff*", Allow),
                    ("git log*", Allow),
                ]),
                Task => PermValue::patterns(&[("*", Allow)]),
                Mcp | Browsermcp => PermValue::Flat(Ask),
                _ => PermValue::Flat(Allow),
            },
            Preset::Permissive | Preset::Yolo => match p {
                Bash | Task => PermValue::patterns(&[("*", Allow)]),
                _ => PermValue::Flat(Allow),
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entries of the interactive preset selector, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetChoice {
    Skip,
    Preset(Preset),
    Custom,
}

impl PresetChoice {
    pub const ALL: [PresetChoice; 6] = [
        PresetChoice::Skip,
        PresetChoice::Preset(Preset::Strict),
        PresetChoice::Preset(Preset::Balanced),
        PresetChoice::Preset(Preset::Permissive),
        PresetChoice::Preset(Preset::Yolo),
        PresetChoice::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PresetChoice::Skip => "skip",
            PresetChoice::Preset(p) => p.as_str(),
            PresetChoice::Custom => "custom",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PresetChoice::Skip => "Use built-in permissions, don't modify",
            PresetChoice::Preset(Preset::Strict) => "Mostly deny, no bash (safe default)",
            PresetChoice::Preset(Preset::Balanced) => "Read/write allowed, bash requires approval",
            PresetChoice::Preset(Preset::Permissive) => "Almost everything allowed",
            PresetChoice::Preset(Preset::Yolo) => "Everything allowed, no restrictions",
            PresetChoice::Custom => "Fine-tune each permission per agent",
        }
    }
}
