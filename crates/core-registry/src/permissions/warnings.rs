use super::{PermAction, Permission, Preset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningLevel {
    Critical,
    High,
    Medium,
    Info,
}

impl WarningLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            WarningLevel::Critical => "critical",
            WarningLevel::High => "high",
            WarningLevel::Medium => "medium",
            WarningLevel::Info => "info",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            WarningLevel::Critical => "⛔",
            WarningLevel::High => "⚠",
            WarningLevel::Medium => "⚡",
            WarningLevel::Info => "ℹ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Warning {
    pub level: WarningLevel,
    pub title: &'static str,
    pub message: &'static str,
}

pub fn preset_warning(preset: Preset) -> Warning {
    match preset {
        Preset::Yolo => Warning {
            level: WarningLevel::Critical,
            title: "Unrestricted access enabled",
            message: "All permissions set to allow. The agent will have unrestricted access to your filesystem, network, and tools.",
        },
        Preset::Permissive => Warning {
            level: WarningLevel::High,
            title: "Broad access enabled",
            message: "Most permissions set to allow. The agent has broad access.",
        },
        Preset::Balanced => Warning {
            level: WarningLevel::Info,
            title: "Balanced defaults",
            message: "Using balanced defaults. Bash commands require approval.",
        },
        Preset::Strict => Warning {
            level: WarningLevel::Info,
            title: "Strict mode",
            message: "Strict mode. Most write operations are denied.",
        },
    }
}

/// Medium-level notice for a sensitive permission set to `allow`.
pub fn permission_warning(permission: Permission, action: PermAction) -> Option<Warning> {
    if action != PermAction::Allow {
        return None;
    }
    let (title, message) = match permission {
        Permission::Bash => (
            "Unrestricted bash access",
            "Unrestricted bash access allows arbitrary command execution.",
        ),
        Permission::Write => (
            "Unrestricted write access",
            "Write permission allows creating new files anywhere.",
        ),
        Permission::Mcp => (
            "MCP access enabled",
            "MCP access allows interaction with external services.",
        ),
        Permission::Browsermcp => (
            "Browser access enabled",
            "Browser access allows automated web interaction.",
        ),
        _ => return None,
    };
    Some(Warning {
        level: WarningLevel::Medium,
        title,
        message,
    })
}
