//! Permission-editing sub-state used by the preset selector, the per-agent
//! editor and the bash pattern editor.

use core_registry::permissions::{PermAction, Permission, PermissionMap, Preset, PresetChoice};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermState {
    pub preset_cursor: usize,
    /// Choice applied to the batch, once one was confirmed.
    pub selected: Option<PresetChoice>,
    /// Index into the install batch of the agent being edited.
    pub agent_index: usize,
    /// Index into [`Permission::ALL`].
    pub perm_cursor: usize,
    pub permissions: BTreeMap<String, PermissionMap>,
    /// Bash patterns while the bash editor is open.
    pub bash_patterns: Vec<(String, PermAction)>,
    /// Cursor over the patterns plus the trailing "add" row.
    pub bash_cursor: usize,
    pub bash_input: String,
    pub yolo_confirm: bool,
}

impl PermState {
    /// Fresh editor state; every agent starts from the balanced preset.
    pub fn new(agents: &[String]) -> Self {
        let balanced = Preset::Balanced.permissions();
        Self {
            preset_cursor: 0,
            selected: None,
            agent_index: 0,
            perm_cursor: 0,
            permissions: agents
                .iter()
                .map(|name| (name.clone(), balanced.clone()))
                .collect(),
            bash_patterns: Vec::new(),
            bash_cursor: 0,
            bash_input: String::new(),
            yolo_confirm: false,
        }
    }

    pub fn preset_choice(&self) -> PresetChoice {
        PresetChoice::ALL[self.preset_cursor.min(PresetChoice::ALL.len() - 1)]
    }

    pub fn current_permission(&self) -> Permission {
        Permission::ALL[self.perm_cursor.min(Permission::ALL.len() - 1)]
    }

    /// Assign `preset` to every agent in the batch.
    pub fn apply_preset(&mut self, preset: Preset) {
        let map = preset.permissions();
        for perms in self.permissions.values_mut() {
            *perms = map.clone();
        }
        self.selected = Some(PresetChoice::Preset(preset));
    }

    pub fn on_add_row(&self) -> bool {
        self.bash_cursor >= self.bash_patterns.len()
    }
}
