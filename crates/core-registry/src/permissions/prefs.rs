use super::{OverrideSpec, Preset};
use crate::RegistryError;
use crate::manifest::is_safe_name;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

const PREFS_FILENAME: &str = "permission-preferences.json";
const CURRENT_VERSION: u32 = 1;

/// Saved default permission choices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub preset: Option<Preset>,
    pub overrides: Vec<OverrideSpec>,
}

#[derive(Serialize, Deserialize)]
struct PreferencesFile {
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preset: Option<Preset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    overrides: Option<Vec<OverrideSpec>>,
}

/// Location of the preferences file.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    /// `{config_dir}/opencode/permission-preferences.json`.
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::at(dir.join("opencode").join(PREFS_FILENAME)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved preferences. A missing file is silent; an unreadable or
    /// invalid one is logged and ignored.
    pub fn load(&self) -> Option<Preferences> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(target: "registry.prefs", error = %e, "preferences_unreadable");
                return None;
            }
        };
        let file: PreferencesFile = match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(target: "registry.prefs", error = %e, "preferences_invalid_json");
                return None;
            }
        };
        let valid = file.version == CURRENT_VERSION
            && file.preset != Some(Preset::Yolo)
            && file
                .overrides
                .iter()
                .flatten()
                .all(|o| o.agent.as_deref().is_none_or(is_safe_name));
        if !valid {
            tracing::warn!(target: "registry.prefs", "preferences_failed_validation");
            return None;
        }
        Some(Preferences {
            preset: file.preset,
            overrides: file.overrides.unwrap_or_default(),
        })
    }

    /// Save atomically (temp file + rename), readable only by the owner.
    /// The yolo preset is never persisted.
    pub fn save(&self, prefs: &Preferences) -> Result<(), RegistryError> {
        if prefs.preset == Some(Preset::Yolo) {
            return Err(RegistryError::YoloNotSaved);
        }
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| RegistryError::io(dir, e))?;
        }
        let payload = PreferencesFile {
            version: CURRENT_VERSION,
            preset: prefs.preset,
            overrides: (!prefs.overrides.is_empty()).then(|| prefs.overrides.clone()),
        };
        let mut json =
            serde_json::to_string_pretty(&payload).map_err(|source| RegistryError::Encode {
                what: "preferences",
                source,
            })?;
        json.push('\n');

        let tmp = self.path.with_extension("json.tmp");
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&tmp).map_err(|e| RegistryError::io(&tmp, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| RegistryError::io(&tmp, e))?;
        drop(file);
        std::fs::rename(&tmp, &self.path).map_err(|e| RegistryError::io(&self.path, e))?;
        tracing::info!(target: "registry.prefs", path = %self.path.display(), "preferences_saved");
        Ok(())
    }

    /// Remove the saved preferences; a missing file is not an error.
    pub fn clear(&self) -> Result<(), RegistryError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(RegistryError::io(&self.path, e))
            }
            _ => Ok(()),
        }
    }
}
