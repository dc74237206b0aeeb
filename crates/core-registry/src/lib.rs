//! External collaborators of the interactive session: the agent manifest,
//! installed-state detection through the lock file, the installer and
//! uninstaller with their content sources, and the permission catalog.

mod error;
pub mod installer;
pub mod lock;
pub mod manifest;
pub mod paths;
pub mod permissions;
pub mod source;

pub use error::RegistryError;
pub use installer::{
    AgentInstall, InstallCounts, InstallOptions, InstallOutcome, Installer, UninstallCounts,
    UninstallOutcome,
};
pub use lock::{AgentState, LockFile, detect_agent_states, detect_installed_set};
pub use manifest::{AgentEntry, AgentMode, CategoryMeta, Manifest, PackDef, is_safe_name};
pub use source::{AgentSource, AnySource, DirSource, HttpSource};
