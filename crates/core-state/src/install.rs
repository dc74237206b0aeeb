//! Install batch state and the reduction of collaborator progress reports.

use crate::{Cursor, State};
use core_events::Mode;
use core_registry::{InstallOutcome, UninstallOutcome};
use std::collections::BTreeSet;

/// What the confirm dialog is about to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallContext {
    Agents,
    Pack { label: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResult {
    pub name: String,
    pub outcome: InstallOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallState {
    /// Target agent names, in manifest order.
    pub agents: Vec<String>,
    /// Index of the agent being installed; equals `agents.len()` when finished.
    pub current: usize,
    pub results: Vec<AgentResult>,
    pub done: Cursor,
    /// Skipped agents explicitly marked for a forced reinstall.
    pub force_selection: BTreeSet<String>,
    pub force_mode: bool,
    pub context: InstallContext,
}

impl InstallState {
    pub fn new(agents: Vec<String>, context: InstallContext) -> Self {
        Self {
            agents,
            current: 0,
            results: Vec::new(),
            done: Cursor::default(),
            force_selection: BTreeSet::new(),
            force_mode: false,
            context,
        }
    }

    /// Same targets, progress cleared.
    pub fn restarted(&self) -> Self {
        let mut fresh = Self::new(self.agents.clone(), self.context.clone());
        fresh.force_mode = self.force_mode;
        fresh
    }

    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|r| r.outcome == InstallOutcome::Skipped)
            .map(|r| r.name.as_str())
    }

    pub fn count(&self, outcome: InstallOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }
}

/// Reports from the install/uninstall collaborators, applied by [`reduce_progress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    InstallStarted(usize),
    InstallFinished {
        name: String,
        outcome: InstallOutcome,
    },
    InstallBatchComplete {
        installed: BTreeSet<String>,
    },
    UninstallFinished {
        name: String,
        outcome: UninstallOutcome,
        installed: BTreeSet<String>,
    },
}

/// Apply a collaborator report. Reports that do not fit the current mode are ignored.
pub fn reduce_progress(state: &State, progress: Progress) -> State {
    let mut s = state.clone();
    match (state.mode, progress) {
        (Mode::Installing, Progress::InstallStarted(index)) => {
            if let Some(install) = s.install.as_mut() {
                install.current = index.min(install.agents.len());
            }
        }
        (Mode::Installing, Progress::InstallFinished { name, outcome }) => {
            if let Some(install) = s.install.as_mut() {
                install.results.push(AgentResult { name, outcome });
                install.current = install.results.len().min(install.agents.len());
            }
        }
        (Mode::Installing, Progress::InstallBatchComplete { installed }) => {
            s.installed = installed;
            s.mode = Mode::Done;
            if let Some(install) = s.install.as_mut() {
                install.current = install.agents.len();
                install.done = Cursor::default();
            }
        }
        (
            Mode::Uninstalling,
            Progress::UninstallFinished {
                name,
                outcome,
                installed,
            },
        ) => {
            s.installed = installed;
            s.mode = Mode::Browse;
            s.uninstall_target = None;
            s.flash = Some(match outcome {
                UninstallOutcome::Removed => format!("Uninstalled \"{name}\""),
                UninstallOutcome::NotFound => format!("\"{name}\" was not found on disk"),
                UninstallOutcome::Failed => format!("Failed to uninstall \"{name}\""),
            });
        }
        (mode, progress) => {
            tracing::debug!(target: "state.reduce", mode = mode.as_str(), ?progress, "progress_ignored");
        }
    }
    s
}
