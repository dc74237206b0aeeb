//! Installs and removes agent files, keeping the lock file in step.

use crate::RegistryError;
use crate::lock::LockFile;
use crate::manifest::{AgentEntry, AgentMode, Manifest};
use crate::paths::destination;
use crate::permissions::{PermissionMap, apply_permissions};
use crate::source::AgentSource;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallOutcome {
    Installed,
    Skipped,
    Failed,
}

impl InstallOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            InstallOutcome::Installed => "installed",
            InstallOutcome::Skipped => "skipped",
            InstallOutcome::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UninstallOutcome {
    Removed,
    NotFound,
    Failed,
}

impl UninstallOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            UninstallOutcome::Removed => "removed",
            UninstallOutcome::NotFound => "not_found",
            UninstallOutcome::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Overwrite files that already exist.
    pub force: bool,
    /// Report what would happen without touching disk.
    pub dry_run: bool,
}

/// Result of installing one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInstall {
    pub name: String,
    /// Destination relative to the project root, when one could be computed.
    pub relative: Option<PathBuf>,
    pub outcome: InstallOutcome,
    /// Failure description for `Failed`.
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallCounts {
    pub installed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl InstallCounts {
    pub fn record(&mut self, outcome: InstallOutcome) {
        match outcome {
            InstallOutcome::Installed => self.installed += 1,
            InstallOutcome::Skipped => self.skipped += 1,
            InstallOutcome::Failed => self.failed += 1,
        }
    }

    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a AgentInstall>) -> Self {
        let mut counts = Self::default();
        for r in results {
            counts.record(r.outcome);
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallCounts {
    pub removed: usize,
    pub not_found: usize,
    pub failed: usize,
}

/// Installs agents from a source into a project root.
#[derive(Debug, Clone)]
pub struct Installer<S> {
    manifest: Arc<Manifest>,
    root: PathBuf,
    source: S,
}

impl<S: AgentSource> Installer<S> {
    pub fn new(manifest: Arc<Manifest>, root: impl Into<PathBuf>, source: S) -> Self {
        Self {
            manifest,
            root: root.into(),
            source,
        }
    }

    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock(&self) -> LockFile {
        LockFile::for_root(&self.root)
    }

    /// Install one agent. Never errors: every failure is reported as `Failed`
    /// with a detail string.
    pub async fn install_agent(
        &self,
        agent: &AgentEntry,
        options: InstallOptions,
        permissions: Option<&PermissionMap>,
    ) -> AgentInstall {
        let mut report = AgentInstall {
            name: agent.name.clone(),
            relative: None,
            outcome: InstallOutcome::Failed,
            detail: None,
        };
        let dest = match destination(&self.manifest, agent, &self.root) {
            Ok(dest) => dest,
            Err(e) => {
                report.detail = Some(e.to_string());
                self.log(&report);
                return report;
            }
        };
        report.relative = Some(dest.relative.clone());

        if options.dry_run {
            report.outcome = InstallOutcome::Installed;
        } else if dest.absolute.exists() && !options.force {
            report.outcome = InstallOutcome::Skipped;
        } else {
            match self.write_agent(agent, &dest.absolute, permissions).await {
                Ok(()) => report.outcome = InstallOutcome::Installed,
                Err(e) => report.detail = Some(e.to_string()),
            }
        }
        self.log(&report);
        report
    }

    async fn write_agent(
        &self,
        agent: &AgentEntry,
        path: &Path,
        permissions: Option<&PermissionMap>,
    ) -> Result<(), RegistryError> {
        let mut content = self.source.fetch(&self.manifest, agent).await?;
        if let Some(map) = permissions {
            content = apply_permissions(&content, map);
        }
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| RegistryError::io(dir, e))?;
        }
        std::fs::write(path, &content).map_err(|e| RegistryError::io(path, e))?;
        self.lock().record_install(&agent.name, content.as_bytes())
    }

    fn log(&self, report: &AgentInstall) {
        match report.outcome {
            InstallOutcome::Failed => tracing::warn!(
                target: "registry.install",
                agent = %report.name,
                detail = report.detail.as_deref().unwrap_or(""),
                "install_failed"
            ),
            outcome => tracing::info!(
                target: "registry.install",
                agent = %report.name,
                outcome = outcome.as_str(),
                "install"
            ),
        }
    }

    /// Install agents one after another; a failure never stops the batch.
    /// `permissions` maps agent name to the permission map to splice in.
    pub async fn install_agents(
        &self,
        agents: &[&AgentEntry],
        options: InstallOptions,
        permissions: &BTreeMap<String, PermissionMap>,
    ) -> Vec<AgentInstall> {
        let mut out = Vec::with_capacity(agents.len());
        for agent in agents {
            out.push(
                self.install_agent(agent, options, permissions.get(&agent.name))
                    .await,
            );
        }
        out
    }

    /// Remove one agent file.
    ///
    /// Symlinks are refused with a security error, which is the only error
    /// returned; ordinary filesystem failures report `Failed`.
    pub fn uninstall_agent(
        &self,
        agent: &AgentEntry,
        dry_run: bool,
    ) -> Result<UninstallOutcome, RegistryError> {
        let dest = destination(&self.manifest, agent, &self.root)?;
        let meta = match std::fs::symlink_metadata(&dest.absolute) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(UninstallOutcome::NotFound);
            }
            Err(_) => return Ok(UninstallOutcome::Failed),
        };
        if meta.file_type().is_symlink() {
            return Err(RegistryError::Security(format!(
                "\"{}\" is a symlink. Refusing to delete.",
                dest.relative.display()
            )));
        }
        if dry_run {
            return Ok(UninstallOutcome::Removed);
        }
        if let Err(e) = std::fs::remove_file(&dest.absolute) {
            tracing::warn!(target: "registry.install", agent = %agent.name, error = %e, "uninstall_failed");
            return Ok(UninstallOutcome::Failed);
        }
        if let Err(e) = self.lock().remove_entry(&agent.name) {
            tracing::warn!(target: "registry.lock", agent = %agent.name, error = %e, "lock_update_failed");
        }
        if agent.mode != AgentMode::Primary
            && let Some(parent) = dest.absolute.parent()
            && std::fs::read_dir(parent).is_ok_and(|mut entries| entries.next().is_none())
        {
            let _ = std::fs::remove_dir(parent);
        }
        tracing::info!(target: "registry.install", agent = %agent.name, "uninstalled");
        Ok(UninstallOutcome::Removed)
    }

    /// Uninstall several agents; errors (security refusals) count as failures.
    pub fn uninstall_agents(&self, agents: &[&AgentEntry], dry_run: bool) -> UninstallCounts {
        let mut counts = UninstallCounts::default();
        for agent in agents {
            match self.uninstall_agent(agent, dry_run) {
                Ok(UninstallOutcome::Removed) => counts.removed += 1,
                Ok(UninstallOutcome::NotFound) => counts.not_found += 1,
                Ok(UninstallOutcome::Failed) => counts.failed += 1,
                Err(e) => {
                    tracing::warn!(target: "registry.install", agent = %agent.name, error = %e, "uninstall_refused");
                    counts.failed += 1;
                }
            }
        }
        counts
    }
}
