//! Side effects the session requests from the outside world.

use core_registry::permissions::PermissionMap;
use core_registry::{
    AgentSource, InstallOptions, InstallOutcome, Installer, UninstallOutcome,
    detect_installed_set,
};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

/// Install, uninstall and installed-state detection as seen by the session.
///
/// Failures are outcomes, never errors: a batch always runs to its end.
pub trait SessionServices {
    /// Names of agents currently present on disk.
    fn installed_set(&self) -> BTreeSet<String>;

    /// Install one agent. `force` overwrites an existing file.
    fn install(
        &self,
        name: &str,
        force: bool,
        permissions: Option<&PermissionMap>,
    ) -> impl Future<Output = InstallOutcome>;

    /// Remove one agent. The filesystem work runs off the async workers.
    fn uninstall(&self, name: &str) -> impl Future<Output = UninstallOutcome>;
}

/// [`SessionServices`] backed by the registry installer and lock file.
pub struct RegistryServices<S> {
    installer: Arc<Installer<S>>,
    options: InstallOptions,
}

impl<S: AgentSource> RegistryServices<S> {
    /// `options` applies to every install; a forced re-run from the done
    /// screen adds `force` on top.
    pub fn new(installer: Installer<S>, options: InstallOptions) -> Self {
        Self {
            installer: Arc::new(installer),
            options,
        }
    }

    pub fn installer(&self) -> &Installer<S> {
        &self.installer
    }
}

impl<S: AgentSource + 'static> SessionServices for RegistryServices<S> {
    fn installed_set(&self) -> BTreeSet<String> {
        detect_installed_set(self.installer.manifest(), self.installer.root())
    }

    async fn install(
        &self,
        name: &str,
        force: bool,
        permissions: Option<&PermissionMap>,
    ) -> InstallOutcome {
        let Some(agent) = self.installer.manifest().get_agent(name) else {
            tracing::warn!(target: "runtime.session", agent = name, "unknown_agent");
            return InstallOutcome::Failed;
        };
        let options = InstallOptions {
            force: self.options.force || force,
            ..self.options
        };
        self.installer
            .install_agent(agent, options, permissions)
            .await
            .outcome
    }

    async fn uninstall(&self, name: &str) -> UninstallOutcome {
        let Some(agent) = self.installer.manifest().get_agent(name).cloned() else {
            return UninstallOutcome::NotFound;
        };
        let installer = Arc::clone(&self.installer);
        let dry_run = self.options.dry_run;
        let removal =
            tokio::task::spawn_blocking(move || installer.uninstall_agent(&agent, dry_run)).await;
        match removal {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                tracing::warn!(target: "runtime.session", agent = name, error = %e, "uninstall_refused");
                UninstallOutcome::Failed
            }
            Err(e) => {
                tracing::error!(target: "runtime.session", agent = name, error = %e, "uninstall_task_failed");
                UninstallOutcome::Failed
            }
        }
    }
}
