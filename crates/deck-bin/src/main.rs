//! agentdeck entrypoint.
mod cli;
mod commands;
mod tui;

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser};
use cli::{Args, Command, TuiArgs};
use core_config::{Config, SourceKind, load_from};
use core_registry::permissions::PreferencesStore;
use core_registry::{AnySource, DirSource, HttpSource, Installer, Manifest};
use core_render::Theme;
use core_terminal::{TerminalCapabilities, is_interactive, restore_terminal};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::Duration;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

const DEFAULT_MANIFEST: &str = "manifest.json";
/// Grace period for runtime tasks (the stdin reader may be parked in a read).
const RUNTIME_SHUTDOWN: Duration = Duration::from_millis(250);

struct AppStartup {
    config: Config,
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new(args: &Args) -> Self {
        Self {
            config: load_from(args.config.clone()),
            log_guard: None,
        }
    }

    fn configure_logging(&mut self) {
        let log = self.config.log();
        let log_dir = match log.file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let Some(file_name) = log.file.file_name() else {
            return;
        };
        let log_path = log_dir.join(file_name);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.filter));
        let file_appender = tracing_appender::rolling::never(&log_dir, file_name);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(()) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
            }
        }
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                let _ = restore_terminal();
                default_panic(info);
            }));
        });
    }
}

fn manifest_path(args: &Args, config: &Config) -> PathBuf {
    args.manifest
        .clone()
        .or_else(|| config.file.paths.manifest.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST))
}

fn install_root(args: &Args, config: &Config) -> PathBuf {
    args.root
        .clone()
        .or_else(|| config.file.paths.root.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn build_source(config: &Config) -> Result<AnySource> {
    match config.file.source.kind {
        SourceKind::Dir => {
            let dir = config
                .source_dir()
                .ok_or_else(|| anyhow!("source kind \"dir\" needs source.dir in the config"))?;
            Ok(AnySource::Dir(DirSource::new(dir.clone())))
        }
        SourceKind::Http => Ok(AnySource::Http(HttpSource::new()?)),
    }
}

fn load_manifest(path: &Path) -> Result<Arc<Manifest>> {
    let manifest = Manifest::load(path).with_context(|| {
        format!(
            "cannot load the agent manifest (pass --manifest or set paths.manifest): {}",
            path.display()
        )
    })?;
    info!(
        target: "runtime.startup",
        path = %path.display(),
        agents = manifest.agents.len(),
        categories = manifest.categories.len(),
        packs = manifest.packs.len(),
        "manifest_loaded"
    );
    Ok(Arc::new(manifest))
}

async fn dispatch(mut args: Args, config: &Config, theme: Theme) -> Result<i32> {
    let command = match args.command.take() {
        Some(command) => command,
        None if is_interactive() => Command::Tui(TuiArgs::default()),
        None => {
            Args::command().print_help()?;
            return Ok(0);
        }
    };
    let manifest = load_manifest(&manifest_path(&args, config))?;
    let installer = |manifest: Arc<Manifest>| -> Result<Installer<AnySource>> {
        Ok(Installer::new(
            manifest,
            install_root(&args, config),
            build_source(config)?,
        ))
    };

    match &command {
        Command::List { packs: false } => {
            print!("{}", commands::agent_list(&manifest, &theme));
            Ok(0)
        }
        Command::List { packs: true } => {
            print!("{}", commands::pack_list(&manifest, &theme));
            Ok(0)
        }
        Command::Search { query } => {
            print!("{}", commands::search_results(&manifest, query, &theme));
            Ok(0)
        }
        Command::Install(install) => {
            let store = PreferencesStore::default_location();
            commands::run_install(&installer(manifest)?, install, store.as_ref(), &theme).await
        }
        Command::Uninstall(uninstall) => {
            Ok(commands::run_uninstall(&installer(manifest)?, uninstall, &theme))
        }
        Command::Tui(tui_args) => tui::run(config, installer(manifest)?, *tui_args).await,
    }
}

fn run() -> i32 {
    let args = Args::parse();
    let mut startup = AppStartup::new(&args);
    startup.configure_logging();
    AppStartup::install_panic_hook();
    let config_path = startup.config.path.as_ref().map(|p| p.display().to_string());
    info!(target: "runtime", config = config_path.as_deref(), "startup");

    let theme = Theme::new(TerminalCapabilities::detect().color);
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprint!("{}", commands::error_message(&theme, &e.to_string()));
            return 1;
        }
    };
    let result = runtime.block_on(dispatch(args, &startup.config, theme));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN);

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            let _ = restore_terminal();
            error!(target: "runtime", error = %format!("{e:#}"), "fatal");
            eprint!("{}", commands::error_message(&theme, &format!("{e:#}")));
            1
        }
    };
    info!(target: "runtime", code, "exit");
    // Flush the non-blocking log writer before the process goes away.
    drop(startup.log_guard.take());
    code
}

fn main() {
    std::process::exit(run());
}
