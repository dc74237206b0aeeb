//! Interactive browser wiring: terminal session, event sources and the
//! session loop.

use crate::cli::TuiArgs;
use anyhow::{Result, bail};
use core_config::Config;
use core_events::{
    EVENT_CHANNEL_CAP, Event, EventSourceRegistry, ResizeEventSource, SignalEventSource,
    TickEventSource,
};
use core_input::StdinEventSource;
use core_registry::{AnySource, InstallOptions, Installer};
use core_render::{ScreenFlusher, Theme, TITLE};
use core_session::{RegistryServices, Session, SessionOptions, SessionServices};
use core_state::{TerminalSize, create_initial_state};
use core_terminal::{
    CrosstermBackend, TerminalBackend, TerminalCapabilities, is_interactive, terminal_size,
};
use std::io::stdout;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

const FALLBACK_SIZE: (u16, u16) = (80, 24);

pub async fn run(config: &Config, installer: Installer<AnySource>, args: TuiArgs) -> Result<i32> {
    if !is_interactive() {
        bail!("the interactive browser needs a terminal on stdin and stdout");
    }
    let caps = TerminalCapabilities::detect();
    let theme = Theme::new(caps.color);
    let manifest = Arc::clone(installer.manifest());
    let services = RegistryServices::new(
        installer,
        InstallOptions {
            force: args.force,
            dry_run: args.dry_run,
        },
    );
    let (cols, rows) = terminal_size().unwrap_or(FALLBACK_SIZE);
    let state = create_initial_state(
        manifest,
        TerminalSize::new(cols, rows),
        services.installed_set(),
    );
    info!(
        target: "runtime.startup",
        cols,
        rows,
        color = caps.color,
        synchronized_update = caps.synchronized_update,
        installed = state.installed.len(),
        "tui_start"
    );

    let mut backend = CrosstermBackend::new();
    backend.set_title(TITLE)?;
    let guard = backend.enter_guard()?;

    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let mut registry = EventSourceRegistry::new();
    registry.register(StdinEventSource::stdin());
    registry.register(TickEventSource::new(config.ui().spinner_interval()));
    registry.register(SignalEventSource::new());
    registry.register(ResizeEventSource::new(Box::new(terminal_size)));
    let source_handles = registry.spawn_all(&tx);
    drop(tx);

    let flusher = ScreenFlusher::new(stdout()).with_synchronized_update(caps.synchronized_update);
    let options = SessionOptions {
        flash_ttl: config.ui().flash_duration(),
    };
    let mut session = Session::new(state, flusher, theme, services, rx, options)
        .with_source_handles(source_handles);
    let outcome = session.run().await;
    guard.release()?;
    let reason = outcome?;
    info!(target: "runtime", reason = reason.as_str(), "tui_exit");
    Ok(reason.exit_code())
}
