//! Interactive session orchestrator.
//!
//! Owns the single event channel and the only writer to the terminal. Each
//! event is turned into a new [`State`] (input through the key parser and the
//! reducer, resizes, spinner ticks, flash expiry); events already queued are
//! folded in before the frame is drawn once. When the reducer enters
//! `Installing` or `Uninstalling` the session drives the external services
//! itself: one agent at a time, a redraw after every item and on every spinner
//! tick while a service call is in flight. Input arriving during a batch is
//! dropped; signals still end the session. While the terminal is below the
//! minimum size every key except quit is dropped as well.

mod flash;
mod services;

pub use flash::FlashTimer;
pub use services::{RegistryServices, SessionServices};

use anyhow::{Context, Result};
use core_events::{Action, Event, ExitSignal, InputEvent, Mode};
use core_input::parse_key;
use core_registry::{InstallOutcome, UninstallOutcome};
use core_render::{ScreenFlusher, Theme, render};
use core_state::{
    Progress, State, TerminalSize, clear_flash, reduce, reduce_progress, resize, tick_spinner,
};
use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

const CTRL_C: u8 = 0x03;
const SOURCE_JOIN_TIMEOUT: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The reducer reached `Mode::Quit`.
    Quit,
    Signal(ExitSignal),
    InputClosed,
    ChannelClosed,
}

impl ExitReason {
    pub fn exit_code(self) -> i32 {
        match self {
            ExitReason::Signal(sig) => sig.exit_code(),
            ExitReason::Quit | ExitReason::InputClosed | ExitReason::ChannelClosed => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::Quit => "quit",
            ExitReason::Signal(sig) => sig.as_str(),
            ExitReason::InputClosed => "input_closed",
            ExitReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// How long a flash message stays on screen.
    pub flash_ttl: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            flash_ttl: Duration::from_millis(2500),
        }
    }
}

/// Current state plus everything needed to put it on the terminal.
struct Screen<W: Write> {
    state: State,
    flusher: ScreenFlusher<W>,
    theme: Theme,
    flash: FlashTimer,
    flash_ttl: Duration,
}

impl<W: Write> Screen<W> {
    fn apply(&mut self, f: impl FnOnce(&State) -> State) {
        self.state = f(&self.state);
        self.flash.observe(self.state.flash.as_deref(), Instant::now());
    }

    fn progress(&mut self, progress: Progress) {
        self.apply(|s| reduce_progress(s, progress));
    }

    fn tick(&mut self) {
        self.apply(tick_spinner);
        if self.flash.expired(Instant::now(), self.flash_ttl) {
            trace!(target: "runtime.session", "flash_expired");
            self.apply(clear_flash);
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        debug!(target: "runtime.session", cols, rows, "resize");
        self.apply(|s| resize(s, TerminalSize::new(cols, rows)));
        self.flusher.invalidate();
    }

    fn draw(&mut self) -> Result<()> {
        let frame = render(&self.state, &self.theme);
        self.flusher.flush(&frame).context("write frame")?;
        Ok(())
    }
}

pub struct Session<W: Write, X: SessionServices> {
    screen: Screen<W>,
    services: X,
    rx: mpsc::Receiver<Event>,
    rx_open: bool,
    source_handles: Vec<JoinHandle<()>>,
}

impl<W: Write, X: SessionServices> Session<W, X> {
    pub fn new(
        state: State,
        flusher: ScreenFlusher<W>,
        theme: Theme,
        services: X,
        rx: mpsc::Receiver<Event>,
        options: SessionOptions,
    ) -> Self {
        let mut flash = FlashTimer::default();
        flash.observe(state.flash.as_deref(), Instant::now());
        Self {
            screen: Screen {
                state,
                flusher,
                theme,
                flash,
                flash_ttl: options.flash_ttl,
            },
            services,
            rx,
            rx_open: true,
            source_handles: Vec::new(),
        }
    }

    /// Event source tasks to join when the session ends.
    pub fn with_source_handles(mut self, handles: Vec<JoinHandle<()>>) -> Self {
        self.source_handles = handles;
        self
    }

    pub fn state(&self) -> &State {
        &self.screen.state
    }

    pub fn flusher(&self) -> &ScreenFlusher<W> {
        &self.screen.flusher
    }

    pub fn services(&self) -> &X {
        &self.services
    }

    /// Run until the user quits, a signal arrives, input ends or every sender is gone.
    ///
    /// Errors only when the terminal can no longer be written.
    pub async fn run(&mut self) -> Result<ExitReason> {
        info!(target: "runtime.session", mode = self.screen.state.mode.as_str(), "session_start");
        self.screen.draw()?;

        let reason = loop {
            let Some(event) = self.rx.recv().await else {
                self.rx_open = false;
                break ExitReason::ChannelClosed;
            };
            if let Some(reason) = self.handle_event(event).await? {
                break reason;
            }
            let mut stop = None;
            while let Ok(event) = self.rx.try_recv() {
                if let Some(reason) = self.handle_event(event).await? {
                    stop = Some(reason);
                    break;
                }
            }
            if let Some(reason) = stop {
                break reason;
            }
            self.screen.draw()?;
        };

        self.rx.close();
        self.finalize_shutdown(reason).await;
        Ok(reason)
    }

    async fn handle_event(&mut self, event: Event) -> Result<Option<ExitReason>> {
        match event {
            Event::Input(InputEvent::Bytes(bytes)) => self.handle_bytes(&bytes).await,
            Event::Input(InputEvent::Resize(cols, rows)) => {
                self.screen.resize(cols, rows);
                Ok(None)
            }
            Event::Tick => {
                self.screen.tick();
                Ok(None)
            }
            Event::Signal(sig) => Ok(Some(ExitReason::Signal(sig))),
            Event::InputClosed => Ok(Some(ExitReason::InputClosed)),
        }
    }

    async fn handle_bytes(&mut self, bytes: &[u8]) -> Result<Option<ExitReason>> {
        // Raw mode delivers Ctrl-C as a byte instead of SIGINT.
        if bytes.contains(&CTRL_C) {
            return Ok(Some(ExitReason::Signal(ExitSignal::Interrupt)));
        }
        let action = parse_key(bytes, self.screen.state.mode);
        if action.is_none() {
            return Ok(None);
        }
        // Behind the "too small" notice only quitting gets through.
        let state = &self.screen.state;
        let blocked = state.terminal.too_small() && !matches!(action, Action::Quit);
        if state.mode.is_busy() || blocked {
            trace!(
                target: "runtime.session",
                mode = state.mode.as_str(),
                too_small = state.terminal.too_small(),
                "input_dropped"
            );
            return Ok(None);
        }
        self.screen.apply(|s| reduce(s, &action));
        match self.screen.state.mode {
            Mode::Quit => Ok(Some(ExitReason::Quit)),
            Mode::Installing => self.run_install().await,
            Mode::Uninstalling => {
                self.run_uninstall().await?;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    async fn run_install(&mut self) -> Result<Option<ExitReason>> {
        let Some(install) = self.screen.state.install.as_ref() else {
            return Ok(None);
        };
        let targets = install.agents.clone();
        let force = install.force_mode;
        let permissions = self.screen.state.install_permissions();
        info!(target: "runtime.session", agents = targets.len(), force, "install_batch_start");

        let mut input_closed = false;
        for (index, name) in targets.iter().enumerate() {
            self.screen.progress(Progress::InstallStarted(index));
            self.screen.draw()?;

            let pending = self.services.install(name, force, permissions.get(name));
            tokio::pin!(pending);
            let outcome: InstallOutcome = loop {
                tokio::select! {
                    biased;
                    outcome = &mut pending => break outcome,
                    event = self.rx.recv(), if self.rx_open => match event {
                        None => self.rx_open = false,
                        Some(Event::Tick) => {
                            self.screen.tick();
                            self.screen.draw()?;
                        }
                        Some(Event::Input(InputEvent::Resize(cols, rows))) => {
                            self.screen.resize(cols, rows);
                            self.screen.draw()?;
                        }
                        Some(Event::Input(InputEvent::Bytes(bytes))) => {
                            if bytes.contains(&CTRL_C) {
                                warn!(target: "runtime.session", agent = %name, "install_interrupted");
                                return Ok(Some(ExitReason::Signal(ExitSignal::Interrupt)));
                            }
                            trace!(target: "runtime.session", len = bytes.len(), "input_dropped_busy");
                        }
                        Some(Event::Signal(sig)) => {
                            warn!(target: "runtime.session", agent = %name, signal = sig.as_str(), "install_interrupted");
                            return Ok(Some(ExitReason::Signal(sig)));
                        }
                        Some(Event::InputClosed) => input_closed = true,
                    },
                }
            };

            self.screen.progress(Progress::InstallFinished {
                name: name.clone(),
                outcome,
            });
            self.screen.draw()?;
        }

        let installed = self.services.installed_set();
        self.screen.progress(Progress::InstallBatchComplete { installed });
        if let Some(install) = self.screen.state.install.as_ref() {
            info!(
                target: "runtime.session",
                installed = install.count(InstallOutcome::Installed),
                skipped = install.count(InstallOutcome::Skipped),
                failed = install.count(InstallOutcome::Failed),
                "install_batch_complete"
            );
        }
        self.screen.draw()?;
        Ok(input_closed.then_some(ExitReason::InputClosed))
    }

    async fn run_uninstall(&mut self) -> Result<()> {
        // Show the spinner frame while the removal runs.
        self.screen.draw()?;
        let name = self.screen.state.uninstall_target.clone().unwrap_or_default();
        let outcome = if name.is_empty() {
            UninstallOutcome::NotFound
        } else {
            self.services.uninstall(&name).await
        };
        info!(target: "runtime.session", agent = %name, outcome = outcome.as_str(), "uninstall");
        let installed = self.services.installed_set();
        self.screen.progress(Progress::UninstallFinished {
            name,
            outcome,
            installed,
        });
        Ok(())
    }

    async fn finalize_shutdown(&mut self, reason: ExitReason) {
        info!(target: "runtime.shutdown", reason = reason.as_str(), stage = "begin", "shutdown_stage");
        while let Some(handle) = self.source_handles.pop() {
            match tokio::time::timeout(SOURCE_JOIN_TIMEOUT, handle).await {
                Ok(Ok(())) => trace!(target: "runtime.shutdown", "event_source_task_stopped"),
                Ok(Err(err)) if err.is_cancelled() => {
                    trace!(target: "runtime.shutdown", "event_source_task_cancelled")
                }
                Ok(Err(err)) => error!(target: "runtime.shutdown", ?err, "event_source_task_error"),
                Err(_) => warn!(target: "runtime.shutdown", "event_source_task_timeout"),
            }
        }
        let m = self.screen.flusher.metrics().snapshot();
        info!(
            target: "runtime.shutdown",
            reason = reason.as_str(),
            full_redraws = m.full_redraws,
            diff_flushes = m.diff_flushes,
            unchanged = m.unchanged,
            stage = "complete",
            "shutdown_stage"
        );
    }
}
