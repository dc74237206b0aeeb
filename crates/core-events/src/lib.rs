//! Core event vocabulary and async event sources for agentdeck.
//!
//! `Action` and `Mode` are the shared language between the key parser, the
//! reducer and the renderer. `Event` is what flows through the session's
//! bounded channel; every producer implements [`AsyncEventSource`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// One bounded mpsc channel carries input bytes, resize notifications, signals and spinner ticks to
// the session loop. Producers `send().await`, so a slow consumer parks them instead of dropping
// events. Keystrokes are tiny and rare, so the capacity only needs to absorb a large paste.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

// Simple atomic counters (fetch_add relaxed) inspected by tests and logged at shutdown.
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static INPUT_CHUNKS: AtomicU64 = AtomicU64::new(0);
pub static INPUT_BYTES: AtomicU64 = AtomicU64::new(0);
pub static RESIZE_EVENTS: AtomicU64 = AtomicU64::new(0);

/// Semantic meaning of one input chunk, produced by the key parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    // navigation
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Tab,
    ShiftTab,
    // editing
    Char(String),
    Backspace,
    DeleteWord,
    // commands
    Select,
    SelectAll,
    Confirm,
    Escape,
    Quit,
    Search,
    Uninstall,
    Yes,
    No,
    Force,
    PermApplyAll,
    BashAdd,
    BashDelete,
    /// No recognized meaning in the current mode.
    None,
}

impl Action {
    /// Stable discriminant name for logging. Typed text is never logged verbatim.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::Home => "home",
            Action::End => "end",
            Action::Tab => "tab",
            Action::ShiftTab => "shift_tab",
            Action::Char(_) => "char",
            Action::Backspace => "backspace",
            Action::DeleteWord => "delete_word",
            Action::Select => "select",
            Action::SelectAll => "select_all",
            Action::Confirm => "confirm",
            Action::Escape => "escape",
            Action::Quit => "quit",
            Action::Search => "search",
            Action::Uninstall => "uninstall",
            Action::Yes => "yes",
            Action::No => "no",
            Action::Force => "force",
            Action::PermApplyAll => "perm_apply_all",
            Action::BashAdd => "bash_add",
            Action::BashDelete => "bash_delete",
            Action::None => "none",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Action::None)
    }
}

/// Active branch of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Browse,
    Search,
    Confirm,
    PackDetail,
    Installing,
    Done,
    UninstallConfirm,
    Uninstalling,
    PresetSelect,
    PermissionEdit,
    BashEdit,
    BashInput,
    Quit,
}

impl Mode {
    pub const ALL: [Mode; 13] = [
        Mode::Browse,
        Mode::Search,
        Mode::Confirm,
        Mode::PackDetail,
        Mode::Installing,
        Mode::Done,
        Mode::UninstallConfirm,
        Mode::Uninstalling,
        Mode::PresetSelect,
        Mode::PermissionEdit,
        Mode::BashEdit,
        Mode::BashInput,
        Mode::Quit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Browse => "browse",
            Mode::Search => "search",
            Mode::Confirm => "confirm",
            Mode::PackDetail => "pack_detail",
            Mode::Installing => "installing",
            Mode::Done => "done",
            Mode::UninstallConfirm => "uninstall_confirm",
            Mode::Uninstalling => "uninstalling",
            Mode::PresetSelect => "preset_select",
            Mode::PermissionEdit => "permission_edit",
            Mode::BashEdit => "bash_edit",
            Mode::BashInput => "bash_input",
            Mode::Quit => "quit",
        }
    }

    /// Modes whose key map treats printable bytes as literal text.
    pub fn accepts_text(self) -> bool {
        matches!(self, Mode::Search | Mode::BashInput)
    }

    /// Modes that run an external collaborator and ignore user actions.
    pub fn is_busy(self) -> bool {
        matches!(self, Mode::Installing | Mode::Uninstalling)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-level signals that end the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitSignal {
    Interrupt,
    Terminate,
    HangUp,
}

impl ExitSignal {
    /// Conventional `128 + signo` process status.
    pub fn exit_code(self) -> i32 {
        match self {
            ExitSignal::Interrupt => 130,
            ExitSignal::Terminate => 143,
            ExitSignal::HangUp => 129,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExitSignal::Interrupt => "sigint",
            ExitSignal::Terminate => "sigterm",
            ExitSignal::HangUp => "sighup",
        }
    }
}

/// Raw input delivered by the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// One read's worth of stdin bytes; classified as a whole by the key parser.
    Bytes(Vec<u8>),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
}

/// Top-level event enum consumed by the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputEvent),
    /// Spinner interval elapsed; forces a redraw and drives flash expiry.
    Tick,
    Signal(ExitSignal),
    /// Stdin reached end of file or failed.
    InputClosed,
}

// -------------------------------------------------------------------------------------------------
// Async Event Sources
// -------------------------------------------------------------------------------------------------
// Each source owns one background task and terminates promptly once the channel is closed (send
// returns Err). The registry only spawns; supervision is left to the session.

/// Trait implemented by any async event producer.
pub trait AsyncEventSource: Send + 'static {
    /// Stable identifier used for logging.
    fn name(&self) -> &'static str;
    /// Consume self and spawn the background task.
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// Registry of event sources, spawned together at session start.
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl Default for EventSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Spawn all registered sources, each with its own clone of `tx`.
    ///
    /// Sources are drained so a second call spawns nothing. During shutdown the caller drops its
    /// final `Sender` before awaiting the handles so sources observe the closed channel.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            tracing::info!(target: "runtime.events", source = name, "spawning event source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}

/// Send helper shared by sources: counts failures and reports whether the channel is still open.
pub async fn forward(tx: &Sender<Event>, event: Event) -> bool {
    if tx.send(event).await.is_err() {
        CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
        return false;
    }
    true
}

/// Spinner tick source. Emits `Event::Tick` every configured interval.
pub struct TickEventSource {
    interval: Duration,
}

impl TickEventSource {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl AsyncEventSource for TickEventSource {
    fn name(&self) -> &'static str {
        "tick"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let dur = self.interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(dur);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it so the first redraw waits a full period.
            interval.tick().await;
            loop {
                interval.tick().await;
                if !forward(&tx, Event::Tick).await {
                    break;
                }
            }
        })
    }
}

/// Interrupt / terminate / hang-up listener.
///
/// Outside unix only Ctrl-C is observed.
#[derive(Default)]
pub struct SignalEventSource;

impl SignalEventSource {
    pub fn new() -> Self {
        Self
    }
}

impl AsyncEventSource for SignalEventSource {
    fn name(&self) -> &'static str {
        "signal"
    }

    #[cfg(unix)]
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        use tokio::signal::unix::{SignalKind, signal};
        tokio::spawn(async move {
            let (Ok(mut int), Ok(mut term), Ok(mut hup)) = (
                signal(SignalKind::interrupt()),
                signal(SignalKind::terminate()),
                signal(SignalKind::hangup()),
            ) else {
                tracing::warn!(target: "runtime.events", "signal handlers unavailable");
                return;
            };
            loop {
                let sig = tokio::select! {
                    _ = int.recv() => ExitSignal::Interrupt,
                    _ = term.recv() => ExitSignal::Terminate,
                    _ = hup.recv() => ExitSignal::HangUp,
                    _ = tx.closed() => break,
                };
                tracing::info!(target: "runtime.events", signal = sig.as_str(), "signal received");
                if !forward(&tx, Event::Signal(sig)).await {
                    break;
                }
            }
        })
    }

    #[cfg(not(unix))]
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => {
                        if res.is_err() || !forward(&tx, Event::Signal(ExitSignal::Interrupt)).await {
                            break;
                        }
                    }
                    _ = tx.closed() => break,
                }
            }
        })
    }
}

/// Function used by [`ResizeEventSource`] to read the current terminal size.
pub type SizeQuery = Box<dyn Fn() -> Option<(u16, u16)> + Send + Sync>;

/// Terminal resize source. On unix it waits for SIGWINCH; elsewhere it polls the size query
/// once per `fallback_poll`. Only changes in size are forwarded.
pub struct ResizeEventSource {
    query_size: SizeQuery,
    fallback_poll: Duration,
}

impl ResizeEventSource {
    pub fn new(query_size: SizeQuery) -> Self {
        Self {
            query_size,
            fallback_poll: Duration::from_millis(250),
        }
    }
}

impl AsyncEventSource for ResizeEventSource {
    fn name(&self) -> &'static str {
        "resize"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let ResizeEventSource {
            query_size,
            fallback_poll,
        } = *self;
        tokio::spawn(async move {
            let mut last = query_size();
            #[cfg(unix)]
            let mut winch =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::window_change()).ok();
            loop {
                #[cfg(unix)]
                let woke = match winch.as_mut() {
                    Some(stream) => tokio::select! {
                        got = stream.recv() => got.is_some(),
                        _ = tx.closed() => false,
                    },
                    None => wait_poll(&tx, fallback_poll).await,
                };
                #[cfg(not(unix))]
                let woke = wait_poll(&tx, fallback_poll).await;
                if !woke {
                    break;
                }
                let current = query_size();
                if current == last {
                    continue;
                }
                last = current;
                if let Some((cols, rows)) = current {
                    RESIZE_EVENTS.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(target: "runtime.events", cols, rows, "resize");
                    if !forward(&tx, Event::Input(InputEvent::Resize(cols, rows))).await {
                        break;
                    }
                }
            }
        })
    }
}

async fn wait_poll(tx: &Sender<Event>, every: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(every) => true,
        _ = tx.closed() => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_signal_numbers() {
        assert_eq!(ExitSignal::Interrupt.exit_code(), 130);
        assert_eq!(ExitSignal::Terminate.exit_code(), 143);
        assert_eq!(ExitSignal::HangUp.exit_code(), 129);
    }

    #[test]
    fn mode_names_are_unique() {
        let mut names: Vec<_> = Mode::ALL.iter().map(|m| m.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 13);
    }

    #[test]
    fn text_modes() {
        assert!(Mode::Search.accepts_text());
        assert!(Mode::BashInput.accepts_text());
        assert!(!Mode::Browse.accepts_text());
        assert!(Mode::Installing.is_busy());
        assert!(Mode::Uninstalling.is_busy());
    }

    #[test]
    fn action_names_hide_text() {
        assert_eq!(Action::Char("secret".into()).as_str(), "char");
        assert!(Action::None.is_none());
    }
}

#[cfg(test)]
mod tests_async_sources {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::mpsc;

    struct MockOnceSource;

    impl AsyncEventSource for MockOnceSource {
        fn name(&self) -> &'static str {
            "mock_once"
        }
        fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
            tokio::spawn(async move {
                let _ = tx.send(Event::Input(InputEvent::Bytes(b"q".to_vec()))).await;
            })
        }
    }

    #[tokio::test]
    async fn registry_spawns_and_emits() {
        let (tx, mut rx) = mpsc::channel::<Event>(8);
        let mut reg = EventSourceRegistry::new();
        reg.register(MockOnceSource);
        reg.register(TickEventSource::new(Duration::from_millis(5)));
        assert_eq!(reg.len(), 2);
        let handles = reg.spawn_all(&tx);
        assert!(reg.is_empty(), "spawn_all drains the registry");

        let mut got_input = false;
        let mut got_tick = false;
        let start = std::time::Instant::now();
        while start.elapsed() < Duration::from_millis(500) && (!got_input || !got_tick) {
            if let Ok(Some(ev)) = tokio::time::timeout(Duration::from_millis(20), rx.recv()).await
            {
                match ev {
                    Event::Input(InputEvent::Bytes(_)) => got_input = true,
                    Event::Tick => got_tick = true,
                    _ => {}
                }
            }
        }
        assert!(got_input, "expected mock source to produce input");
        assert!(got_tick, "expected tick source to emit tick events");

        drop(tx);
        drop(rx);
        for handle in handles {
            let _ = tokio::time::timeout(Duration::from_millis(50), handle).await;
        }
    }

    struct MockCloseSource {
        flag: Arc<AtomicBool>,
    }

    impl AsyncEventSource for MockCloseSource {
        fn name(&self) -> &'static str {
            "mock_close"
        }

        fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
            let flag = self.flag;
            tokio::spawn(async move {
                tx.closed().await;
                flag.store(true, Ordering::SeqCst);
            })
        }
    }

    #[tokio::test]
    async fn registry_sources_exit_on_channel_drop() {
        let (tx, rx) = mpsc::channel::<Event>(8);
        let mut reg = EventSourceRegistry::new();
        let flag = Arc::new(AtomicBool::new(false));
        reg.register(MockCloseSource { flag: flag.clone() });
        let handles = reg.spawn_all(&tx);

        drop(tx);
        drop(rx);

        for handle in handles {
            match tokio::time::timeout(Duration::from_millis(50), handle).await {
                Ok(join_res) => join_res.expect("source task should exit cleanly"),
                Err(_) => panic!("source task did not observe channel closure"),
            }
        }

        assert!(flag.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn resize_source_exits_when_channel_closes() {
        let (tx, rx) = mpsc::channel::<Event>(8);
        let mut reg = EventSourceRegistry::new();
        reg.register(ResizeEventSource::new(Box::new(|| Some((80, 24)))));
        let handles = reg.spawn_all(&tx);
        drop(tx);
        drop(rx);
        for handle in handles {
            assert!(
                tokio::time::timeout(Duration::from_millis(500), handle)
                    .await
                    .is_ok(),
                "resize source should stop after channel closure"
            );
        }
    }
}
