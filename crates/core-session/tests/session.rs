//! Session loop against scripted events, fake services and an in-memory terminal.

use core_events::{Event, EVENT_CHANNEL_CAP, ExitSignal, InputEvent, Mode};
use core_registry::permissions::PermissionMap;
use core_registry::{InstallOutcome, Manifest, UninstallOutcome};
use core_render::{ScreenFlusher, Theme};
use core_session::{ExitReason, Session, SessionOptions, SessionServices};
use core_state::{State, TerminalSize, create_initial_state};
use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

const MANIFEST: &str = r#"{
    "repo": "acme/agents",
    "categories": {
        "data": { "label": "Data", "icon": "🗄" },
        "languages": { "label": "Languages", "icon": "🦀" }
    },
    "agents": [
        { "name": "postgres-pro", "category": "data", "path": "data/postgres-pro", "description": "PostgreSQL tuning" },
        { "name": "rust-pro", "category": "languages", "path": "languages/rust-pro", "description": "Rust systems programming" },
        { "name": "api-designer", "category": "languages", "path": "languages/api-designer", "description": "REST endpoints" }
    ],
    "packs": {}
}"#;

const DOWN: &[u8] = b"\x1b[B";
const SPACE: &[u8] = b" ";
const ENTER: &[u8] = b"\r";

#[derive(Debug, Clone, PartialEq, Eq)]
struct InstallCall {
    name: String,
    force: bool,
    with_permissions: bool,
}

#[derive(Default)]
struct FakeServices {
    installed: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<InstallCall>>,
    uninstalled: Mutex<Vec<String>>,
    /// Per-agent outcome; anything absent installs.
    outcomes: BTreeMap<String, InstallOutcome>,
    delay: Option<Duration>,
}

impl FakeServices {
    fn with_installed(names: &[&str]) -> Self {
        Self {
            installed: Mutex::new(names.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<InstallCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl SessionServices for FakeServices {
    fn installed_set(&self) -> BTreeSet<String> {
        self.installed.lock().unwrap().clone()
    }

    async fn install(
        &self,
        name: &str,
        force: bool,
        permissions: Option<&PermissionMap>,
    ) -> InstallOutcome {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(InstallCall {
            name: name.to_string(),
            force,
            with_permissions: permissions.is_some(),
        });
        let outcome = self
            .outcomes
            .get(name)
            .copied()
            .unwrap_or(InstallOutcome::Installed);
        if outcome == InstallOutcome::Installed {
            self.installed.lock().unwrap().insert(name.to_string());
        }
        outcome
    }

    async fn uninstall(&self, name: &str) -> UninstallOutcome {
        self.uninstalled.lock().unwrap().push(name.to_string());
        if self.installed.lock().unwrap().remove(name) {
            UninstallOutcome::Removed
        } else {
            UninstallOutcome::NotFound
        }
    }
}

fn initial_state(services: &FakeServices) -> State {
    create_initial_state(
        Arc::new(Manifest::from_json(MANIFEST).unwrap()),
        TerminalSize::new(100, 30),
        services.installed_set(),
    )
}

fn keys(seq: &[&[u8]]) -> Vec<Event> {
    seq.iter()
        .map(|k| Event::Input(InputEvent::Bytes(k.to_vec())))
        .collect()
}

/// Queue `events`, close the channel and run the session to its end.
async fn run_session(
    services: FakeServices,
    events: Vec<Event>,
    options: SessionOptions,
) -> (ExitReason, Session<Vec<u8>, FakeServices>) {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAP);
    for event in events {
        tx.send(event).await.unwrap();
    }
    drop(tx);
    let state = initial_state(&services);
    let mut session = Session::new(
        state,
        ScreenFlusher::new(Vec::new()),
        Theme::plain(),
        services,
        rx,
        options,
    );
    let reason = session.run().await.unwrap();
    (reason, session)
}

fn output(session: &Session<Vec<u8>, FakeServices>) -> String {
    String::from_utf8_lossy(session.flusher().get_ref()).into_owned()
}

#[tokio::test]
async fn quit_key_exits_cleanly() {
    let (reason, session) =
        run_session(FakeServices::default(), keys(&[b"q"]), SessionOptions::default()).await;
    assert_eq!(reason, ExitReason::Quit);
    assert_eq!(reason.exit_code(), 0);
    assert_eq!(session.state().mode, Mode::Quit);
    assert!(output(&session).contains("AGENTDECK"));
}

#[tokio::test]
async fn ctrl_c_byte_is_an_interrupt_in_any_mode() {
    let (reason, _) = run_session(
        FakeServices::default(),
        keys(&[b"/", b"po", b"\x03"]),
        SessionOptions::default(),
    )
    .await;
    assert_eq!(reason, ExitReason::Signal(ExitSignal::Interrupt));
    assert_eq!(reason.exit_code(), 130);
}

#[tokio::test]
async fn signals_map_to_exit_codes() {
    for (sig, code) in [
        (ExitSignal::Interrupt, 130),
        (ExitSignal::Terminate, 143),
        (ExitSignal::HangUp, 129),
    ] {
        let (reason, _) = run_session(
            FakeServices::default(),
            vec![Event::Signal(sig)],
            SessionOptions::default(),
        )
        .await;
        assert_eq!(reason.exit_code(), code);
    }
}

#[tokio::test]
async fn input_closed_and_channel_closed_end_the_session() {
    let (reason, _) = run_session(
        FakeServices::default(),
        vec![Event::InputClosed],
        SessionOptions::default(),
    )
    .await;
    assert_eq!(reason, ExitReason::InputClosed);

    let (reason, session) =
        run_session(FakeServices::default(), Vec::new(), SessionOptions::default()).await;
    assert_eq!(reason, ExitReason::ChannelClosed);
    assert_eq!(session.flusher().metrics().snapshot().full_redraws, 1);
}

#[tokio::test]
async fn install_batch_runs_each_agent_and_lands_on_done() {
    // select postgres-pro and rust-pro, confirm, skip permissions
    let events = keys(&[SPACE, DOWN, SPACE, ENTER, b"y", ENTER]);
    let (reason, session) =
        run_session(FakeServices::default(), events, SessionOptions::default()).await;
    assert_eq!(reason, ExitReason::ChannelClosed);

    let state = session.state();
    assert_eq!(state.mode, Mode::Done);
    let install = state.install.as_ref().unwrap();
    assert_eq!(install.results.len(), 2);
    assert_eq!(install.count(InstallOutcome::Installed), 2);
    assert!(state.installed.contains("postgres-pro"));
    assert!(state.installed.contains("rust-pro"));
    assert_eq!(
        session.services().calls(),
        vec![
            InstallCall {
                name: "postgres-pro".into(),
                force: false,
                with_permissions: false,
            },
            InstallCall {
                name: "rust-pro".into(),
                force: false,
                with_permissions: false,
            },
        ]
    );
    // one redraw per started and finished agent plus the done screen
    let m = session.flusher().metrics().snapshot();
    assert!(m.full_redraws + m.diff_flushes >= 4);
    assert!(output(&session).contains("Press any key to continue"));
}

#[tokio::test]
async fn chosen_preset_is_passed_to_the_installer() {
    // preset list: Skip, Strict, Balanced, ...
    let events = keys(&[SPACE, ENTER, b"y", DOWN, DOWN, ENTER]);
    let (_, session) =
        run_session(FakeServices::default(), events, SessionOptions::default()).await;
    let calls = session.services().calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].with_permissions);
}

#[tokio::test]
async fn failures_and_skips_are_recorded_without_stopping_the_batch() {
    let services = FakeServices {
        installed: Mutex::new(["rust-pro".to_string()].into_iter().collect()),
        outcomes: [
            ("postgres-pro".to_string(), InstallOutcome::Failed),
            ("rust-pro".to_string(), InstallOutcome::Skipped),
        ]
        .into_iter()
        .collect(),
        ..Default::default()
    };
    // select all three, confirm, skip permissions
    let events = keys(&[b"a", ENTER, b"y", ENTER]);
    let (_, session) = run_session(services, events, SessionOptions::default()).await;
    let install = session.state().install.as_ref().unwrap();
    assert_eq!(session.state().mode, Mode::Done);
    assert_eq!(install.count(InstallOutcome::Failed), 1);
    assert_eq!(install.count(InstallOutcome::Skipped), 1);
    assert_eq!(install.count(InstallOutcome::Installed), 1);
    assert_eq!(session.services().calls().len(), 3);
}

#[tokio::test]
async fn force_from_done_reinstalls_skipped_with_force() {
    let services = FakeServices {
        outcomes: [("postgres-pro".to_string(), InstallOutcome::Skipped)]
            .into_iter()
            .collect(),
        ..Default::default()
    };
    let events = keys(&[SPACE, ENTER, b"y", ENTER, b"f"]);
    let (_, session) = run_session(services, events, SessionOptions::default()).await;
    let calls = session.services().calls();
    assert_eq!(calls.len(), 2);
    assert!(!calls[0].force);
    assert!(calls[1].force);
    assert_eq!(session.state().mode, Mode::Done);
}

#[tokio::test]
async fn input_during_a_batch_is_dropped() {
    let services = FakeServices {
        delay: Some(Duration::from_millis(30)),
        ..Default::default()
    };
    // In Done with nothing skipped any key would return to browse.
    let events = keys(&[SPACE, ENTER, b"y", ENTER, SPACE, DOWN]);
    let (_, session) = run_session(services, events, SessionOptions::default()).await;
    assert_eq!(session.state().mode, Mode::Done);
    assert_eq!(session.services().calls().len(), 1);
}

#[tokio::test]
async fn signal_during_a_batch_stops_it() {
    let services = FakeServices {
        delay: Some(Duration::from_millis(30)),
        ..Default::default()
    };
    let mut events = keys(&[b"a", ENTER, b"y", ENTER]);
    events.push(Event::Signal(ExitSignal::Terminate));
    let (reason, session) = run_session(services, events, SessionOptions::default()).await;
    assert_eq!(reason.exit_code(), 143);
    assert_eq!(session.state().mode, Mode::Installing);
    assert!(session.services().calls().is_empty());
}

#[tokio::test]
async fn uninstall_refreshes_installed_and_flashes() {
    let services = FakeServices::with_installed(&["rust-pro"]);
    let events = keys(&[DOWN, b"x", b"y"]);
    let (_, session) = run_session(services, events, SessionOptions::default()).await;
    let state = session.state();
    assert_eq!(state.mode, Mode::Browse);
    assert!(state.installed.is_empty());
    assert_eq!(state.flash.as_deref(), Some("Uninstalled \"rust-pro\""));
    assert_eq!(*session.services().uninstalled.lock().unwrap(), vec!["rust-pro"]);
}

#[tokio::test]
async fn flash_expires_on_a_later_tick() {
    let options = SessionOptions {
        flash_ttl: Duration::ZERO,
    };
    let mut events = keys(&[b"x"]);
    events.push(Event::Tick);
    let (_, session) = run_session(FakeServices::default(), events, options).await;
    assert_eq!(session.state().flash, None);

    let (_, session) =
        run_session(FakeServices::default(), keys(&[b"x"]), SessionOptions::default()).await;
    assert_eq!(
        session.state().flash.as_deref(),
        Some("\"postgres-pro\" is not installed")
    );
}

#[tokio::test]
async fn resize_redraws_in_full_at_the_new_size() {
    let events = vec![Event::Input(InputEvent::Resize(80, 20))];
    let (_, session) =
        run_session(FakeServices::default(), events, SessionOptions::default()).await;
    assert_eq!(session.state().terminal, TerminalSize::new(80, 20));
    assert_eq!(session.flusher().metrics().snapshot().full_redraws, 2);
}

#[tokio::test]
async fn too_small_terminal_only_lets_quit_through() {
    let mut events = vec![Event::Input(InputEvent::Resize(40, 5))];
    events.extend(keys(&[SPACE, ENTER, b"y", ENTER, b"x", b"y"]));
    events.extend(keys(&[b"q"]));
    let services = FakeServices::with_installed(&["postgres-pro"]);
    let (reason, session) = run_session(services, events, SessionOptions::default()).await;
    assert_eq!(reason, ExitReason::Quit);
    assert!(session.services().calls().is_empty());
    assert!(session.services().uninstalled.lock().unwrap().is_empty());
    assert!(session.state().selection.is_empty());
    assert_eq!(session.state().installed.len(), 1);
}

#[tokio::test]
async fn input_resumes_once_the_terminal_is_large_enough() {
    let events = vec![
        Event::Input(InputEvent::Resize(40, 5)),
        Event::Input(InputEvent::Bytes(SPACE.to_vec())),
        Event::Input(InputEvent::Resize(100, 30)),
        Event::Input(InputEvent::Bytes(SPACE.to_vec())),
    ];
    let (reason, session) =
        run_session(FakeServices::default(), events, SessionOptions::default()).await;
    assert_eq!(reason, ExitReason::ChannelClosed);
    assert_eq!(session.state().mode, Mode::Browse);
    assert_eq!(session.state().selection.len(), 1);
}

#[tokio::test]
async fn queued_events_are_coalesced_into_one_draw() {
    let events = keys(&[DOWN, DOWN, DOWN]);
    let (_, session) =
        run_session(FakeServices::default(), events, SessionOptions::default()).await;
    let m = session.flusher().metrics().snapshot();
    assert_eq!(m.full_redraws, 1);
    assert_eq!(m.diff_flushes, 1);
    assert_eq!(session.state().list.cursor.index, 2);
}

#[tokio::test]
async fn idle_tick_writes_nothing() {
    let (_, session) = run_session(
        FakeServices::default(),
        vec![Event::Tick],
        SessionOptions::default(),
    )
    .await;
    let m = session.flusher().metrics().snapshot();
    assert_eq!(m.unchanged, 1);
    assert_eq!(session.state().spinner_frame, 1);
}
