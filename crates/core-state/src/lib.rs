//! Session state and the mode state machine.
//!
//! `State` is a plain value. [`reduce`] never mutates its input: it clones the
//! state (the manifest-derived [`Catalog`] is shared behind an `Arc`, so a
//! clone copies only the small per-session fields), applies one action through
//! the sub-reducer of the active [`Mode`], and returns the result. Actions a mode
//! does not handle return an identical state.
//!
//! Side effects stay outside this crate. Entering `Installing` or `Uninstalling`
//! is only a request; the orchestrator performs the work and feeds results back
//! through [`reduce_progress`]. Transient flash messages carry no timestamp: the
//! orchestrator times them and calls [`clear_flash`]. The spinner is a frame
//! counter advanced by [`tick_spinner`], which keeps rendering a function of the
//! state alone.
//!
//! Layout numbers shared with the renderer live here so that scrolling in the
//! reducer and the rows drawn by the renderer agree:
//! - `viewport_height = max(MIN_VIEWPORT, rows - CHROME_ROWS)`
//! - pack detail list: `max(1, vh - 2)`
//! - done list and install progress: `max(1, vh - 3)`

pub mod catalog;
pub mod cursor;
pub mod install;
pub mod perm;
mod reduce;

pub use catalog::{Catalog, PackSummary, TAB_ALL, TAB_PACKS, Tab};
pub use cursor::Cursor;
pub use install::{AgentResult, InstallContext, InstallState, Progress, reduce_progress};
pub use perm::PermState;
pub use reduce::reduce;

use core_events::Mode;
use core_registry::permissions::{PermissionMap, PresetChoice};
use core_registry::{AgentEntry, Manifest};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Rows outside the list viewport: five header rows, the bottom border, the
/// list column header and separator, the scroll info line and the status line.
pub const CHROME_ROWS: u16 = 10;
pub const MIN_VIEWPORT: usize = 5;
pub const MIN_COLS: u16 = 60;
pub const MIN_ROWS: u16 = 15;
pub const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub fn viewport_height(rows: u16) -> usize {
    (rows.saturating_sub(CHROME_ROWS) as usize).max(MIN_VIEWPORT)
}

pub fn pack_viewport(rows: u16) -> usize {
    viewport_height(rows).saturating_sub(2).max(1)
}

pub fn done_viewport(rows: u16) -> usize {
    viewport_height(rows).saturating_sub(3).max(1)
}

pub fn progress_viewport(rows: u16) -> usize {
    viewport_height(rows).saturating_sub(3).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub cols: u16,
    pub rows: u16,
}

impl TerminalSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    pub fn too_small(self) -> bool {
        self.cols < MIN_COLS || self.rows < MIN_ROWS
    }
}

/// One row of the main list: an index into the catalog's agents or packs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListItem {
    Agent(usize),
    Pack(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    pub items: Vec<ListItem>,
    pub cursor: Cursor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackDetail {
    /// Index into [`Catalog::packs`].
    pub pack: usize,
    pub agents: Vec<usize>,
    pub cursor: Cursor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub mode: Mode,
    pub catalog: Arc<Catalog>,
    pub active_tab: usize,
    pub list: ListState,
    pub selection: BTreeSet<String>,
    pub search: SearchState,
    pub pack_detail: Option<PackDetail>,
    pub installed: BTreeSet<String>,
    pub install: Option<InstallState>,
    pub perm: Option<PermState>,
    pub flash: Option<String>,
    pub uninstall_target: Option<String>,
    pub terminal: TerminalSize,
    pub spinner_frame: usize,
}

/// Build the session's starting state: browse mode on the "all" tab.
/// `installed` comes from the lock collaborator.
pub fn create_initial_state(
    manifest: Arc<Manifest>,
    terminal: TerminalSize,
    installed: BTreeSet<String>,
) -> State {
    let catalog = Arc::new(Catalog::new(manifest));
    let items = (0..catalog.agents().len()).map(ListItem::Agent).collect();
    State {
        mode: Mode::Browse,
        catalog,
        active_tab: 0,
        list: ListState {
            items,
            cursor: Cursor::default(),
        },
        selection: BTreeSet::new(),
        search: SearchState::default(),
        pack_detail: None,
        installed,
        install: None,
        perm: None,
        flash: None,
        uninstall_target: None,
        terminal,
        spinner_frame: 0,
    }
}

impl State {
    pub fn viewport_height(&self) -> usize {
        viewport_height(self.terminal.rows)
    }

    pub fn active_tab_id(&self) -> &str {
        self.catalog
            .tabs()
            .get(self.active_tab)
            .map(|t| t.id.as_str())
            .unwrap_or(TAB_ALL)
    }

    pub fn on_packs_tab(&self) -> bool {
        self.active_tab_id() == TAB_PACKS
    }

    pub fn cursor_item(&self) -> Option<ListItem> {
        self.list.items.get(self.list.cursor.index).copied()
    }

    /// Agent under the main list cursor, if the cursor is on an agent row.
    pub fn cursor_agent(&self) -> Option<&AgentEntry> {
        match self.cursor_item()? {
            ListItem::Agent(i) => self.catalog.agent(i),
            ListItem::Pack(_) => None,
        }
    }

    /// Agent whose permissions the editor is showing.
    pub fn perm_agent(&self) -> Option<&str> {
        let install = self.install.as_ref()?;
        let perm = self.perm.as_ref()?;
        install.agents.get(perm.agent_index).map(String::as_str)
    }

    /// Permission maps to hand to the installer, empty when the batch keeps
    /// each file's own permissions.
    pub fn install_permissions(&self) -> BTreeMap<String, PermissionMap> {
        match &self.perm {
            Some(perm) if matches!(perm.selected, Some(c) if c != PresetChoice::Skip) => {
                perm.permissions.clone()
            }
            _ => BTreeMap::new(),
        }
    }

    pub fn spinner(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }
}

pub fn clear_flash(state: &State) -> State {
    State {
        flash: None,
        ..state.clone()
    }
}

pub fn tick_spinner(state: &State) -> State {
    State {
        spinner_frame: state.spinner_frame.wrapping_add(1),
        ..state.clone()
    }
}

/// New terminal size; every list keeps its cursor inside the resized viewport.
pub fn resize(state: &State, terminal: TerminalSize) -> State {
    let mut s = state.clone();
    s.terminal = terminal;
    s.list.cursor = s.list.cursor.in_view(s.viewport_height());
    if let Some(detail) = s.pack_detail.as_mut() {
        detail.cursor = detail.cursor.in_view(pack_viewport(terminal.rows));
    }
    if let Some(install) = s.install.as_mut() {
        install.done = install.done.in_view(done_viewport(terminal.rows));
    }
    s
}
