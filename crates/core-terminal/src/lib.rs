//! Terminal session resource and crossterm implementation.
//!
//! Entering a session switches the terminal to raw mode, the alternate screen
//! and a hidden cursor; leaving undoes all three. Leaving is idempotent, runs
//! on drop, and is also reachable through [`restore_terminal`] for paths that
//! do not own the backend (the panic hook).

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use std::io::{IsTerminal, stdout};
use std::sync::atomic::{AtomicBool, Ordering};

pub mod capabilities;
pub use capabilities::TerminalCapabilities;

/// Set while some backend holds the terminal in session mode.
static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn set_title(&mut self, title: &str) -> Result<()>;
}

pub struct CrosstermBackend {
    entered: bool,
}

/// RAII guard ensuring terminal state restoration even if caller early-returns or panics.
pub struct TerminalGuard<'a, B: TerminalBackend> {
    backend: &'a mut B,
    active: bool,
}

impl<'a, B: TerminalBackend> TerminalGuard<'a, B> {
    /// Enter `backend` and return a guard that will leave on drop.
    pub fn enter(backend: &'a mut B) -> Result<Self> {
        backend.enter()?;
        Ok(Self {
            backend,
            active: true,
        })
    }

    pub fn backend(&mut self) -> &mut B {
        self.backend
    }

    /// Leave now instead of at drop.
    pub fn release(mut self) -> Result<()> {
        self.active = false;
        self.backend.leave()
    }
}

impl<B: TerminalBackend> Drop for TerminalGuard<'_, B> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_, Self>> {
        TerminalGuard::enter(self)
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode().context("enable raw mode")?;
            SESSION_ACTIVE.store(true, Ordering::SeqCst);
            self.entered = true;
            execute!(stdout(), EnterAlternateScreen, Hide).context("enter alternate screen")?;
            tracing::debug!(target: "runtime.terminal", "entered");
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            self.entered = false;
            restore_terminal()?;
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

/// Leave the alternate screen, show the cursor and restore canonical input.
///
/// Does nothing unless a session is active, so it is safe to call from any
/// exit path, any number of times.
pub fn restore_terminal() -> Result<()> {
    if !SESSION_ACTIVE.swap(false, Ordering::SeqCst) {
        return Ok(());
    }
    let screen = execute!(stdout(), LeaveAlternateScreen, Show);
    disable_raw_mode().context("disable raw mode")?;
    screen.context("leave alternate screen")?;
    tracing::debug!(target: "runtime.terminal", "restored");
    Ok(())
}

/// Current (columns, rows), if the size can be read.
pub fn terminal_size() -> Option<(u16, u16)> {
    crossterm::terminal::size().ok()
}

/// Whether both stdin and stdout are attached to a terminal.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && stdout().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        entered: u32,
        left: u32,
        fail_enter: bool,
    }

    impl TerminalBackend for Recording {
        fn enter(&mut self) -> Result<()> {
            if self.fail_enter {
                anyhow::bail!("no tty");
            }
            self.entered += 1;
            Ok(())
        }
        fn leave(&mut self) -> Result<()> {
            self.left += 1;
            Ok(())
        }
        fn set_title(&mut self, _title: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn guard_leaves_on_drop() {
        let mut backend = Recording::default();
        {
            let _guard = TerminalGuard::enter(&mut backend).unwrap();
        }
        assert_eq!((backend.entered, backend.left), (1, 1));
    }

    #[test]
    fn release_leaves_exactly_once() {
        let mut backend = Recording::default();
        let guard = TerminalGuard::enter(&mut backend).unwrap();
        guard.release().unwrap();
        assert_eq!(backend.left, 1);
    }

    #[test]
    fn failed_enter_yields_no_guard() {
        let mut backend = Recording {
            fail_enter: true,
            ..Default::default()
        };
        assert!(TerminalGuard::enter(&mut backend).is_err());
        assert_eq!(backend.left, 0);
    }

    #[test]
    fn restore_without_session_is_a_no_op() {
        assert!(restore_terminal().is_ok());
        assert!(restore_terminal().is_ok());
    }
}
