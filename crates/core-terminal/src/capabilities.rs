//! Terminal capability probing.
//!
//! Detection runs once at startup and only reads the environment: styling is
//! off under `NO_COLOR` (any value) or `TERM=dumb`, and a dumb terminal also
//! gets no synchronized-update markers.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TerminalCapabilities {
    pub color: bool,
    pub synchronized_update: bool,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some();
        let term = std::env::var("TERM").ok();
        Self::from_env(no_color, term.as_deref())
    }

    pub fn from_env(no_color: bool, term: Option<&str>) -> Self {
        let dumb = term == Some("dumb");
        Self {
            color: !no_color && !dumb,
            synchronized_update: !dumb,
        }
    }
}
