//! Text styling for frame lines.
//!
//! A [`Style`] is a set of attributes plus an optional foreground color and
//! renders as a single SGR sequence followed by a reset. [`Theme`] decides
//! whether styling is emitted at all: with color disabled every `paint` call
//! returns its text unchanged, so plain frames contain no escape bytes other
//! than the per-line clear.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const INVERSE = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Indexed(u8),
}

impl Color {
    fn push_sgr(self, out: &mut String) {
        let code = match self {
            Color::Red => "31",
            Color::Green => "32",
            Color::Yellow => "33",
            Color::Blue => "34",
            Color::Magenta => "35",
            Color::Cyan => "36",
            Color::White => "37",
            Color::BrightRed => "91",
            Color::BrightGreen => "92",
            Color::BrightYellow => "93",
            Color::BrightBlue => "94",
            Color::BrightMagenta => "95",
            Color::BrightCyan => "96",
            Color::BrightWhite => "97",
            Color::Indexed(n) => {
                out.push_str("38;5;");
                out.push_str(&n.to_string());
                return;
            }
        };
        out.push_str(code);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub attrs: Attr,
    pub fg: Option<Color>,
}

impl Style {
    pub const fn fg(color: Color) -> Self {
        Self {
            attrs: Attr::empty(),
            fg: Some(color),
        }
    }

    pub const fn attrs(attrs: Attr) -> Self {
        Self { attrs, fg: None }
    }

    pub const fn bold(self) -> Self {
        Self {
            attrs: self.attrs.union(Attr::BOLD),
            fg: self.fg,
        }
    }

    pub const fn dim(self) -> Self {
        Self {
            attrs: self.attrs.union(Attr::DIM),
            fg: self.fg,
        }
    }

    /// SGR parameter list, e.g. `1;96`.
    fn sgr(&self) -> String {
        let mut out = String::new();
        for (flag, code) in [(Attr::BOLD, "1"), (Attr::DIM, "2"), (Attr::INVERSE, "7")] {
            if self.attrs.contains(flag) {
                if !out.is_empty() {
                    out.push(';');
                }
                out.push_str(code);
            }
        }
        if let Some(fg) = self.fg {
            if !out.is_empty() {
                out.push(';');
            }
            fg.push_sgr(&mut out);
        }
        out
    }
}

pub const CYAN: Style = Style::fg(Color::Cyan);
pub const BOLD_CYAN: Style = Style::fg(Color::Cyan).bold();
pub const HEADING: Style = Style::fg(Color::BrightCyan).bold();
pub const BRIGHT_CYAN: Style = Style::fg(Color::BrightCyan);
pub const GREEN: Style = Style::fg(Color::Green);
pub const BRIGHT_GREEN: Style = Style::fg(Color::BrightGreen);
pub const SUCCESS: Style = Style::fg(Color::BrightGreen).bold();
pub const YELLOW: Style = Style::fg(Color::Yellow);
pub const RED: Style = Style::fg(Color::Red);
pub const ERROR: Style = Style::fg(Color::Red).bold();
pub const WHITE: Style = Style::fg(Color::White);
pub const BRIGHT_WHITE: Style = Style::fg(Color::BrightWhite);
pub const BOLD: Style = Style::attrs(Attr::BOLD);
pub const DIM: Style = Style::attrs(Attr::DIM);
pub const DIM_WHITE: Style = Style::fg(Color::White).dim();
pub const ACTIVE_TAB: Style = Style::attrs(Attr::BOLD.union(Attr::INVERSE));

/// 256-color navy background of the cursor row.
const ROW_BG: &str = "48;5;24";
const RESET: &str = "\x1b[0m";

/// Foreground for a category id in the list's category column.
pub fn category_style(id: &str) -> Style {
    Style::fg(match id {
        "languages" => Color::Yellow,
        "devtools" => Color::Cyan,
        "web" => Color::Magenta,
        "data-api" => Color::Green,
        "ai" => Color::BrightBlue,
        "security" => Color::BrightRed,
        "devops" => Color::BrightYellow,
        "mcp" => Color::BrightMagenta,
        "mobile" => Color::BrightCyan,
        "business" => Color::Blue,
        "research" => Color::BrightGreen,
        _ => Color::White,
    })
}

/// Bold foreground for an inactive tab.
pub fn tab_style(id: &str) -> Style {
    Style::fg(match id {
        "all" => Color::BrightWhite,
        "packs" => Color::BrightCyan,
        "languages" => Color::Yellow,
        "devtools" => Color::Cyan,
        "web" => Color::Magenta,
        "data-api" => Color::Green,
        "ai" => Color::BrightBlue,
        "security" => Color::BrightRed,
        "devops" => Color::BrightYellow,
        "mcp" => Color::BrightMagenta,
        "mobile" => Color::Indexed(208),
        "business" => Color::Blue,
        "research" => Color::BrightGreen,
        _ => Color::White,
    })
    .bold()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    color: bool,
}

impl Theme {
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    /// No styling at all, as for `NO_COLOR` or a dumb terminal.
    pub const fn plain() -> Self {
        Self::new(false)
    }

    pub const fn colored() -> Self {
        Self::new(true)
    }

    pub fn color_enabled(&self) -> bool {
        self.color
    }

    pub fn paint(&self, style: Style, text: &str) -> String {
        if !self.color || style == Style::default() {
            return text.to_string();
        }
        format!("\x1b[{}m{text}{RESET}", style.sgr())
    }

    /// Cursor-row background that survives the resets of nested spans.
    pub fn highlight_row(&self, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let inner = text.replace(RESET, &format!("\x1b[0;{ROW_BG}m"));
        format!("\x1b[{ROW_BG}m{inner}{RESET}")
    }
}
