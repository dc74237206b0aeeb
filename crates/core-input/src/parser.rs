//! Byte sequence to `Action` classification.
//!
//! One read from stdin is classified as a whole. Escape sequences are matched
//! atomically against a fixed table, control bytes map to fixed actions in
//! every mode, and what remains (printable text) is interpreted per mode.

use core_events::{Action, Mode};

const CTRL_C: u8 = 0x03;
const CTRL_H: u8 = 0x08;
const CTRL_W: u8 = 0x17;
const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

/// Escape sequences recognized regardless of mode.
const ESCAPE_TABLE: &[(&[u8], Action)] = &[
    (b"\x1b[A", Action::Up),
    (b"\x1b[B", Action::Down),
    (b"\x1b[C", Action::Right),
    (b"\x1b[D", Action::Left),
    (b"\x1bOA", Action::Up),
    (b"\x1bOB", Action::Down),
    (b"\x1bOC", Action::Right),
    (b"\x1bOD", Action::Left),
    (b"\x1b[Z", Action::ShiftTab),
    (b"\x1b[5~", Action::PageUp),
    (b"\x1b[6~", Action::PageDown),
    (b"\x1b[H", Action::Home),
    (b"\x1bOH", Action::Home),
    (b"\x1b[1~", Action::Home),
    (b"\x1b[F", Action::End),
    (b"\x1bOF", Action::End),
    (b"\x1b[4~", Action::End),
];

/// Classify one input chunk in the context of `mode`.
pub fn parse_key(bytes: &[u8], mode: Mode) -> Action {
    let action = classify(bytes, mode);
    tracing::trace!(
        target: "input.parse",
        mode = mode.as_str(),
        len = bytes.len(),
        action = action.as_str(),
        "classified"
    );
    action
}

fn classify(bytes: &[u8], mode: Mode) -> Action {
    if bytes.is_empty() {
        return Action::None;
    }
    // Interrupt wins over everything, even inside a longer chunk.
    if bytes.contains(&CTRL_C) {
        return Action::Quit;
    }
    if bytes[0] == ESC {
        return escape(bytes);
    }
    if let [byte] = bytes
        && let Some(action) = control(*byte)
    {
        return action;
    }
    if bytes == b"\r\n" {
        return Action::Confirm;
    }
    let Some(text) = printable_run(bytes) else {
        return Action::None;
    };
    if mode.accepts_text() {
        return Action::Char(core_text::normalize_input(text));
    }
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => command_key(c, mode),
        _ => Action::None,
    }
}

fn escape(bytes: &[u8]) -> Action {
    if bytes.len() == 1 {
        return Action::Escape;
    }
    ESCAPE_TABLE
        .iter()
        .find(|(seq, _)| *seq == bytes)
        .map(|(_, action)| action.clone())
        .unwrap_or(Action::None)
}

fn control(byte: u8) -> Option<Action> {
    match byte {
        CTRL_W => Some(Action::DeleteWord),
        DEL | CTRL_H => Some(Action::Backspace),
        b'\t' => Some(Action::Tab),
        b'\r' | b'\n' => Some(Action::Confirm),
        _ => None,
    }
}

/// The chunk as text when it is valid UTF-8 without any control character.
fn printable_run(bytes: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(bytes).ok()?;
    (!text.chars().any(char::is_control)).then_some(text)
}

fn command_key(c: char, mode: Mode) -> Action {
    match mode {
        Mode::Browse | Mode::PackDetail => match c {
            ' ' => Action::Select,
            '/' => Action::Search,
            'q' | 'Q' => Action::Quit,
            'a' | 'A' => Action::SelectAll,
            'x' | 'X' => Action::Uninstall,
            _ => Action::None,
        },
        Mode::Confirm | Mode::UninstallConfirm | Mode::PresetSelect => match c {
            'y' | 'Y' | 'o' | 'O' => Action::Yes,
            'n' | 'N' => Action::No,
            _ => Action::None,
        },
        Mode::Done => match c {
            ' ' => Action::Select,
            'f' | 'F' => Action::Force,
            'q' | 'Q' => Action::Quit,
            _ => Action::None,
        },
        Mode::PermissionEdit => match c {
            'a' | 'A' => Action::PermApplyAll,
            'y' | 'Y' => Action::Yes,
            _ => Action::None,
        },
        Mode::BashEdit => match c {
            'n' | 'N' | 'a' | 'A' => Action::BashAdd,
            'd' | 'D' => Action::BashDelete,
            _ => Action::None,
        },
        Mode::Search
        | Mode::BashInput
        | Mode::Installing
        | Mode::Uninstalling
        | Mode::Quit => Action::None,
    }
}
