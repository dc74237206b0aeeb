//! Terminal writer: an ordered batch of primitive commands emitted in one go.
//!
//! Positions are absolute with a (0,0) origin. Nothing reaches the output
//! until [`Writer::flush_to`], which queues every command and flushes once.

use crossterm::{
    cursor::MoveTo,
    queue,
    style::Print,
    terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate},
};
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    BeginSync,
    EndSync,
    MoveTo(u16, u16),
    ClearToEnd,
    Print(String),
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn begin_sync(&mut self) {
        self.cmds.push(Command::BeginSync);
    }

    pub fn end_sync(&mut self) {
        self.cmds.push(Command::EndSync);
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cmds.push(Command::MoveTo(x, y));
    }

    /// Clear from the cursor to the end of the screen.
    pub fn clear_to_end(&mut self) {
        self.cmds.push(Command::ClearToEnd);
    }

    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn flush_to<W: Write>(self, out: &mut W) -> io::Result<()> {
        for c in self.cmds {
            match c {
                Command::BeginSync => queue!(out, BeginSynchronizedUpdate)?,
                Command::EndSync => queue!(out, EndSynchronizedUpdate)?,
                Command::MoveTo(x, y) => queue!(out, MoveTo(x, y))?,
                Command::ClearToEnd => queue!(out, Clear(ClearType::FromCursorDown))?,
                Command::Print(s) => queue!(out, Print(s))?,
            }
        }
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prints_are_dropped() {
        let mut w = Writer::new();
        w.print("");
        assert!(w.is_empty());
        w.print("x");
        assert_eq!(w.commands(), &[Command::Print("x".into())]);
    }

    #[test]
    fn flush_emits_in_order() {
        let mut w = Writer::new();
        w.begin_sync();
        w.move_to(0, 2);
        w.print("abc");
        w.end_sync();
        let mut out = Vec::new();
        w.flush_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "\x1b[?2026h\x1b[3;1Habc\x1b[?2026l");
    }
}
