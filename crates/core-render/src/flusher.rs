//! Diff-based screen flusher.
//!
//! Remembers the last frame written. The next frame is written in full when
//! there is no previous frame or the line count changed; otherwise only rows
//! whose text differs are rewritten. A frame equal to the previous one writes
//! nothing. Every write that happens is wrapped in a synchronized update so
//! the terminal presents it at once, unless the markers were turned off.

use crate::frame::Frame;
use crate::metrics::FlushMetrics;
use crate::writer::Writer;
use std::io::{self, Write};
use std::time::Instant;

/// What a call to [`ScreenFlusher::flush`] wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    Full { lines: usize },
    Diff { lines: usize },
    Unchanged,
}

pub struct ScreenFlusher<W: Write> {
    out: W,
    previous: Option<Vec<String>>,
    synchronized: bool,
    metrics: FlushMetrics,
}

impl<W: Write> ScreenFlusher<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            previous: None,
            synchronized: true,
            metrics: FlushMetrics::default(),
        }
    }

    /// Turn the synchronized-update markers off for terminals that do not understand them.
    pub fn with_synchronized_update(mut self, enabled: bool) -> Self {
        self.synchronized = enabled;
        self
    }

    pub fn metrics(&self) -> &FlushMetrics {
        &self.metrics
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Forget the last frame so the next flush is a full redraw (resize, resume).
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn flush(&mut self, frame: &Frame) -> io::Result<FlushOutcome> {
        let start = Instant::now();
        let lines = frame.lines();
        let mut w = Writer::new();

        let outcome = match self.previous.as_deref() {
            Some(prev) if prev.len() == lines.len() => {
                let changed: Vec<usize> = (0..lines.len()).filter(|&i| prev[i] != lines[i]).collect();
                if changed.is_empty() {
                    self.metrics.record_unchanged();
                    return Ok(FlushOutcome::Unchanged);
                }
                if self.synchronized {
                    w.begin_sync();
                }
                for &i in &changed {
                    w.move_to(0, row(i));
                    w.print(lines[i].as_str());
                }
                if self.synchronized {
                    w.end_sync();
                }
                FlushOutcome::Diff {
                    lines: changed.len(),
                }
            }
            _ => {
                if self.synchronized {
                    w.begin_sync();
                }
                w.move_to(0, 0);
                w.clear_to_end();
                for (i, line) in lines.iter().enumerate() {
                    w.move_to(0, row(i));
                    w.print(line.as_str());
                }
                if self.synchronized {
                    w.end_sync();
                }
                FlushOutcome::Full { lines: lines.len() }
            }
        };

        if let Err(e) = w.flush_to(&mut self.out) {
            // The screen is in an unknown state; redraw everything next time.
            self.previous = None;
            return Err(e);
        }
        self.previous = Some(lines.to_vec());

        match outcome {
            FlushOutcome::Full { lines } => self.metrics.record_full(lines),
            FlushOutcome::Diff { lines } => self.metrics.record_diff(lines),
            FlushOutcome::Unchanged => {}
        }
        let ns = start.elapsed().as_nanos() as u64;
        self.metrics.record_duration_ns(ns);
        tracing::trace!(target: "render.flush", ?outcome, ns, "flushed");
        Ok(outcome)
    }
}

fn row(i: usize) -> u16 {
    u16::try_from(i).unwrap_or(u16::MAX)
}
