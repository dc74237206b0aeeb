//! Flush counters.
//!
//! Records what the flusher actually emitted: full redraws versus line diffs,
//! how many rows were rewritten, and how long the last flush took. Counters are
//! atomics so a snapshot can be taken through a shared reference.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct FlushMetrics {
    /// Frames written in full (first frame, line count change, invalidation).
    pub full_redraws: AtomicU64,
    /// Frames written as a diff of changed rows.
    pub diff_flushes: AtomicU64,
    /// Frames identical to the previous one; nothing was written.
    pub unchanged: AtomicU64,
    /// Rows emitted across all flushes.
    pub lines_written: AtomicU64,
    /// Duration (ns) of the most recent flush that wrote anything.
    pub last_flush_ns: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushMetricsSnapshot {
    pub full_redraws: u64,
    pub diff_flushes: u64,
    pub unchanged: u64,
    pub lines_written: u64,
    pub last_flush_ns: u64,
}

impl FlushMetrics {
    pub fn snapshot(&self) -> FlushMetricsSnapshot {
        FlushMetricsSnapshot {
            full_redraws: self.full_redraws.load(Ordering::Relaxed),
            diff_flushes: self.diff_flushes.load(Ordering::Relaxed),
            unchanged: self.unchanged.load(Ordering::Relaxed),
            lines_written: self.lines_written.load(Ordering::Relaxed),
            last_flush_ns: self.last_flush_ns.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_full(&self, lines: usize) {
        self.full_redraws.fetch_add(1, Ordering::Relaxed);
        self.lines_written.fetch_add(lines as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_diff(&self, lines: usize) {
        self.diff_flushes.fetch_add(1, Ordering::Relaxed);
        self.lines_written.fetch_add(lines as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_unchanged(&self) {
        self.unchanged.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duration_ns(&self, ns: u64) {
        self.last_flush_ns.store(ns, Ordering::Relaxed);
    }
}
