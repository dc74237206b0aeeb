//! Frame rendering and screen output.
//!
//! [`render`] turns a session state into a [`Frame`]: one styled string per
//! terminal row, each starting with an erase-line sequence. Rendering is pure
//! and deterministic; the spinner glyph comes from the state's frame counter.
//!
//! [`ScreenFlusher`] owns the output stream and writes frames to it, rewriting
//! only the rows that changed since the previous frame.

pub mod flusher;
pub mod frame;
pub mod metrics;
pub mod style;
mod views;
pub mod writer;

pub use flusher::{FlushOutcome, ScreenFlusher};
pub use frame::{CLEAR_LINE, Frame};
pub use metrics::{FlushMetrics, FlushMetricsSnapshot};
pub use style::Theme;
pub use views::{TITLE, render};
