//! Keyboard input for the interactive session: the stdin byte reader and the
//! mode-aware key parser.

mod parser;
mod stdin_service;

pub use parser::parse_key;
pub use stdin_service::StdinEventSource;

/// Log the arrival of one input chunk. Only its size is recorded; typed or
/// pasted text never reaches the log.
#[inline]
pub(crate) fn log_input_chunk(chunk: &[u8]) {
    tracing::trace!(
        target: "input.read",
        size_bytes = chunk.len(),
        escape = chunk.first() == Some(&0x1b),
        "chunk"
    );
}
