use core_events::{
    AsyncEventSource, CHANNEL_SEND_FAILURES, Event, INPUT_BYTES, INPUT_CHUNKS, InputEvent,
};
use std::sync::atomic::Ordering;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const READ_BUF: usize = 4_096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExitReason {
    ChannelClosed,
    StreamEnded,
    StreamError,
}

impl ExitReason {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::StreamEnded => "stream_ended",
            ExitReason::StreamError => "stream_error",
        }
    }
}

/// Forward each read from `reader` as one `InputEvent::Bytes` chunk.
///
/// A read is the unit the key parser classifies, so a pasted run arrives as a
/// single chunk and an escape sequence is never split from its tail.
pub(crate) async fn pump<R>(mut reader: R, tx: Sender<Event>) -> ExitReason
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUF];
    let reason = loop {
        let n = tokio::select! {
            biased;
            _ = tx.closed() => break ExitReason::ChannelClosed,
            read = reader.read(&mut buf) => match read {
                Ok(0) => break ExitReason::StreamEnded,
                Ok(n) => n,
                Err(err) => {
                    warn!(target: "input.thread", error_kind = ?err.kind(), "stdin_read_failed");
                    break ExitReason::StreamError;
                }
            },
        };
        crate::log_input_chunk(&buf[..n]);
        INPUT_CHUNKS.fetch_add(1, Ordering::Relaxed);
        INPUT_BYTES.fetch_add(n as u64, Ordering::Relaxed);
        if tx
            .send(Event::Input(InputEvent::Bytes(buf[..n].to_vec())))
            .await
            .is_err()
        {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            break ExitReason::ChannelClosed;
        }
    };
    if reason != ExitReason::ChannelClosed && tx.send(Event::InputClosed).await.is_err() {
        debug!(target: "input.thread", "input_closed_undelivered");
    }
    info!(target: "input.thread", reason = reason.as_str(), "stdin_reader_stopped");
    reason
}

/// Event source reading raw bytes from any async reader (stdin in production).
pub struct StdinEventSource<R> {
    reader: R,
}

impl StdinEventSource<tokio::io::Stdin> {
    pub fn stdin() -> Self {
        Self {
            reader: tokio::io::stdin(),
        }
    }
}

impl<R> StdinEventSource<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }
}

impl<R> AsyncEventSource for StdinEventSource<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    fn name(&self) -> &'static str {
        "stdin"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let reader = self.reader;
        tokio::spawn(async move {
            info!(target: "input.thread", "stdin_reader_started");
            pump(reader, tx).await;
        })
    }
}
