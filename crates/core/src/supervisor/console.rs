//! Shared console for child output
//!
//! Every child gets two reader tasks (stdout and stderr) that split their
//! stream into lines and forward them to a single writer task. The writer owns
//! the [`ConsoleSink`], so lines from different services never tear.

use super::state::ProcessState;
use std::fmt;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// Everything the supervisor prints, attributed to a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    Started {
        service: String,
        command: String,
        pid: Option<u32>,
    },
    Output {
        service: String,
        stream: StreamKind,
        line: String,
    },
    Exited {
        service: String,
        state: ProcessState,
    },
    SpawnFailed {
        service: String,
        command: String,
        error: String,
    },
    /// Every launch of the batch was attempted; follows all its `Started` and
    /// `SpawnFailed` events
    Launched { running: usize, failed: usize },
}

impl ConsoleEvent {
    pub fn service(&self) -> Option<&str> {
        match self {
            ConsoleEvent::Started { service, .. }
            | ConsoleEvent::Output { service, .. }
            | ConsoleEvent::Exited { service, .. }
            | ConsoleEvent::SpawnFailed { service, .. } => Some(service),
            ConsoleEvent::Launched { .. } => None,
        }
    }
}

/// Destination of console events, driven by the writer task only
pub trait ConsoleSink: Send + 'static {
    fn write(&mut self, event: &ConsoleEvent);

    fn flush(&mut self) {}
}

/// Cloneable handle feeding the writer task
#[derive(Debug, Clone)]
pub struct Console {
    tx: mpsc::UnboundedSender<ConsoleEvent>,
}

impl Console {
    /// Start the writer task. It ends once every handle has been dropped.
    pub fn spawn<S: ConsoleSink>(mut sink: S) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ConsoleEvent>();

        let writer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                sink.write(&event);
            }
            sink.flush();
        });

        (Self { tx }, writer)
    }

    pub fn send(&self, event: ConsoleEvent) {
        // Only fails after the writer was aborted; nothing left to print to
        let _ = self.tx.send(event);
    }
}

/// Forward `reader` line by line until EOF. A trailing partial line is sent as-is.
pub(crate) async fn drain<R>(reader: R, service: String, stream: StreamKind, console: Console)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                console.send(ConsoleEvent::Output {
                    service: service.clone(),
                    stream,
                    line: String::from_utf8_lossy(&buf).into_owned(),
                });
            }
            Err(e) => {
                warn!(service = %service, "Stopped reading {}: {}", stream, e);
                break;
            }
        }
    }
}
