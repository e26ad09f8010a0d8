// src/exec/streams.rs

//! Continuous draining of the child's stdout/stderr.
//!
//! Each stream gets its own Tokio task that reads until EOF, independent of
//! the exit wait, so a chatty child never blocks on a full pipe.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

/// Whether (and how loudly) captured lines are echoed to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoPolicy {
    pub enabled: bool,
    pub errors_as_information: bool,
}

/// Ordered, shared buffer of captured lines.
///
/// Shared so that lines captured before a reader is aborted are kept.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, line: String) {
        match self.lines.lock() {
            Ok(mut guard) => guard.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }

    /// Take all lines captured so far.
    pub fn take(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

/// Spawn a task that reads `stream` line by line into `buffer`.
///
/// Read errors end the capture with a warning; whatever was read before the
/// error stays in the buffer.
pub fn spawn_reader<R>(
    stream: R,
    kind: StreamKind,
    buffer: LineBuffer,
    echo: EchoPolicy,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(
        async move {
            let mut segments = BufReader::new(stream).split(b'\n');
            loop {
                match segments.next_segment().await {
                    Ok(Some(bytes)) => {
                        let line = decode_line(&bytes);
                        echo_line(kind, &line, echo);
                        buffer.push(line);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(stream = kind.as_str(), error = %e, "reading child output failed; treating as end of output");
                        break;
                    }
                }
            }
            debug!(stream = kind.as_str(), "output reader finished");
        }
        .in_current_span(),
    )
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

fn echo_line(kind: StreamKind, line: &str, echo: EchoPolicy) {
    if !echo.enabled {
        return;
    }
    match kind {
        StreamKind::Stdout => info!("{}", line),
        StreamKind::Stderr if echo.errors_as_information => info!("{}", line),
        StreamKind::Stderr => warn!("{}", line),
    }
}
