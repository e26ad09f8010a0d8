// src/exec/watchdog.rs

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, warn};

use crate::exec::result::{TerminalLatch, TerminalState, Termination};
use crate::exit_code;

/// Spawn the timeout watchdog.
///
/// When `timeout` elapses the watchdog tries to latch `TerminatedByTimeout`.
/// If it wins, it asks the supervisor to kill the child via `kill_tx`; if the
/// child already terminated, it does nothing. The supervisor aborts the
/// watchdog once the child is gone.
pub fn spawn_watchdog(
    timeout: Duration,
    latch: TerminalLatch,
    kill_tx: oneshot::Sender<()>,
) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            tokio::time::sleep(timeout).await;

            let won = latch.try_set(Termination {
                state: TerminalState::TerminatedByTimeout,
                exit_code: Some(exit_code::TIMEOUT),
            });

            if won {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "program exceeded its timeout; killing it"
                );
                if kill_tx.send(()).is_err() {
                    debug!("supervisor gone before kill request could be delivered");
                }
            } else {
                debug!("timeout elapsed after the program had already terminated");
            }
        }
        .in_current_span(),
    )
}
