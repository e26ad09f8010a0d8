// src/exec/orchestrator.rs

//! Launching and supervising one child process.
//!
//! Per execution there is one supervisor, an optional timeout watchdog and
//! two output readers, all Tokio tasks:
//!
//! - the readers drain stdout/stderr into [`LineBuffer`]s until EOF;
//! - the watchdog latches `TerminatedByTimeout` and requests a kill;
//! - the supervisor waits for either natural exit or the kill request,
//!   latches `TerminatedNormally` if it got there first, reaps the child and
//!   finalizes the [`ExecutionResult`].
//!
//! In synchronous mode [`Orchestrator::launch`] awaits the supervisor. In
//! asynchronous mode it returns right after the spawn and the supervisor runs
//! as a [`SupervisedTask`] that also persists the result.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, warn};
use uuid::Uuid;

use crate::config::ExecutionRequest;
use crate::errors::{ExecwrapError, Result};
use crate::exec::result::{ExecutionResult, TerminalLatch, TerminalState, Termination};
use crate::exec::spawn::spawn_child;
use crate::exec::streams::{EchoPolicy, LineBuffer, StreamKind, spawn_reader};
use crate::exec::watchdog::spawn_watchdog;
use crate::exit_code;
use crate::persist;
use crate::types::WaitingPolicy;

/// How long the readers may keep going after the child is gone.
///
/// A grandchild that inherited the pipes can hold them open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// What `launch` hands back.
#[derive(Debug)]
pub struct Launch {
    pub process_id: u32,
    pub execution_id: Uuid,
    pub handle: ResultHandle,
}

#[derive(Debug)]
pub enum ResultHandle {
    /// Synchronous run: the finalized result.
    Completed(ExecutionResult),
    /// Asynchronous run: the background supervisor.
    Background(SupervisedTask),
}

/// Background supervision of an asynchronous run.
///
/// The task persists the result and logs its completion on its own. Joining
/// is optional and only lets an owner observe the outcome.
#[derive(Debug)]
pub struct SupervisedTask {
    execution_id: Uuid,
    handle: JoinHandle<std::result::Result<ExecutionResult, String>>,
}

impl SupervisedTask {
    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the background supervision to complete.
    pub async fn join(self) -> Result<ExecutionResult> {
        match self.handle.await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(fault)) => Err(ExecwrapError::Other(anyhow::anyhow!(fault))),
            Err(e) => Err(ExecwrapError::Other(anyhow::anyhow!(
                "background monitor for execution {} failed: {e}",
                self.execution_id
            ))),
        }
    }
}

/// Runs one [`ExecutionRequest`].
#[derive(Debug)]
pub struct Orchestrator {
    request: Arc<ExecutionRequest>,
    execution_id: Uuid,
}

impl Orchestrator {
    /// Prepare an execution and mint its execution id.
    pub fn new(request: ExecutionRequest) -> Self {
        Self {
            request: Arc::new(request),
            execution_id: Uuid::new_v4(),
        }
    }

    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    pub fn request(&self) -> &ExecutionRequest {
        &self.request
    }

    /// Start the program and apply the request's waiting policy.
    ///
    /// Errors only if the program could not be started.
    pub async fn launch(self) -> Result<Launch> {
        let Orchestrator {
            request,
            execution_id,
        } = self;

        info!(
            execution_id = %execution_id,
            title = %request.title(),
            command = %request.command_line(),
            "starting program"
        );

        let mut result = ExecutionResult::new(execution_id);
        let mut child = match spawn_child(&request) {
            Ok(child) => child,
            Err(err) => {
                result.terminate(Termination {
                    state: TerminalState::Failed,
                    exit_code: None,
                });
                error!(execution_id = %execution_id, error = %err, "program could not be started");
                return Err(err);
            }
        };

        let Some(process_id) = child.id() else {
            result.terminate(Termination {
                state: TerminalState::Failed,
                exit_code: None,
            });
            return Err(ExecwrapError::Execution(format!(
                "'{}' exited before its process id could be read",
                request.program()
            )));
        };
        result.mark_running(process_id);
        debug!(execution_id = %execution_id, process_id, "program started");

        // Readers and the watchdog run before any file I/O.
        let supervision = Supervision::start(&mut child, &request);

        persist::persist_process_id(&request, execution_id, process_id).await;

        match request.policy() {
            WaitingPolicy::Synchronous => {
                let result = supervise(child, supervision, result).await;
                Ok(Launch {
                    process_id,
                    execution_id,
                    handle: ResultHandle::Completed(result),
                })
            }
            WaitingPolicy::Asynchronous => {
                let task = spawn_background(child, supervision, result, Arc::clone(&request));
                Ok(Launch {
                    process_id,
                    execution_id,
                    handle: ResultHandle::Background(task),
                })
            }
        }
    }
}

/// The helper tasks attached to a running child.
struct Supervision {
    latch: TerminalLatch,
    kill_rx: Option<oneshot::Receiver<()>>,
    watchdog: Option<JoinHandle<()>>,
    readers: Vec<JoinHandle<()>>,
    stdout: LineBuffer,
    stderr: LineBuffer,
}

impl Supervision {
    fn start(child: &mut Child, request: &ExecutionRequest) -> Self {
        let echo = EchoPolicy {
            enabled: request.verbosity().echoes_output(),
            errors_as_information: request.treat_errors_as_information(),
        };

        let stdout = LineBuffer::new();
        let stderr = LineBuffer::new();
        let mut readers = Vec::with_capacity(2);

        if let Some(out) = child.stdout.take() {
            readers.push(spawn_reader(out, StreamKind::Stdout, stdout.clone(), echo));
        }
        if let Some(err) = child.stderr.take() {
            readers.push(spawn_reader(err, StreamKind::Stderr, stderr.clone(), echo));
        }

        let latch = TerminalLatch::new();
        let (kill_rx, watchdog) = match request.timeout() {
            Some(timeout) => {
                let (kill_tx, kill_rx) = oneshot::channel::<()>();
                let watchdog = spawn_watchdog(timeout, latch.clone(), kill_tx);
                (Some(kill_rx), Some(watchdog))
            }
            None => (None, None),
        };

        Self {
            latch,
            kill_rx,
            watchdog,
            readers,
            stdout,
            stderr,
        }
    }
}

/// Wait for the child to reach a terminal state and finalize the result.
async fn supervise(
    mut child: Child,
    supervision: Supervision,
    mut result: ExecutionResult,
) -> ExecutionResult {
    let Supervision {
        latch,
        kill_rx,
        watchdog,
        readers,
        stdout,
        stderr,
    } = supervision;

    let kill_requested = async move {
        match kill_rx {
            Some(rx) => {
                if rx.await.is_err() {
                    pending::<()>().await;
                }
            }
            None => pending::<()>().await,
        }
    };

    // Either the process exits on its own, or the watchdog asks us to kill it.
    tokio::select! {
        status_res = child.wait() => {
            match status_res {
                Ok(status) => {
                    let code = status.code();
                    let won = latch.try_set(Termination {
                        state: TerminalState::TerminatedNormally,
                        exit_code: code,
                    });
                    if won {
                        info!(exit_code = ?code, success = status.success(), "program exited");
                    } else {
                        debug!(exit_code = ?code, "program exited after the timeout fired; ignoring its exit code");
                    }
                }
                Err(e) => {
                    latch.try_set(Termination {
                        state: TerminalState::Failed,
                        exit_code: None,
                    });
                    error!(error = %e, "waiting for the program failed");
                }
            }
        }

        _ = kill_requested => {
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to kill program after timeout");
            }
        }
    }

    if let Some(watchdog) = watchdog {
        watchdog.abort();
    }

    drain_readers(readers).await;

    let termination = latch.get().unwrap_or(Termination {
        state: TerminalState::Failed,
        exit_code: None,
    });
    result.terminate(termination);
    result.finalize(stdout.take(), stderr.take());
    result
}

async fn drain_readers(readers: Vec<JoinHandle<()>>) {
    let aborts: Vec<_> = readers.iter().map(|r| r.abort_handle()).collect();

    let all = async {
        for reader in readers {
            if let Err(e) = reader.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "output reader task failed");
                }
            }
        }
    };

    if tokio::time::timeout(DRAIN_GRACE, all).await.is_err() {
        warn!("output streams still open after the program terminated; keeping what was captured");
        for abort in aborts {
            abort.abort();
        }
    }
}

fn spawn_background(
    child: Child,
    supervision: Supervision,
    result: ExecutionResult,
    request: Arc<ExecutionRequest>,
) -> SupervisedTask {
    let execution_id = result.execution_id();

    let inner = tokio::spawn(
        async move {
            let result = supervise(child, supervision, result).await;
            persist::persist_result(&request, &result).await;
            result
        }
        .in_current_span(),
    );

    let handle = tokio::spawn(
        async move {
            match inner.await {
                Ok(result) => {
                    info!(
                        execution_id = %execution_id,
                        exit_code = exit_code::for_result(&result),
                        "asynchronous execution finished"
                    );
                    Ok(result)
                }
                Err(e) => {
                    error!(execution_id = %execution_id, error = %e, "asynchronous execution failed");
                    Err(format!("supervision of execution {execution_id} failed: {e}"))
                }
            }
        }
        .in_current_span(),
    );

    SupervisedTask {
        execution_id,
        handle,
    }
}
