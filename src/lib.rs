// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod exit_code;
pub mod invocation;
pub mod logging;
pub mod persist;
pub mod types;

use tracing::{Instrument, Span, error, info, info_span};
use uuid::Uuid;

use crate::config::{ExecutionRequest, NormalizedOptions, build_request, normalize};
use crate::errors::{ExecwrapError, Result};
use crate::exec::{ExecutionResult, Launch, Orchestrator, ResultHandle, SupervisedTask};
use crate::invocation::Invocation;

/// What one invocation produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// `execwrap`'s own exit code.
    pub exit_code: i32,
    pub execution_id: Option<Uuid>,
    /// The finalized result, for synchronous runs and failed launches.
    pub result: Option<ExecutionResult>,
    /// The background supervisor of an asynchronous run.
    pub background: Option<SupervisedTask>,
}

impl RunOutcome {
    fn from_error(err: &ExecwrapError) -> Self {
        if err.is_pre_launch() {
            error!(error = %err, "no program was executed");
        } else {
            error!(error = %err, "execwrap failed");
        }
        Self {
            exit_code: exit_code::for_error(err),
            execution_id: None,
            result: None,
            background: None,
        }
    }

    /// Wait for background supervision (if any) and return the exit code.
    ///
    /// The exit code of an asynchronous run stays the launch sentinel; the
    /// program's own code only ends up in the exit-code file.
    pub async fn finish(self) -> i32 {
        if let Some(task) = self.background {
            let execution_id = task.execution_id();
            if let Err(err) = task.join().await {
                error!(execution_id = %execution_id, error = %err, "background supervision did not complete");
            }
        }
        self.exit_code
    }
}

/// High-level entry point: resolve, normalize, validate, execute.
///
/// Never fails; every error is logged and mapped to a reserved exit code.
pub async fn run(invocation: Invocation) -> RunOutcome {
    match prepare(invocation) {
        Ok(options) => execute(options).await,
        Err(err) => RunOutcome::from_error(&err),
    }
}

/// Resolve the invocation to run options and normalize them.
///
/// Split from [`execute`] so `main.rs` can set up logging from the
/// normalized options in between.
pub fn prepare(invocation: Invocation) -> Result<NormalizedOptions> {
    let options = invocation.into_options()?;
    normalize(&options)
}

/// Validate normalized options and run the program.
pub async fn execute(options: NormalizedOptions) -> RunOutcome {
    let request = match build_request(options) {
        Ok(request) => request,
        Err(err) => return RunOutcome::from_error(&err),
    };

    let span = namespace_span(request.log_namespace());
    execute_request(request).instrument(span).await
}

fn namespace_span(namespace: &str) -> Span {
    if namespace.is_empty() {
        Span::none()
    } else {
        info_span!("run", namespace = %namespace)
    }
}

async fn execute_request(request: ExecutionRequest) -> RunOutcome {
    let orchestrator = Orchestrator::new(request.clone());
    let execution_id = orchestrator.execution_id();

    match orchestrator.launch().await {
        Ok(Launch {
            handle: ResultHandle::Completed(result),
            ..
        }) => {
            persist::persist_result(&request, &result).await;
            let code = exit_code::for_launch(request.policy(), Some(&result));
            info!(execution_id = %execution_id, exit_code = code, "execution finished");
            RunOutcome {
                exit_code: code,
                execution_id: Some(execution_id),
                result: Some(result),
                background: None,
            }
        }
        Ok(Launch {
            process_id,
            handle: ResultHandle::Background(task),
            ..
        }) => {
            info!(execution_id = %execution_id, process_id, "program started asynchronously");
            RunOutcome {
                exit_code: exit_code::for_launch(request.policy(), None),
                execution_id: Some(execution_id),
                result: None,
                background: Some(task),
            }
        }
        Err(err) => {
            // The launch never produced a process; persist the empty result.
            let result = ExecutionResult::failed(execution_id);
            persist::persist_result(&request, &result).await;
            let mut outcome = RunOutcome::from_error(&err);
            outcome.execution_id = Some(execution_id);
            outcome.result = Some(result);
            outcome
        }
    }
}
