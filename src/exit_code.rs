// src/exit_code.rs

//! Maps the outcome of an invocation onto `execwrap`'s own exit code.
//!
//! The reserved values sit just below `i32::MAX`, far outside the range of
//! exit codes ordinary programs produce.

use crate::errors::ExecwrapError;
use crate::exec::{ExecutionResult, TerminalState};
use crate::types::WaitingPolicy;

pub const NO_PROGRAM_EXECUTED: i32 = 2_147_393_801;
pub const FATAL_ERROR: i32 = 2_147_393_802;
pub const TIMEOUT: i32 = 2_147_393_803;
pub const PARSING_ERROR: i32 = 2_147_393_804;
/// Returned immediately when the program was started asynchronously.
pub const LAUNCHED_ASYNC: i32 = 2_147_393_805;

/// Exit code for a finished execution.
///
/// This is also the value recorded in the exit-code file, for both waiting
/// policies.
pub fn for_result(result: &ExecutionResult) -> i32 {
    match result.terminal_state() {
        Some(TerminalState::TerminatedByTimeout) => TIMEOUT,
        Some(TerminalState::TerminatedNormally) => result.exit_code().unwrap_or(FATAL_ERROR),
        Some(TerminalState::Failed) | None => FATAL_ERROR,
    }
}

/// Exit code `execwrap` returns to its own caller once `launch` is done.
///
/// Asynchronous runs never report the child's code here; the background task
/// writes it to the exit-code file instead.
pub fn for_launch(policy: WaitingPolicy, result: Option<&ExecutionResult>) -> i32 {
    match (policy, result) {
        (WaitingPolicy::Asynchronous, _) => LAUNCHED_ASYNC,
        (WaitingPolicy::Synchronous, Some(result)) => for_result(result),
        (WaitingPolicy::Synchronous, None) => FATAL_ERROR,
    }
}

/// Exit code for an invocation that ended in an error.
pub fn for_error(err: &ExecwrapError) -> i32 {
    match err {
        ExecwrapError::Configuration(_) | ExecwrapError::Decoding(_) => NO_PROGRAM_EXECUTED,
        ExecwrapError::Parsing(_) | ExecwrapError::Toml(_) => PARSING_ERROR,
        ExecwrapError::Execution(_) | ExecwrapError::Io(_) | ExecwrapError::Other(_) => {
            FATAL_ERROR
        }
    }
}
