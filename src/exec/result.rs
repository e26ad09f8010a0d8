// src/exec/result.rs

//! Execution state machine and the result record it produces.
//!
//! ```text
//! NotStarted ──spawn ok──▶ Running ──exit──────▶ Terminated(TerminatedNormally) ─┐
//!     │                       ├──timeout──────▶ Terminated(TerminatedByTimeout) ─┼─▶ Finalized
//!     └──spawn error──┐       └──fault────────▶ Terminated(Failed) ──────────────┘
//!                     └─────────────────────────▶ Terminated(Failed)
//! ```
//!
//! Only the first terminal transition is honoured. The watchdog and the exit
//! observer race through a [`TerminalLatch`]; the supervisor copies the
//! winning [`Termination`] into the result when it finalizes.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Non-reversible end states of a supervised execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    TerminatedNormally,
    TerminatedByTimeout,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    NotStarted,
    Running,
    Terminated(TerminalState),
    /// Terminal and frozen: output drained and end time recorded.
    Finalized(TerminalState),
}

/// The winning terminal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    pub state: TerminalState,
    pub exit_code: Option<i32>,
}

/// First-writer-wins slot for the terminal transition.
///
/// Cloning shares the slot.
#[derive(Debug, Clone, Default)]
pub struct TerminalLatch {
    slot: Arc<Mutex<Option<Termination>>>,
}

impl TerminalLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `termination` unless a terminal state was already recorded.
    ///
    /// Returns `true` if this call won.
    pub fn try_set(&self, termination: Termination) -> bool {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(termination);
        true
    }

    pub fn get(&self) -> Option<Termination> {
        match self.slot.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Everything known about one execution.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    execution_id: Uuid,
    process_id: Option<u32>,
    state: ExecutionState,
    exit_code: Option<i32>,
    timed_out: bool,
    stdout: Vec<String>,
    stderr: Vec<String>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl ExecutionResult {
    pub fn new(execution_id: Uuid) -> Self {
        Self {
            execution_id,
            process_id: None,
            state: ExecutionState::NotStarted,
            exit_code: None,
            timed_out: false,
            stdout: Vec::new(),
            stderr: Vec::new(),
            started_at: None,
            ended_at: None,
        }
    }

    /// An empty, finalized result for an execution that never started.
    pub fn failed(execution_id: Uuid) -> Self {
        let mut result = Self::new(execution_id);
        result.terminate(Termination {
            state: TerminalState::Failed,
            exit_code: None,
        });
        result.finalize(Vec::new(), Vec::new());
        result
    }

    pub(crate) fn mark_running(&mut self, process_id: u32) {
        if self.state == ExecutionState::NotStarted {
            self.process_id = Some(process_id);
            self.started_at = Some(Utc::now());
            self.state = ExecutionState::Running;
        }
    }

    /// Apply a terminal transition. Ignored once a terminal state exists.
    pub(crate) fn terminate(&mut self, termination: Termination) -> bool {
        match self.state {
            ExecutionState::NotStarted | ExecutionState::Running => {
                self.state = ExecutionState::Terminated(termination.state);
                self.exit_code = termination.exit_code;
                self.timed_out = termination.state == TerminalState::TerminatedByTimeout;
                true
            }
            ExecutionState::Terminated(_) | ExecutionState::Finalized(_) => false,
        }
    }

    /// Freeze the result with the drained output.
    pub(crate) fn finalize(&mut self, stdout: Vec<String>, stderr: Vec<String>) {
        if let ExecutionState::Terminated(state) = self.state {
            self.stdout = stdout;
            self.stderr = stderr;
            self.ended_at = Some(Utc::now());
            self.state = ExecutionState::Finalized(state);
        }
    }

    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    pub fn process_id(&self) -> Option<u32> {
        self.process_id
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn terminal_state(&self) -> Option<TerminalState> {
        match self.state {
            ExecutionState::Terminated(s) | ExecutionState::Finalized(s) => Some(s),
            ExecutionState::NotStarted | ExecutionState::Running => None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, ExecutionState::Finalized(_))
    }

    /// Exit code of the child; the reserved timeout code after a timeout.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn stdout(&self) -> &[String] {
        &self.stdout
    }

    pub fn stderr(&self) -> &[String] {
        &self.stderr
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }
}
