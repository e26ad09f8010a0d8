// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs the requested program with `tokio::process::Command`
//! and supervises it until it reaches a terminal state.
//!
//! - [`orchestrator`] launches the child and applies the waiting policy.
//! - [`spawn`] builds the platform command (including elevation).
//! - [`streams`] drains stdout/stderr into ordered line buffers.
//! - [`watchdog`] enforces the timeout.
//! - [`result`] holds the state machine and the [`ExecutionResult`].

pub mod orchestrator;
pub mod result;
pub mod spawn;
pub mod streams;
pub mod watchdog;

pub use orchestrator::{Launch, Orchestrator, ResultHandle, SupervisedTask};
pub use result::{ExecutionResult, ExecutionState, TerminalLatch, TerminalState, Termination};
