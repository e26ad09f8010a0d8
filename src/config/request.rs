// src/config/request.rs

//! The validated, immutable description of one program execution.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::types::{Verbosity, WaitingPolicy};

/// Files that receive the results of an execution. Every entry is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFiles {
    pub stdout: Option<PathBuf>,
    pub stderr: Option<PathBuf>,
    pub exit_code: Option<PathBuf>,
    pub process_id: Option<PathBuf>,
    pub log: Option<PathBuf>,
}

/// Identity to run the program as.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// A fully validated execution request.
///
/// Built once by [`crate::config::builder::build_request`] and then only
/// read. The working directory is known to exist and the program is known to
/// be non-blank.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub(crate) program: String,
    pub(crate) argument: String,
    pub(crate) arguments: Vec<String>,
    pub(crate) working_directory: PathBuf,
    pub(crate) title: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) policy: WaitingPolicy,
    pub(crate) verbosity: Verbosity,
    pub(crate) log_namespace: String,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) outputs: OutputFiles,
    pub(crate) treat_errors_as_information: bool,
    pub(crate) hide_console_window: bool,
}

impl ExecutionRequest {
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument string as given (after decoding).
    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// The argument string split into individual arguments.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn working_directory(&self) -> &PathBuf {
        &self.working_directory
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// `None` means the program may run forever.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn policy(&self) -> WaitingPolicy {
        self.policy
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn log_namespace(&self) -> &str {
        &self.log_namespace
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn outputs(&self) -> &OutputFiles {
        &self.outputs
    }

    pub fn treat_errors_as_information(&self) -> bool {
        self.treat_errors_as_information
    }

    pub fn hide_console_window(&self) -> bool {
        self.hide_console_window
    }

    /// Human-readable form of the execution: `<workdir>>program argument`.
    pub fn command_line(&self) -> String {
        command_line(&self.working_directory, &self.program, &self.argument)
    }
}

pub(crate) fn command_line(working_directory: &std::path::Path, program: &str, argument: &str) -> String {
    format!("{}>{} {}", working_directory.display(), program, argument)
        .trim_end()
        .to_string()
}
