// src/types.rs

use clap::ValueEnum;
use serde::Deserialize;

/// How much `execwrap` itself reports while running a program.
///
/// - `Quiet`: errors only.
/// - `Normal`: lifecycle messages.
/// - `Full`: lifecycle messages plus every line the child prints (default).
/// - `Verbose`: like `Full`, with debug output and annotated exit-code /
///   process-id files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    #[default]
    Full,
}

impl Verbosity {
    /// Whether captured child output is echoed to the log as it arrives.
    pub fn echoes_output(self) -> bool {
        matches!(self, Verbosity::Full | Verbosity::Verbose)
    }
}

/// Whether the caller waits for the child to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitingPolicy {
    Synchronous,
    Asynchronous,
}

impl WaitingPolicy {
    pub fn from_async_flag(asynchronous: bool) -> Self {
        if asynchronous {
            WaitingPolicy::Asynchronous
        } else {
            WaitingPolicy::Synchronous
        }
    }
}
