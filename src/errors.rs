// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Each variant corresponds to one class of failure that the top-level
//! [`crate::run`] knows how to turn into a reserved exit code (see
//! [`crate::exit_code`]).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecwrapError {
    /// Invalid or missing program / working directory / argument.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed command-line or run-file input.
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// The base64 argument could not be decoded.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// The child process could not be started.
    #[error("Execution error: {0}")]
    Execution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExecwrapError {
    /// True for failures that happen before any program could be started.
    pub fn is_pre_launch(&self) -> bool {
        matches!(
            self,
            ExecwrapError::Configuration(_) | ExecwrapError::Decoding(_)
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ExecwrapError>;
