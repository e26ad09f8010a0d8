// src/invocation.rs

use std::path::PathBuf;

use crate::cli::RunOptions;
use crate::config::load_run_file;
use crate::errors::Result;

/// Where the run options of an invocation come from.
#[derive(Debug, Clone)]
pub enum Invocation {
    /// Options given directly (command line or constructed in code).
    RunFromArgs(RunOptions),
    /// Options stored in a TOML run file.
    RunFromFile(PathBuf),
}

impl Invocation {
    /// Resolve to raw run options. Both variants end up on the same path.
    pub fn into_options(self) -> Result<RunOptions> {
        match self {
            Invocation::RunFromArgs(options) => Ok(options),
            Invocation::RunFromFile(path) => load_run_file(path),
        }
    }
}
