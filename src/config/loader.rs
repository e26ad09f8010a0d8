// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::RunOptions;
use crate::errors::{ExecwrapError, Result};

/// Load run options from a TOML run file.
///
/// A relative path is resolved against the current working directory. Keys
/// mirror the long CLI flags in snake_case, e.g.:
///
/// ```toml
/// program = "echo"
/// argument = "hello"
/// timeout_milliseconds = 5000
/// stdout_file = "out/stdout.txt"
/// ```
///
/// Unreadable files are configuration errors; malformed TOML and unknown
/// keys are parsing errors.
pub fn load_run_file(path: impl AsRef<Path>) -> Result<RunOptions> {
    let path = resolve_run_file(path.as_ref())?;

    let contents = fs::read_to_string(&path).map_err(|e| {
        ExecwrapError::Configuration(format!("reading run file at {:?}: {e}", path))
    })?;

    let options: RunOptions = toml::from_str(&contents).map_err(|e| {
        ExecwrapError::Parsing(format!("parsing TOML run file {:?}: {e}", path))
    })?;

    Ok(options)
}

fn resolve_run_file(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}
