// src/exec/spawn.rs

//! Building and starting the child process.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::{Instrument, debug, warn};

use crate::config::ExecutionRequest;
use crate::errors::{ExecwrapError, Result};

/// Program used to run a child as another user.
#[cfg(unix)]
const ELEVATION_PROGRAM: &str = "sudo";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Build the command for `request` without starting it.
pub fn build_command(request: &ExecutionRequest) -> Command {
    let mut cmd = base_command(request);

    cmd.current_dir(request.working_directory())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if password_for_stdin(request).is_some() {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.stdin(Stdio::null());
    }

    #[cfg(windows)]
    if request.hide_console_window() {
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    cmd
}

#[cfg(unix)]
fn base_command(request: &ExecutionRequest) -> Command {
    match request.credentials() {
        Some(credentials) => {
            let mut c = Command::new(ELEVATION_PROGRAM);
            c.arg("-S")
                .arg("-u")
                .arg(&credentials.user)
                .arg("--")
                .arg(request.program())
                .args(request.arguments());
            c
        }
        None => {
            let mut c = Command::new(request.program());
            c.args(request.arguments());
            c
        }
    }
}

#[cfg(not(unix))]
fn base_command(request: &ExecutionRequest) -> Command {
    if let Some(credentials) = request.credentials() {
        warn!(
            user = %credentials.user,
            "running as another user is only supported on Unix; using the current user"
        );
    }
    let mut c = Command::new(request.program());
    #[cfg(windows)]
    if !request.argument().is_empty() {
        // Windows programs parse their own command line.
        c.raw_arg(request.argument());
    }
    #[cfg(not(windows))]
    c.args(request.arguments());
    c
}

/// The password to write to the child's stdin, if any.
///
/// Only the elevation program ever receives it; without elevation the
/// password is never handed to the program itself.
#[cfg(unix)]
pub fn password_for_stdin(request: &ExecutionRequest) -> Option<&str> {
    request.credentials().and_then(|c| c.password.as_deref())
}

#[cfg(not(unix))]
pub fn password_for_stdin(_request: &ExecutionRequest) -> Option<&str> {
    None
}

/// Start the child described by `request`.
///
/// If the request carries a password it is written to the child's stdin
/// in the background.
pub fn spawn_child(request: &ExecutionRequest) -> Result<Child> {
    let mut child = build_command(request).spawn().map_err(|e| {
        ExecwrapError::Execution(format!(
            "could not start '{}' in {:?}: {e}",
            request.program(),
            request.working_directory()
        ))
    })?;

    if let Some(password) = password_for_stdin(request).map(str::to_owned) {
        if let Some(mut stdin) = child.stdin.take() {
            tokio::spawn(
                async move {
                    let line = format!("{password}\n");
                    if let Err(e) = stdin.write_all(line.as_bytes()).await {
                        warn!(error = %e, "could not pass password to the elevation program");
                    } else {
                        debug!("password passed to the elevation program");
                    }
                }
                .in_current_span(),
            );
        }
    }

    Ok(child)
}
