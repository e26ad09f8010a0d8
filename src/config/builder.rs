// src/config/builder.rs

//! Turns normalized options into a validated [`ExecutionRequest`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::normalize::NormalizedOptions;
use crate::config::request::{Credentials, ExecutionRequest, command_line};
use crate::errors::{ExecwrapError, Result};
use crate::types::WaitingPolicy;

/// Name used in derived titles.
pub const TOOL_NAME: &str = "execwrap";

/// Validate normalized options and build the execution request.
///
/// Checks, in order, failing on the first problem:
/// - the working directory exists (if one was given)
/// - a program was given
/// - the argument splits into individual arguments
pub fn build_request(options: NormalizedOptions) -> Result<ExecutionRequest> {
    let working_directory = resolve_working_directory(&options.working_directory)?;

    if options.program.trim().is_empty() {
        return Err(ExecwrapError::Configuration(
            "no program specified".to_string(),
        ));
    }

    let arguments = split_argument(&options.argument).map_err(|e| {
        ExecwrapError::Configuration(format!(
            "argument '{}' could not be split into arguments: {e}",
            options.argument
        ))
    })?;

    let title = if options.title.is_empty() {
        format!(
            "{TOOL_NAME}: '{}'",
            command_line(&working_directory, &options.program, &options.argument)
        )
    } else {
        options.title
    };

    let credentials = options.user.map(|user| Credentials {
        user,
        password: options.password,
    });

    Ok(ExecutionRequest {
        program: options.program,
        argument: options.argument,
        arguments,
        working_directory,
        title,
        timeout: options.timeout_milliseconds.map(Duration::from_millis),
        policy: WaitingPolicy::from_async_flag(options.asynchronous),
        verbosity: options.verbosity,
        log_namespace: options.log_namespace,
        credentials,
        outputs: options.outputs,
        treat_errors_as_information: options.treat_errors_as_information,
        hide_console_window: options.hide_console_window,
    })
}

/// Split the argument string into individual arguments.
///
/// Whitespace separates words and quotes group them, as in a POSIX shell,
/// but backslashes are plain characters: `C:\path` stays `C:\path`.
pub fn split_argument(argument: &str) -> std::result::Result<Vec<String>, shell_words::ParseError> {
    shell_words::split(&literal_backslashes(argument))
}

/// Escape every backslash that `shell_words` would otherwise consume.
///
/// Inside single quotes backslashes are already literal.
fn literal_backslashes(argument: &str) -> String {
    let mut escaped = String::with_capacity(argument.len());
    let (mut in_single, mut in_double) = (false, false);
    for c in argument.chars() {
        match c {
            '\\' if !in_single => {
                escaped.push_str("\\\\");
                continue;
            }
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            _ => {}
        }
        escaped.push(c);
    }
    escaped
}

fn resolve_working_directory(dir: &str) -> Result<PathBuf> {
    if dir.is_empty() {
        return std::env::current_dir().map_err(|e| {
            ExecwrapError::Configuration(format!(
                "current directory could not be determined: {e}"
            ))
        });
    }

    let path = Path::new(dir);
    if path.is_dir() {
        Ok(path.to_path_buf())
    } else {
        Err(ExecwrapError::Configuration(format!(
            "working directory '{dir}' does not exist"
        )))
    }
}
