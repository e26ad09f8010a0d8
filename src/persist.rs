// src/persist.rs

//! Writing results to the configured output files.
//!
//! All files are appended to as UTF-8 without byte-order mark, one line per
//! entry. A failure on one file is logged and does not affect the others.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::ExecutionRequest;
use crate::exec::ExecutionResult;
use crate::exit_code;
use crate::types::Verbosity;

/// Write captured stdout, stderr and the exit code of a finished execution.
///
/// The three files are written concurrently.
pub async fn persist_result(request: &ExecutionRequest, result: &ExecutionResult) {
    let outputs = request.outputs();
    let code = exit_code::for_result(result);

    tokio::join!(
        best_effort("stdout", outputs.stdout.as_deref(), result.stdout()),
        best_effort("stderr", outputs.stderr.as_deref(), result.stderr()),
        write_number(
            request,
            result.execution_id(),
            "exit-code",
            outputs.exit_code.as_deref(),
            i64::from(code),
        ),
    );
}

/// Write the process id as soon as the child is running.
pub async fn persist_process_id(request: &ExecutionRequest, execution_id: Uuid, process_id: u32) {
    write_number(
        request,
        execution_id,
        "process-id",
        request.outputs().process_id.as_deref(),
        i64::from(process_id),
    )
    .await;
}

async fn write_number(
    request: &ExecutionRequest,
    execution_id: Uuid,
    field_name: &str,
    path: Option<&Path>,
    value: i64,
) {
    let mut lines = Vec::with_capacity(2);
    if request.verbosity() == Verbosity::Verbose {
        lines.push(describe(request, execution_id, field_name));
    }
    lines.push(value.to_string());

    best_effort(field_name, path, &lines).await;
}

/// The annotation line written before numbers in verbose mode.
pub fn describe(request: &ExecutionRequest, execution_id: Uuid, field_name: &str) -> String {
    format!(
        "Execution '{}' ('{}') with execution-id {} has {}",
        request.title(),
        request.command_line(),
        execution_id,
        field_name
    )
}

async fn best_effort(kind: &str, path: Option<&Path>, lines: &[String]) {
    let Some(path) = path else {
        return;
    };

    match append_lines(path, lines).await {
        Ok(resolved) => debug!(file = %resolved.display(), kind, lines = lines.len(), "output file written"),
        Err(e) => error!(file = %path.display(), kind, error = %format!("{e:#}"), "could not write output file"),
    }
}

/// Append `lines` to `path`, creating parent directories and the file.
///
/// Returns the absolute path that was written.
pub async fn append_lines(path: &Path, lines: &[String]) -> Result<PathBuf> {
    let path = std::path::absolute(path)
        .with_context(|| format!("resolving {:?} to an absolute path", path))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating dir {:?}", parent))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await
        .with_context(|| format!("opening {:?} for appending", path))?;

    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }

    file.write_all(content.as_bytes())
        .await
        .with_context(|| format!("writing to {:?}", path))?;
    file.flush()
        .await
        .with_context(|| format!("flushing {:?}", path))?;

    Ok(path)
}
