// src/config/normalize.rs

//! Argument normalization.
//!
//! Option values often arrive wrapped in quotes by calling scripts, e.g.
//! `--working-directory "\"C:\\path\""`. Before validation every path-like
//! field is trimmed and unquoted, and a base64 argument is decoded.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::cli::RunOptions;
use crate::config::request::OutputFiles;
use crate::errors::{ExecwrapError, Result};
use crate::types::Verbosity;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Run options after trimming, unquoting and decoding.
///
/// Blank text fields are empty strings; blank paths are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedOptions {
    pub program: String,
    pub argument: String,
    pub working_directory: String,
    pub title: String,
    pub log_namespace: String,
    pub outputs: OutputFiles,
    pub verbosity: Verbosity,
    pub timeout_milliseconds: Option<u64>,
    pub asynchronous: bool,
    pub treat_errors_as_information: bool,
    pub add_log_overhead: bool,
    pub hide_console_window: bool,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Normalize raw run options.
///
/// Fails only if the argument is flagged as base64 and cannot be decoded.
pub fn normalize(options: &RunOptions) -> Result<NormalizedOptions> {
    let argument = trim_quotes(options.argument.as_deref());
    let argument = if options.argument_is_base64 {
        decode_base64_argument(&argument)?
    } else {
        argument
    };

    Ok(NormalizedOptions {
        program: trim_quotes(options.program.as_deref()),
        argument,
        working_directory: trim_quotes(options.working_directory.as_deref()),
        title: trim_quotes(options.title.as_deref()),
        log_namespace: trim_quotes(options.log_namespace.as_deref()),
        outputs: OutputFiles {
            stdout: normalize_path(options.stdout_file.as_deref()),
            stderr: normalize_path(options.stderr_file.as_deref()),
            exit_code: normalize_path(options.exit_code_file.as_deref()),
            process_id: normalize_path(options.process_id_file.as_deref()),
            log: normalize_path(options.log_file.as_deref()),
        },
        verbosity: options.verbosity,
        timeout_milliseconds: options.timeout_milliseconds,
        asynchronous: options.asynchronous,
        treat_errors_as_information: options.treat_errors_as_information,
        add_log_overhead: options.add_log_overhead,
        hide_console_window: options.hide_console_window,
        user: options
            .user
            .as_deref()
            .map(|u| trim_quotes(Some(u)))
            .filter(|u| !u.is_empty()),
        password: options.password.clone(),
    })
}

/// Trim whitespace and strip one leading and one trailing quote character.
///
/// `None` becomes the empty string.
pub fn trim_quotes(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };

    let mut s = value.trim();
    if let Some(rest) = s.strip_prefix(['"', '\'']) {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix(['"', '\'']) {
        s = rest;
    }
    s.trim().to_string()
}

fn normalize_path(value: Option<&str>) -> Option<PathBuf> {
    let s = trim_quotes(value);
    if s.is_empty() {
        None
    } else {
        Some(PathBuf::from(s))
    }
}

/// Decode a base64 argument as UTF-8 text, dropping a byte-order mark.
pub fn decode_base64_argument(encoded: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ExecwrapError::Decoding(format!("argument is not valid base64: {e}")))?;

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

    String::from_utf8(bytes.to_vec())
        .map_err(|e| ExecwrapError::Decoding(format!("decoded argument is not UTF-8: {e}")))
}
