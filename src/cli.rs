// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! `execwrap` has two subcommands, `run-cli` and `run-file`. `run-cli` is the
//! default: its flags are also accepted at the top level, so
//! `execwrap --program echo --argument hi` and
//! `execwrap run-cli --program echo --argument hi` are equivalent.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use crate::exit_code;
use crate::invocation::Invocation;
use crate::types::Verbosity;

/// Command-line arguments for `execwrap`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "execwrap",
    version,
    about = "Run a program with a timeout and persist its output, exit code and process id.",
    long_about = None,
    args_conflicts_with_subcommands = true,
    after_help = exit_code_help()
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunOptions,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a program using the options given on the command line (default).
    RunCli(RunOptions),

    /// Run a program using the options stored in a TOML file.
    RunFile(RunFileArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunFileArgs {
    /// File which contains the run options.
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: PathBuf,
}

/// Raw, un-normalized run options.
///
/// The same shape is read from the command line (`clap`) and from run files
/// (`serde` + TOML, keys in snake_case). Nothing here is validated yet; see
/// [`crate::config::normalize`] and [`crate::config::builder`].
#[derive(Debug, Clone, Default, Args, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunOptions {
    /// Program which should be executed.
    #[arg(short = 'p', long, value_name = "PROGRAM")]
    pub program: Option<String>,

    /// Argument for the program which should be executed.
    ///
    /// On Unix it is split into words at whitespace; quotes group words and
    /// backslashes are kept as they are. On Windows it is passed unchanged.
    #[arg(short = 'a', long, value_name = "ARGUMENT", allow_hyphen_values = true)]
    pub argument: Option<String>,

    /// Specifies whether the argument is base64-encoded.
    #[arg(short = 'b', long)]
    pub argument_is_base64: bool,

    /// Working directory for the program which should be executed.
    #[arg(short = 'w', long, value_name = "DIR")]
    pub working_directory: Option<String>,

    /// Verbosity of execwrap.
    #[arg(short = 'v', long, value_enum, value_name = "LEVEL", default_value = "full")]
    pub verbosity: Verbosity,

    /// Log the stderr of the program as information instead of as warnings.
    #[arg(short = 'i', long)]
    pub treat_errors_as_information: bool,

    /// Prefix log lines with time, level and target.
    #[arg(short = 'g', long)]
    pub add_log_overhead: bool,

    /// Log file for execwrap.
    #[arg(short = 'f', long, value_name = "PATH")]
    pub log_file: Option<String>,

    /// File for the stdout of the executed program.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub stdout_file: Option<String>,

    /// File for the stderr of the executed program.
    #[arg(short = 'e', long, value_name = "PATH")]
    pub stderr_file: Option<String>,

    /// File for the exit code of the executed program.
    #[arg(short = 'x', long, value_name = "PATH")]
    pub exit_code_file: Option<String>,

    /// File for the process id of the executed program.
    #[arg(short = 'r', long, value_name = "PATH")]
    pub process_id_file: Option<String>,

    /// Maximal duration of the execution before it is aborted.
    ///
    /// Unbounded if omitted.
    #[arg(short = 'd', long, value_name = "MILLISECONDS")]
    pub timeout_milliseconds: Option<u64>,

    /// Title for the execution.
    #[arg(short = 't', long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Do not wait for the program to terminate.
    #[arg(short = 'n', long)]
    pub asynchronous: bool,

    /// Namespace for log lines.
    #[arg(short = 'l', long, value_name = "NAMESPACE")]
    pub log_namespace: Option<String>,

    /// Run the program as the given user.
    #[arg(short = 'u', long, value_name = "USER")]
    pub user: Option<String>,

    /// Password of the user.
    #[arg(short = 'c', long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Do not create a console window for the program (Windows only).
    #[arg(long)]
    pub hide_console_window: bool,
}

impl CliArgs {
    /// Resolve the parsed arguments into the invocation to perform.
    pub fn into_invocation(self) -> Invocation {
        match self.command {
            Some(Command::RunCli(options)) => Invocation::RunFromArgs(options),
            Some(Command::RunFile(args)) => Invocation::RunFromFile(args.file),
            None => Invocation::RunFromArgs(self.run),
        }
    }
}

fn exit_code_help() -> String {
    format!(
        "Exit codes:\n  \
         {}: no program was executed\n  \
         {}: a fatal error occurred\n  \
         {}: the program was aborted due to the timeout\n  \
         {}: the arguments could not be parsed\n  \
         {}: the program was started asynchronously\n\
         Otherwise the exit code of the executed program is returned.\n\
         On Unix only the low 8 bits reach the calling process; the full value\n\
         of an execution is written to the --exit-code-file, if one is given.",
        exit_code::NO_PROGRAM_EXECUTED,
        exit_code::FATAL_ERROR,
        exit_code::TIMEOUT,
        exit_code::PARSING_ERROR,
        exit_code::LAUNCHED_ASYNC,
    )
}

/// Convenience wrapper around `CliArgs::try_parse()`.
pub fn try_parse() -> Result<CliArgs, clap::Error> {
    CliArgs::try_parse()
}

/// Parse from an explicit argument list (first item is the binary name).
pub fn try_parse_from<I, T>(args: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    CliArgs::try_parse_from(args)
}
