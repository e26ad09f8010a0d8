#![allow(dead_code)]

use std::path::Path;

use execwrap::cli::RunOptions;
use execwrap::invocation::Invocation;
use execwrap::types::Verbosity;

/// Builder for `RunOptions` to simplify test setup.
pub struct RunOptionsBuilder {
    options: RunOptions,
}

impl RunOptionsBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            options: RunOptions {
                program: Some(program.to_string()),
                ..RunOptions::default()
            },
        }
    }

    pub fn argument(mut self, argument: &str) -> Self {
        self.options.argument = Some(argument.to_string());
        self
    }

    pub fn base64_argument(mut self, encoded: &str) -> Self {
        self.options.argument = Some(encoded.to_string());
        self.options.argument_is_base64 = true;
        self
    }

    pub fn working_directory(mut self, dir: impl AsRef<Path>) -> Self {
        self.options.working_directory = Some(dir.as_ref().display().to_string());
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.options.verbosity = verbosity;
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.options.timeout_milliseconds = Some(ms);
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.options.title = Some(title.to_string());
        self
    }

    pub fn asynchronous(mut self) -> Self {
        self.options.asynchronous = true;
        self
    }

    pub fn log_namespace(mut self, namespace: &str) -> Self {
        self.options.log_namespace = Some(namespace.to_string());
        self
    }

    /// Route stdout, stderr, exit-code and process-id files into `dir`
    /// as `stdout.txt`, `stderr.txt`, `exitcode.txt` and `pid.txt`.
    pub fn outputs_in(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let path = |name: &str| Some(dir.join(name).display().to_string());
        self.options.stdout_file = path("stdout.txt");
        self.options.stderr_file = path("stderr.txt");
        self.options.exit_code_file = path("exitcode.txt");
        self.options.process_id_file = path("pid.txt");
        self
    }

    pub fn build(self) -> RunOptions {
        self.options
    }

    pub fn invocation(self) -> Invocation {
        Invocation::RunFromArgs(self.options)
    }
}
