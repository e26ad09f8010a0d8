// src/main.rs

use clap::error::ErrorKind;
use tracing::error;

use execwrap::logging::{self, LogSettings};
use execwrap::{cli, exit_code};

#[tokio::main]
async fn main() {
    let code = run_main().await;
    std::process::exit(code);
}

async fn run_main() -> i32 {
    if std::env::args_os().len() <= 1 {
        print_banner();
        return 0;
    }

    let args = match cli::try_parse() {
        Ok(args) => args,
        Err(err) => return handle_parse_error(err),
    };

    let options = match execwrap::prepare(args.into_invocation()) {
        Ok(options) => options,
        Err(err) => {
            init_default_logging();
            error!(error = %err, "run options could not be read");
            return exit_code::for_error(&err);
        }
    };

    let settings = LogSettings::from_options(&options);
    if let Err(err) = logging::init_logging(&settings) {
        eprintln!("execwrap: logging setup failed: {err:#}");
        let fallback = LogSettings {
            log_file: None,
            ..settings
        };
        let _ = logging::init_logging(&fallback);
    }

    // Anything that escapes the pipeline (e.g. a panic) is still a defined exit.
    match tokio::spawn(execwrap::execute(options)).await {
        Ok(outcome) => outcome.finish().await,
        Err(err) => {
            error!(error = %err, "unexpected fault");
            exit_code::FATAL_ERROR
        }
    }
}

fn handle_parse_error(err: clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let _ = err.print();
            0
        }
        _ => {
            init_default_logging();
            let rendered = err.render().to_string();
            for line in rendered.lines().filter(|l| !l.trim().is_empty()) {
                error!("{}", line);
            }
            exit_code::PARSING_ERROR
        }
    }
}

fn init_default_logging() {
    let _ = logging::init_logging(&LogSettings::default());
}

fn print_banner() {
    println!("execwrap v{}", env!("CARGO_PKG_VERSION"));
    println!("Run 'execwrap --help' to get help about the usage.");
}
