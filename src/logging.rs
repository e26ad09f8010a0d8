// src/logging.rs

//! Logging setup for `execwrap` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log filter:
//! 1. `EXECWRAP_LOG` environment variable (an `EnvFilter` directive such as
//!    "debug" or "execwrap=trace")
//! 2. the `--verbosity` of the run
//!
//! Logs are sent to STDERR and, if `--log-file` is given, appended to that
//! file as well. Without `--add-log-overhead` only the message is printed.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::NormalizedOptions;
use crate::types::Verbosity;

pub const LOG_ENV: &str = "EXECWRAP_LOG";

/// Log configuration for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub verbosity: Verbosity,
    pub log_file: Option<PathBuf>,
    pub add_log_overhead: bool,
}

impl LogSettings {
    pub fn from_options(options: &NormalizedOptions) -> Self {
        Self {
            verbosity: options.verbosity,
            log_file: options.outputs.log.clone(),
            add_log_overhead: options.add_log_overhead,
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initialise the global logging subscriber.
///
/// Safe to call once at startup; later calls return an error and leave the
/// first subscriber in place.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| EnvFilter::try_new(s.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new(level_for(settings.verbosity)));

    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(std::io::stderr, settings.add_log_overhead, true)];

    if let Some(path) = &settings.log_file {
        let file = open_log_file(path)?;
        layers.push(fmt_layer(Mutex::new(file), settings.add_log_overhead, false));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("installing the logging subscriber")?;

    Ok(())
}

fn fmt_layer<W>(writer: W, add_log_overhead: bool, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_thread_ids(false)
        .with_thread_names(false);

    if add_log_overhead {
        layer.with_target(true).boxed()
    } else {
        layer
            .without_time()
            .with_level(false)
            .with_target(false)
            .boxed()
    }
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    let path = std::path::absolute(path)
        .with_context(|| format!("resolving log file {:?}", path))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {:?}", path))
}

fn level_for(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal | Verbosity::Full => "info",
        Verbosity::Verbose => "debug",
    }
}
