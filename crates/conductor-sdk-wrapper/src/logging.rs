//! Tracing setup. Stdout carries the response envelope, so logs go to stderr
//! and, optionally, to a rolling JSON file.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const LOG_FILE_PREFIX: &str = "conductor-sdk-wrapper.log";

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered file logs are flushed.
///
/// A log directory that cannot be used only disables the file layer; stderr
/// logging is installed regardless and reports the problem.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default_filter = if verbose {
        "conductor_sdk_wrapper=debug,conductor_client=debug,info"
    } else {
        "conductor_sdk_wrapper=warn,conductor_client=warn,error"
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let console = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let mut file_error = None;
    let (file, guard) = match log_dir.map(file_appender).transpose() {
        Ok(Some(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new(
                    "conductor_sdk_wrapper=trace,conductor_client=trace,info",
                ));
            (Some(layer), Some(guard))
        }
        Ok(None) => (None, None),
        Err(e) => {
            file_error = Some(e);
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("failed to install tracing subscriber")?;

    if let Some(e) = file_error {
        warn!(error = %format!("{e:#}"), "file logging disabled");
    }

    Ok(guard)
}

fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
        .with_context(|| format!("cannot write logs to {}", dir.display()))
}
