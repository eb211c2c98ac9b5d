//! Conductor SDK wrapper
//!
//! Runs one SDK operation per process and prints the outcome as a single JSON
//! line on stdout. Exit code is 0 on success and 1 on any failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::{error, warn};

mod config;
mod dispatch;
mod error;
mod logging;
mod operation;
mod response;

use config::ConnectionArgs;
use error::Result;
use operation::Invocation;
use response::SdkResponse;

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Conductor SDK test wrapper
#[derive(Parser, Debug)]
#[command(name = "conductor-sdk-wrapper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SDK operation, e.g. add-event or get-workflow
    #[arg(long)]
    pub operation: String,

    /// Operation parameters as a JSON object
    #[arg(long)]
    pub parameters: String,

    /// Resource the operation belongs to: event or workflow
    #[arg(long)]
    pub resource: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Also write JSON logs to this directory
    #[arg(long, env = "CONDUCTOR_WRAPPER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Enable verbose logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    fn invocation(&self) -> Invocation {
        Invocation::new(&self.resource, &self.operation, &self.parameters)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return emit(&SdkResponse::error(response::STATUS_ERROR, usage_error(&e)));
        }
    };

    let _guard = match logging::init(cli.verbose, cli.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("warning: logging disabled: {e:#}");
            None
        }
    };

    let result = run(&cli).await;
    match &result {
        Err(e) if e.is_local() => warn!(error = %e, "invocation rejected"),
        Err(e) => error!(error = %e, "SDK call failed"),
        Ok(_) => {}
    }

    emit(&SdkResponse::from_result(result))
}

/// Validate, connect, and dispatch.
async fn run(cli: &Cli) -> Result<serde_json::Value> {
    let operation = cli.invocation().parse()?;
    let client = cli.connection.client()?;
    dispatch::execute(&client, operation).await
}

/// One-line description of an argument error, without the usage block.
fn usage_error(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let detail = rendered.split("\n\n").next().unwrap_or_default();
    detail
        .trim_start_matches("error: ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Print the envelope and map it to the process exit code.
fn emit(response: &SdkResponse) -> ExitCode {
    println!("{}", response.to_json_line());
    if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
