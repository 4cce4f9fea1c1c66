//! CLI entry point for the page-loader tool.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use page_loader_core::{
    CONNECT_TIMEOUT_SECS, DEFAULT_CONCURRENCY, HttpClient, PageLoader, READ_TIMEOUT_SECS,
};
use tracing::{debug, info};

mod app_config;
mod cli;

use app_config::{FileConfig, VerbositySetting};
use cli::Args;

/// Final outcome of a run, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    Success,
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(outcome: ProcessExit) -> Self {
        match outcome {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    let file_config = app_config::load_default_file_config()
        .context("Failed to load page-loader configuration")?
        .unwrap_or_default();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(default_log_level(&args, file_config.verbosity))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, ?file_config, "CLI arguments parsed");

    let outcome = run(&args, &file_config).await?;
    Ok(outcome.into())
}

async fn run(args: &Args, file_config: &FileConfig) -> Result<ProcessExit> {
    let output_dir = resolve_output_dir(args, file_config)?;
    let concurrency = args
        .concurrency
        .or(file_config.concurrency)
        .map_or(DEFAULT_CONCURRENCY, usize::from);

    let client = HttpClient::new_with_timeouts(
        file_config
            .connect_timeout_secs
            .unwrap_or(CONNECT_TIMEOUT_SECS),
        file_config.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS),
    );
    let loader = PageLoader::with_concurrency(client, concurrency)?;

    info!(url = %args.url, output = %output_dir.display(), "page-loader starting");
    match loader.run(&args.url, &output_dir).await {
        Ok(saved) => {
            for path in saved.iter() {
                println!("{}", path.display());
            }
            Ok(ProcessExit::Success)
        }
        Err(e) => {
            debug!(error = ?e, "page download failed");
            eprintln!("page-loader: {e}");
            Ok(ProcessExit::Failure)
        }
    }
}

/// Priority: quiet flag > verbose flag > config verbosity > info.
/// `RUST_LOG` is checked by the caller and beats all of them.
fn default_log_level(args: &Args, configured: Option<VerbositySetting>) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => configured.map_or("info", VerbositySetting::log_level),
        1 => "debug",
        _ => "trace",
    }
}

fn resolve_output_dir(args: &Args, file_config: &FileConfig) -> Result<PathBuf> {
    if let Some(output) = args.output.clone().or_else(|| file_config.output_dir.clone()) {
        return Ok(output);
    }
    std::env::current_dir().context("Failed to determine the current directory")
}
