//! dns-verifier entry point.
//!
//! Loads a zone dataset, checks every declared (name, type) pair against each
//! configured nameserver, and reports per-check results. Exits 0 only when
//! every check passed.

mod config;
mod input;
mod reporter;

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use dns_verifier_core::Verifier;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Cli, LogLevel, OutputFormat};
use reporter::{JsonReporter, Reporter, TextReporter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr; stdout carries the report.
fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .without_time()
                .with_target(false)
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

/// Returns whether every check passed.
async fn run(cli: &Cli) -> anyhow::Result<bool> {
    let zones = input::load_zones(cli.input_path())?;
    let verifier = Verifier::new(&cli.verifier_config())?;

    tracing::info!(
        "Verifying {} zone(s) against {} nameserver(s)",
        zones.len(),
        cli.nameservers.len()
    );

    let mut reporter: Box<dyn Reporter> = match cli.format {
        OutputFormat::Text => Box::new(TextReporter::new(io::stdout(), io::stderr())),
        OutputFormat::Json => Box::new(JsonReporter::new(io::stdout())),
    };

    let report = verifier
        .verify(&zones, |outcome| {
            if let Err(e) = reporter.outcome(outcome) {
                tracing::warn!("Failed to write check result: {e}");
            }
        })
        .await;

    reporter
        .finish(&report)
        .context("Failed to write summary")?;

    Ok(report.all_passed())
}
