//! Command-line configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use dns_verifier_core::{Nameserver, VerifierConfig};

/// dns-verifier -- check that nameservers serve an expected zone dataset
#[derive(Debug, Parser)]
#[command(
    name = "dns-verifier",
    version,
    about = "Verify that live nameservers serve the records a zone dataset declares",
    long_about = "Reads a zone dataset (JSON) and queries every declared (name, type) pair \
        against each nameserver.\n\nExits 0 when every check passes and 1 otherwise."
)]
pub struct Cli {
    /// Zone dataset to verify ('-' reads stdin)
    #[arg(long, short = 'i', env = "DNS_VERIFIER_INPUT", default_value = "-")]
    pub input: PathBuf,

    /// Nameserver to check, as HOST, HOST:PORT or [IPV6]:PORT (repeatable)
    #[arg(
        long = "nameserver",
        short = 'n',
        env = "DNS_VERIFIER_NAMESERVERS",
        value_delimiter = ',',
        default_values_t = default_nameservers()
    )]
    pub nameservers: Vec<Nameserver>,

    /// Minimum spacing between check launches in milliseconds (0 disables throttling)
    #[arg(long, env = "DNS_VERIFIER_LAUNCH_INTERVAL_MS", default_value = "10")]
    pub launch_interval_ms: u64,

    /// Launches allowed back to back before spacing applies
    #[arg(long, env = "DNS_VERIFIER_BURST", default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub burst: u32,

    /// Per-query timeout in milliseconds
    #[arg(long, env = "DNS_VERIFIER_TIMEOUT_MS", default_value = "5000", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: u64,

    /// Report format
    #[arg(long, short = 'f', env = "DNS_VERIFIER_FORMAT", default_value = "text")]
    pub format: OutputFormat,

    /// Diagnostic log level (RUST_LOG takes precedence)
    #[arg(long, env = "DNS_VERIFIER_LOG_LEVEL", default_value = "warn")]
    pub log_level: LogLevel,
}

impl Cli {
    /// Dataset path, or `None` for stdin.
    pub fn input_path(&self) -> Option<&Path> {
        (self.input.as_os_str() != "-").then_some(self.input.as_path())
    }

    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig {
            nameservers: self.nameservers.clone(),
            launch_interval: Duration::from_millis(self.launch_interval_ms),
            burst: self.burst,
            query_timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

fn default_nameservers() -> Vec<Nameserver> {
    VerifierConfig::default().nameservers
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Progress dots and failure lines
    Text,
    /// One JSON object per check, then a summary object
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}
