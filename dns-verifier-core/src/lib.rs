//! DNS Verifier Core Library
//!
//! Checks that live nameservers serve an expected set of DNS records:
//! - Grouping of expected records by (absolute name, type)
//! - One UDP query per (nameserver, group) pair, throttled by a shared rate limiter
//! - Per-type comparison of answers against expectations (A, AAAA, CNAME, CAA, MX, TXT)
//!
//! Every check produces exactly one [`CheckOutcome`]; a failing check never
//! stops its siblings. Console and process concerns live in the CLI crate.

pub mod config;
pub mod error;
pub mod services;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::VerifierConfig;
pub use error::{
    CheckError, ConfigError, QueryError, QueryResult, ValidationError, WorkerError,
};
pub use services::orchestrator::{CheckOrchestrator, RunReport};
pub use services::rate_limiter::RateLimiter;
pub use services::resolver::{DnsQuery, UdpResolverClient};
pub use services::Verifier;
pub use types::{
    AnswerData, AnswerRecord, CheckOutcome, ExpectedRecord, Nameserver, QueryTarget, RecordGroup,
    RecordType, Zone,
};
