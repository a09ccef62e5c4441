//! Error taxonomy for verification runs.
//!
//! Every per-check error is local to one (nameserver, record group) pair and is
//! surfaced as a failed [`CheckOutcome`](crate::CheckOutcome); none of them
//! aborts sibling checks.

use serde::Serialize;
use thiserror::Error;

use crate::types::RecordType;

/// Failure of a single DNS exchange against one nameserver.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum QueryError {
    /// Network failure, timeout, or an unusable response datagram.
    #[error("transport error: {0}")]
    Transport(String),

    /// The nameserver answered with an empty datagram.
    #[error("empty response")]
    EmptyResponse,

    /// The response status code was not `NOERROR`.
    #[error("non-success response {name}")]
    NonSuccessRcode {
        /// Numeric response code.
        code: u16,
        /// Mnemonic (e.g. `NXDOMAIN`, `SERVFAIL`).
        name: String,
    },
}

/// Mismatch between a nameserver's answer set and the expected record group.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ValidationError {
    /// Number of answers differs from the number of expected records.
    #[error("expected {expected} records, got {actual}")]
    CountMismatch {
        /// Expected record count.
        expected: usize,
        /// Answer count.
        actual: usize,
    },

    /// An answer carries a TTL above the expected ceiling.
    #[error("expected ttl {ceiling}, got {actual}")]
    TtlExceeded {
        /// Maximum acceptable TTL.
        ceiling: u32,
        /// Offending TTL.
        actual: u32,
    },

    /// An answer's payload is of a different record type than requested.
    #[error("expected {expected} record, got {actual}")]
    WrongType {
        /// Requested type.
        expected: RecordType,
        /// Type of the offending answer.
        actual: RecordType,
    },

    /// Expected and actual comparison keys differ as sets.
    #[error("expected values {}, got {}", render_keys(.expected), render_keys(.actual))]
    ValueMismatch {
        /// Rendered expected keys, sorted.
        expected: Vec<String>,
        /// Rendered actual keys, sorted.
        actual: Vec<String>,
    },

    /// No comparison rule exists for this record type.
    #[error("unsupported record type {0}")]
    UnsupportedType(RecordType),
}

/// A check task ended without producing an outcome of its own.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum WorkerError {
    /// The task panicked or was cancelled.
    #[error("check aborted: {0}")]
    Aborted(String),
}

fn render_keys(keys: &[String]) -> String {
    format!("[{}]", keys.join(", "))
}

/// Reason a single check failed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CheckError {
    /// The query itself failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The answer did not match the expected group.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The check never completed.
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

impl CheckError {
    /// Whether the failure describes served data (as opposed to an unreachable
    /// or misbehaving nameserver). Used for log classification.
    #[must_use]
    pub fn is_data_mismatch(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Query(QueryError::NonSuccessRcode { .. }) => true,
            Self::Query(QueryError::Transport(_) | QueryError::EmptyResponse)
            | Self::Worker(_) => false,
        }
    }
}

/// Invalid verifier configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ConfigError {
    /// Nameserver endpoint could not be parsed.
    #[error("Invalid nameserver '{input}': {reason}")]
    InvalidNameserver {
        /// Raw endpoint text.
        input: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Rate limiter parameters are out of range.
    #[error("Invalid rate limit: {0}")]
    InvalidRateLimit(String),
}

/// Result type for a single DNS exchange.
pub type QueryResult<T> = std::result::Result<T, QueryError>;
