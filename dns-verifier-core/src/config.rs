//! Library-side run configuration.

use std::time::Duration;

use crate::error::ConfigError;
use crate::services::rate_limiter::{RateLimiter, DEFAULT_BURST, DEFAULT_LAUNCH_INTERVAL};
use crate::services::resolver::DEFAULT_QUERY_TIMEOUT;
use crate::types::{Nameserver, DEFAULT_DNS_PORT};

/// Public resolvers checked when no nameserver is configured.
pub const DEFAULT_NAMESERVERS: [&str; 2] = ["8.8.8.8", "1.1.1.1"];

/// Settings for one verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Every record group is checked against each of these.
    pub nameservers: Vec<Nameserver>,
    /// Minimum spacing between check launches. Zero disables throttling.
    pub launch_interval: Duration,
    /// Launches allowed back to back before spacing applies.
    pub burst: u32,
    /// Per-query exchange timeout.
    pub query_timeout: Duration,
}

impl VerifierConfig {
    /// Build the launch limiter described by this configuration.
    pub fn rate_limiter(&self) -> Result<RateLimiter, ConfigError> {
        RateLimiter::new(self.launch_interval, self.burst)
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            nameservers: DEFAULT_NAMESERVERS
                .iter()
                .map(|host| Nameserver::new(*host, DEFAULT_DNS_PORT))
                .collect(),
            launch_interval: DEFAULT_LAUNCH_INTERVAL,
            burst: DEFAULT_BURST,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}
