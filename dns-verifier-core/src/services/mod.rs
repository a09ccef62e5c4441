//! Verification services and the [`Verifier`] façade tying them together.

pub mod grouper;
pub mod orchestrator;
pub mod rate_limiter;
pub mod resolver;
pub mod validator;

use std::sync::Arc;

use crate::config::VerifierConfig;
use crate::error::ConfigError;
use crate::types::{CheckOutcome, Zone};

use self::orchestrator::{CheckOrchestrator, RunReport};
use self::resolver::{DnsQuery, UdpResolverClient};

/// Entry point for verifying expected zones against live nameservers.
///
/// ```rust,no_run
/// use dns_verifier_core::{Verifier, VerifierConfig};
/// # async fn demo(zones: Vec<dns_verifier_core::Zone>) -> Result<(), dns_verifier_core::ConfigError> {
/// let verifier = Verifier::new(&VerifierConfig::default())?;
/// let report = verifier.verify(&zones, |outcome| println!("{outcome:?}")).await;
/// assert!(report.all_passed());
/// # Ok(())
/// # }
/// ```
pub struct Verifier {
    orchestrator: CheckOrchestrator,
}

impl Verifier {
    /// Verifier querying over UDP with the configured timeout.
    pub fn new(config: &VerifierConfig) -> Result<Self, ConfigError> {
        let resolver = Arc::new(UdpResolverClient::new(config.query_timeout));
        Self::with_resolver(config, resolver)
    }

    /// Verifier using a caller-supplied resolver.
    pub fn with_resolver(
        config: &VerifierConfig,
        resolver: Arc<dyn DnsQuery>,
    ) -> Result<Self, ConfigError> {
        let limiter = config.rate_limiter()?;
        Ok(Self {
            orchestrator: CheckOrchestrator::new(resolver, config.nameservers.clone(), limiter),
        })
    }

    /// Group every zone and check each group against every nameserver.
    ///
    /// `on_outcome` is called for each outcome as it completes.
    pub async fn verify<F>(&self, zones: &[Zone], on_outcome: F) -> RunReport
    where
        F: FnMut(&CheckOutcome),
    {
        let groups = grouper::group_zones(zones);
        log::debug!(
            "{} zone(s) produced {} record group(s)",
            zones.len(),
            groups.len()
        );
        self.orchestrator.run(groups, on_outcome).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_utils::{a_answer, a_record, MockResolver};
    use crate::types::{Nameserver, RecordType};

    fn config() -> VerifierConfig {
        VerifierConfig {
            nameservers: vec![Nameserver::new("192.0.2.53", 53)],
            launch_interval: Duration::ZERO,
            ..VerifierConfig::default()
        }
    }

    #[tokio::test]
    async fn test_verify_groups_zones() {
        let ns = Nameserver::new("192.0.2.53", 53);
        let mock = MockResolver::new()
            .with_answers(
                &ns,
                "example.com",
                RecordType::A,
                vec![a_answer("1.1.1.1"), a_answer("2.2.2.2")],
            )
            .with_answers(&ns, "example.org", RecordType::A, vec![a_answer("3.3.3.3")]);
        let verifier = Verifier::with_resolver(&config(), Arc::new(mock)).unwrap();

        let zones = vec![
            Zone {
                name: "example.com".to_string(),
                records: vec![a_record("@", "2.2.2.2"), a_record("@", "1.1.1.1")],
            },
            Zone {
                name: "example.org".to_string(),
                records: vec![a_record("@", "3.3.3.3")],
            },
        ];
        let report = verifier.verify(&zones, |_| {}).await;
        assert_eq!(report.total(), 2);
        assert!(report.all_passed());
    }

    #[tokio::test]
    async fn test_verify_empty_dataset() {
        let verifier = Verifier::with_resolver(&config(), Arc::new(MockResolver::new())).unwrap();
        let report = verifier.verify(&[], |_| {}).await;
        assert_eq!(report.total(), 0);
        assert!(report.all_passed());
    }

    #[test]
    fn test_invalid_burst_rejected() {
        let config = VerifierConfig {
            burst: 0,
            ..config()
        };
        assert!(matches!(
            Verifier::with_resolver(&config, Arc::new(MockResolver::new())),
            Err(ConfigError::InvalidRateLimit(_))
        ));
    }
}
