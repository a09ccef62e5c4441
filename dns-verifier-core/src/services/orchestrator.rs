//! Fan-out of one check per (nameserver, record group) pair.
//!
//! Launches are throttled by a shared [`RateLimiter`]. Each worker sends its
//! [`CheckOutcome`] over a channel; the collecting task folds them into a
//! [`RunReport`], so workers share no mutable state. A check that panics is
//! reported as a failure for its target, never dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::{CheckError, ValidationError, WorkerError};
use crate::services::rate_limiter::RateLimiter;
use crate::services::resolver::DnsQuery;
use crate::services::validator;
use crate::types::{CheckOutcome, Nameserver, QueryTarget, RecordGroup};

/// Every outcome of a run, in completion order.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One outcome per (nameserver, group) pair.
    pub outcomes: Vec<CheckOutcome>,
    /// Wall time from first launch to last completion.
    pub elapsed: Duration,
}

impl RunReport {
    /// Number of checks performed.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of failed checks.
    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    /// Failed outcomes only.
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// `true` iff no check failed (vacuously true for an empty run).
    pub fn all_passed(&self) -> bool {
        !self.outcomes.iter().any(CheckOutcome::is_failure)
    }
}

/// Schedules and aggregates checks against a fixed nameserver list.
pub struct CheckOrchestrator {
    resolver: Arc<dyn DnsQuery>,
    nameservers: Vec<Nameserver>,
    limiter: Arc<RateLimiter>,
}

impl CheckOrchestrator {
    /// Orchestrator querying `nameservers` through `resolver`.
    pub fn new(
        resolver: Arc<dyn DnsQuery>,
        nameservers: Vec<Nameserver>,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            resolver,
            nameservers,
            limiter: Arc::new(limiter),
        }
    }

    /// Nameservers every group is checked against.
    pub fn nameservers(&self) -> &[Nameserver] {
        &self.nameservers
    }

    /// Check every group against every nameserver.
    ///
    /// `on_outcome` sees each outcome as soon as it is collected. Returns once
    /// every launched check has finished; there is no early exit on failure.
    pub async fn run<F>(&self, groups: Vec<RecordGroup>, mut on_outcome: F) -> RunReport
    where
        F: FnMut(&CheckOutcome),
    {
        let started = Instant::now();
        let scheduled = groups.len() * self.nameservers.len();
        log::info!(
            "Scheduling {scheduled} checks ({} groups x {} nameservers)",
            groups.len(),
            self.nameservers.len()
        );

        let (tx, mut rx) = mpsc::unbounded_channel::<CheckOutcome>();

        let launch = async move {
            for group in groups.into_iter().map(Arc::new) {
                for nameserver in &self.nameservers {
                    self.limiter.acquire().await;

                    let tx = tx.clone();
                    let resolver = Arc::clone(&self.resolver);
                    let group = Arc::clone(&group);
                    let nameserver = nameserver.clone();
                    tokio::spawn(async move {
                        let outcome = supervise(resolver, nameserver, group).await;
                        if tx.send(outcome).is_err() {
                            log::error!("Outcome collector closed before a check finished");
                        }
                    });
                }
            }
        };

        let collect = async {
            let mut outcomes = Vec::with_capacity(scheduled);
            while let Some(outcome) = rx.recv().await {
                on_outcome(&outcome);
                outcomes.push(outcome);
            }
            outcomes
        };

        let ((), outcomes) = tokio::join!(launch, collect);

        let report = RunReport {
            outcomes,
            elapsed: started.elapsed(),
        };
        log::info!(
            "Finished {} checks in {:?}: {} failed",
            report.total(),
            report.elapsed,
            report.failed()
        );
        report
    }
}

/// Run one check in its own task so a panic still yields an outcome.
async fn supervise(
    resolver: Arc<dyn DnsQuery>,
    nameserver: Nameserver,
    group: Arc<RecordGroup>,
) -> CheckOutcome {
    let target = QueryTarget::for_group(&nameserver, &group);
    let check =
        tokio::spawn(async move { check_group(resolver.as_ref(), &nameserver, &group).await });
    match check.await {
        Ok(outcome) => outcome,
        Err(e) => {
            let detail = if e.is_panic() {
                "task panicked".to_string()
            } else {
                "task cancelled".to_string()
            };
            log::error!("{target}: {detail}");
            CheckOutcome::failure(target, WorkerError::Aborted(detail).into())
        }
    }
}

/// Query one nameserver for one group and validate the answer.
pub async fn check_group(
    resolver: &dyn DnsQuery,
    nameserver: &Nameserver,
    group: &RecordGroup,
) -> CheckOutcome {
    let target = QueryTarget::for_group(nameserver, group);
    match run_check(resolver, &target, group).await {
        Ok(()) => {
            log::debug!("{target}: ok");
            CheckOutcome::success(target)
        }
        Err(reason) => {
            if reason.is_data_mismatch() {
                log::debug!("{target}: {reason}");
            } else {
                log::info!("{target}: {reason}");
            }
            CheckOutcome::failure(target, reason)
        }
    }
}

async fn run_check(
    resolver: &dyn DnsQuery,
    target: &QueryTarget,
    group: &RecordGroup,
) -> Result<(), CheckError> {
    if !group.record_type().is_supported() {
        return Err(ValidationError::UnsupportedType(group.record_type().clone()).into());
    }
    let answers = resolver.query(target).await?;
    validator::validate(&answers, group)?;
    Ok(())
}
