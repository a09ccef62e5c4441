//! Test helpers: a scripted resolver and record/answer factories.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{QueryError, QueryResult};
use crate::services::resolver::DnsQuery;
use crate::types::{AnswerData, AnswerRecord, ExpectedRecord, Nameserver, QueryTarget, RecordType};

type ScriptKey = (Nameserver, String, RecordType);

// ===== MockResolver =====

/// Resolver answering from a per-(nameserver, name, type) script.
///
/// Unscripted targets fail with a transport error.
#[derive(Default)]
pub struct MockResolver {
    script: HashMap<ScriptKey, QueryResult<Vec<AnswerRecord>>>,
    calls: RwLock<Vec<QueryTarget>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answers(
        mut self,
        nameserver: &Nameserver,
        name: &str,
        record_type: RecordType,
        answers: Vec<AnswerRecord>,
    ) -> Self {
        self.script.insert(
            (nameserver.clone(), name.to_string(), record_type),
            Ok(answers),
        );
        self
    }

    pub fn with_error(
        mut self,
        nameserver: &Nameserver,
        name: &str,
        record_type: RecordType,
        error: QueryError,
    ) -> Self {
        self.script.insert(
            (nameserver.clone(), name.to_string(), record_type),
            Err(error),
        );
        self
    }

    /// Every target queried so far, in call order.
    pub async fn calls(&self) -> Vec<QueryTarget> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl DnsQuery for MockResolver {
    async fn query(&self, target: &QueryTarget) -> QueryResult<Vec<AnswerRecord>> {
        self.calls.write().await.push(target.clone());
        let key = (
            target.nameserver.clone(),
            target.name.clone(),
            target.record_type.clone(),
        );
        self.script.get(&key).cloned().unwrap_or_else(|| {
            Err(QueryError::Transport(format!("no scripted response for {target}")))
        })
    }
}

// ===== Factories =====

/// Expected A record with a 300s TTL ceiling.
pub fn a_record(name: &str, ip: &str) -> ExpectedRecord {
    ExpectedRecord::new(RecordType::A, name, 300, ip)
}

/// A answer with a 300s TTL.
#[allow(clippy::unwrap_used)]
pub fn a_answer(ip: &str) -> AnswerRecord {
    let ip: Ipv4Addr = ip.parse().unwrap();
    AnswerRecord::new(300, AnswerData::A(ip))
}
