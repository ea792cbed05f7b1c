use async_trait::async_trait;
use rankle_application::ports::DnsResolver;
use rankle_domain::{
    AnalyzerConfig, AnswerData, AnswerRecord, DnsQuery, QueryError, RawAnswer, RecordType,
};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub const RESOLVER_A: &str = "192.0.2.1:53";
pub const RESOLVER_B: &str = "192.0.2.2:53";
pub const PROBE_LABEL: &str = "rankle-testprobe";
pub const PROBE_NAME: &str = "rankle-testprobe.example.com";

type AnswerKey = (String, RecordType);

// ============================================================================
// Mock DnsResolver
// ============================================================================

/// Answers from a table keyed by `(name, type)`, optionally per resolver.
/// Unknown queries get an empty NOERROR answer.
#[derive(Clone, Default)]
pub struct MockDnsResolver {
    answers: Arc<RwLock<HashMap<AnswerKey, Result<RawAnswer, QueryError>>>>,
    per_resolver: Arc<RwLock<HashMap<(SocketAddr, AnswerKey), Result<RawAnswer, QueryError>>>>,
    hanging: Arc<RwLock<HashSet<AnswerKey>>>,
    down: Arc<RwLock<HashSet<SocketAddr>>>,
    should_fail: Arc<RwLock<bool>>,
    calls: Arc<AtomicUsize>,
}

fn key(name: &str, record_type: RecordType) -> AnswerKey {
    (name.trim_end_matches('.').to_lowercase(), record_type)
}

pub fn raw(name: &str, data: Vec<AnswerData>) -> RawAnswer {
    RawAnswer::new(
        data.into_iter()
            .map(|d| AnswerRecord::new(name, 300, d))
            .collect(),
        false,
    )
}

impl MockDnsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_answer(&self, name: &str, record_type: RecordType, data: Vec<AnswerData>) {
        self.answers
            .write()
            .await
            .insert(key(name, record_type), Ok(raw(name, data)));
    }

    pub async fn set_answer_from(
        &self,
        resolver: &str,
        name: &str,
        record_type: RecordType,
        data: Vec<AnswerData>,
    ) {
        let resolver: SocketAddr = resolver.parse().unwrap();
        self.per_resolver
            .write()
            .await
            .insert((resolver, key(name, record_type)), Ok(raw(name, data)));
    }

    pub async fn set_error(&self, name: &str, record_type: RecordType, error: QueryError) {
        self.answers
            .write()
            .await
            .insert(key(name, record_type), Err(error));
    }

    /// Never answer this query.
    pub async fn set_hang(&self, name: &str, record_type: RecordType) {
        self.hanging.write().await.insert(key(name, record_type));
    }

    /// Every query sent to `resolver` fails as unreachable.
    pub async fn set_resolver_down(&self, resolver: &str) {
        self.down.write().await.insert(resolver.parse().unwrap());
    }

    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsResolver for MockDnsResolver {
    async fn resolve(&self, query: &DnsQuery) -> Result<RawAnswer, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if *self.should_fail.read().await || self.down.read().await.contains(&query.resolver) {
            return Err(QueryError::unreachable(format!(
                "connection refused by {}",
                query.resolver
            )));
        }

        let k = key(&query.name, query.record_type);
        if self.hanging.read().await.contains(&k) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }

        if let Some(result) = self
            .per_resolver
            .read()
            .await
            .get(&(query.resolver, k.clone()))
        {
            return result.clone();
        }

        self.answers
            .read()
            .await
            .get(&k)
            .cloned()
            .unwrap_or_else(|| Ok(RawAnswer::empty()))
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn test_config() -> AnalyzerConfig {
    AnalyzerConfig {
        resolvers: vec![RESOLVER_A.into(), RESOLVER_B.into()],
        timeout_per_query_ms: 1_000,
        total_budget_ms: 5_000,
        max_concurrency: 8,
        max_retries: 0,
        retry_backoff_ms: 1,
        zone_transfer: true,
    }
}

/// Apex A, NS, MX and SPF plus a DMARC reject policy.
pub async fn healthy_zone(mock: &MockDnsResolver) {
    mock.set_answer("example.com", RecordType::A, vec![AnswerData::A("192.0.2.10".into())])
        .await;
    mock.set_answer(
        "example.com",
        RecordType::NS,
        vec![
            AnswerData::Ns("ns1.example.com.".into()),
            AnswerData::Ns("ns2.example.com.".into()),
        ],
    )
    .await;
    mock.set_answer(
        "example.com",
        RecordType::MX,
        vec![AnswerData::Mx {
            preference: 10,
            exchange: "mail.example.com.".into(),
        }],
    )
    .await;
    mock.set_answer(
        "example.com",
        RecordType::TXT,
        vec![AnswerData::Txt("v=spf1 include:_spf.example.com -all".into())],
    )
    .await;
    mock.set_answer(
        "_dmarc.example.com",
        RecordType::TXT,
        vec![AnswerData::Txt("v=DMARC1; p=reject".into())],
    )
    .await;
    for record_type in [RecordType::A, RecordType::AAAA] {
        mock.set_error(PROBE_NAME, record_type, QueryError::name_not_found("NXDOMAIN"))
            .await;
    }
    mock.set_answer(
        "example.com",
        RecordType::DNSKEY,
        vec![AnswerData::Other {
            rtype: "DNSKEY".into(),
            text: "257 3 13 AwEAAag".into(),
        }],
    )
    .await;
}
