use crate::dns_record::{RawAnswer, RecordType};
use crate::errors::QueryError;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Why a query is part of the plan.
///
/// Only `Standard` answers feed the record set; the other purposes are
/// evidence for specific detectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryPurpose {
    Standard,
    /// Random non-existent label under the target
    WildcardProbe,
    /// `_dmarc.<domain>` TXT lookup
    DmarcPolicy,
    /// DNSKEY lookup at the apex
    DnssecProbe,
    /// Address lookup for a discovered nameserver host
    NameserverAddress { nameserver: Arc<str> },
    /// AXFR attempt against a discovered nameserver
    ZoneTransfer { nameserver: Arc<str> },
}

impl QueryPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryPurpose::Standard => "standard",
            QueryPurpose::WildcardProbe => "wildcard_probe",
            QueryPurpose::DmarcPolicy => "dmarc_policy",
            QueryPurpose::DnssecProbe => "dnssec_probe",
            QueryPurpose::NameserverAddress { .. } => "nameserver_address",
            QueryPurpose::ZoneTransfer { .. } => "zone_transfer",
        }
    }
}

impl fmt::Display for QueryPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One DNS question sent to one resolver.
///
/// Immutable once created; the scheduler shares it as `Arc<DnsQuery>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsQuery {
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub resolver: SocketAddr,
    pub timeout: Duration,
    pub purpose: QueryPurpose,
}

impl DnsQuery {
    pub fn new(
        name: impl Into<Arc<str>>,
        record_type: RecordType,
        resolver: SocketAddr,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            resolver,
            timeout,
            purpose: QueryPurpose::Standard,
        }
    }

    pub fn with_purpose(mut self, purpose: QueryPurpose) -> Self {
        self.purpose = purpose;
        self
    }

    /// Identity used to recognise repeated questions within one run.
    pub fn cache_key(&self) -> (String, RecordType, SocketAddr) {
        (
            self.name.trim_end_matches('.').to_lowercase(),
            self.record_type,
            self.resolver,
        )
    }
}

impl fmt::Display for DnsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @{}", self.name, self.record_type, self.resolver)
    }
}

/// Terminal result of a planned query after all retries.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub query: Arc<DnsQuery>,
    pub result: Result<RawAnswer, QueryError>,
    /// Attempts actually made (0 when the query never started)
    pub attempts: u32,
}

impl QueryOutcome {
    pub fn new(query: Arc<DnsQuery>, result: Result<RawAnswer, QueryError>, attempts: u32) -> Self {
        Self {
            query,
            result,
            attempts,
        }
    }

    pub fn answer(&self) -> Option<&RawAnswer> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&QueryError> {
        self.result.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The resolver produced a DNS response (data, NODATA or NXDOMAIN).
    pub fn has_response(&self) -> bool {
        match &self.result {
            Ok(_) => true,
            Err(e) => e.kind.is_resolver_response(),
        }
    }

    pub fn resolver_display(&self) -> String {
        self.query.resolver.to_string()
    }
}
