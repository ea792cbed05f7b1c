use super::RecordType;
use serde::Serialize;

/// Canonical, deduplicated DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Record type (implied by the record set key when serialized)
    #[serde(skip)]
    pub record_type: RecordType,
    /// Canonical presentation value
    pub value: String,
    /// Lowest TTL seen across resolvers
    pub ttl: u32,
    /// Resolvers that returned this value, in first-seen order
    pub resolvers: Vec<String>,
    /// Value could not be parsed for its type and is kept verbatim
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub malformed: bool,
}

impl Record {
    pub fn new(
        record_type: RecordType,
        value: impl Into<String>,
        ttl: u32,
        resolver: impl Into<String>,
    ) -> Self {
        Self {
            record_type,
            value: value.into(),
            ttl,
            resolvers: vec![resolver.into()],
            malformed: false,
        }
    }

    pub fn malformed(mut self) -> Self {
        self.malformed = true;
        self
    }

    /// Deduplication key: case-folded, trailing dot stripped.
    pub fn dedup_key(value: &str) -> String {
        value.trim().trim_end_matches('.').to_lowercase()
    }

    pub fn key(&self) -> String {
        Self::dedup_key(&self.value)
    }

    /// Fold another sighting of the same value into this record.
    pub fn merge(&mut self, ttl: u32, resolver: &str) {
        self.ttl = self.ttl.min(ttl);
        if !self.resolvers.iter().any(|r| r == resolver) {
            self.resolvers.push(resolver.to_string());
        }
    }
}
