use crate::dns_record::{Record, RecordType};
use serde::Serialize;
use std::fmt;

/// Finding severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a finding points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Evidence {
    Record {
        record_type: RecordType,
        value: String,
    },
    Text(String),
}

impl Evidence {
    pub fn text(text: impl Into<String>) -> Self {
        Evidence::Text(text.into())
    }
}

impl From<&Record> for Evidence {
    fn from(record: &Record) -> Self {
        Evidence::Record {
            record_type: record.record_type,
            value: record.value.clone(),
        }
    }
}

/// Result of one detector check. Never mutated once emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub detector: String,
    pub severity: Severity,
    pub description: String,
    pub evidence: Vec<Evidence>,
}

impl Finding {
    pub fn new(detector: &str, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            detector: detector.to_string(),
            severity,
            description: description.into(),
            evidence: Vec::new(),
        }
    }

    pub fn with_evidence(mut self, evidence: impl IntoIterator<Item = Evidence>) -> Self {
        self.evidence.extend(evidence);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn test_evidence_serialization() {
        let finding = Finding::new("dnssec", Severity::Info, "DNSSEC not enabled").with_evidence([
            Evidence::Record {
                record_type: RecordType::SOA,
                value: "ns1.example.com hostmaster.example.com 1 2 3 4 5".into(),
            },
            Evidence::text("no DNSKEY answer from 8.8.8.8:53"),
        ]);
        let json = serde_json::to_value(&finding).unwrap();

        assert_eq!(json["severity"], "info");
        assert_eq!(json["evidence"][0]["record_type"], "SOA");
        assert_eq!(json["evidence"][1], "no DNSKEY answer from 8.8.8.8:53");
    }
}
