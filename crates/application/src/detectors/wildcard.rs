use super::{DetectionContext, Detector};
use crate::services::canonical_address;
use rankle_domain::{Evidence, Finding, QueryPurpose, RecordType, Severity};
use std::net::IpAddr;

/// Compares what a random subdomain resolves to with the apex addresses.
pub struct WildcardDetector;

impl Detector for WildcardDetector {
    fn name(&self) -> &'static str {
        "wildcard"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Finding> {
        let mut probe_name = None;
        let mut probed: Vec<String> = Vec::new();
        for outcome in ctx.outcomes_for(|p| *p == QueryPurpose::WildcardProbe) {
            let Some(answer) = outcome.answer() else {
                continue;
            };
            for address in answer.addresses() {
                let address = canonical_address(address).unwrap_or_else(|| address.to_string());
                if !probed.contains(&address) {
                    probed.push(address);
                }
            }
            probe_name.get_or_insert_with(|| outcome.query.name.to_string());
        }

        if probed.is_empty() {
            return vec![];
        }
        let probe_name = probe_name.unwrap_or_default();

        let apex: Vec<&str> = ctx
            .records
            .values(RecordType::A)
            .chain(ctx.records.values(RecordType::AAAA))
            .collect();
        let overlap: Vec<&String> = probed
            .iter()
            .filter(|address| apex.contains(&address.as_str()))
            .collect();

        let (severity, description, evidence): (_, _, Vec<Evidence>) = if overlap.is_empty() {
            (
                Severity::Medium,
                format!(
                    "Wildcard DNS: random name {} resolves to {} address(es)",
                    probe_name,
                    probed.len()
                ),
                probed.iter().map(|a| address_evidence(a)).collect(),
            )
        } else {
            (
                Severity::High,
                format!(
                    "Wildcard DNS: random name {} resolves to the apex address",
                    probe_name
                ),
                overlap.iter().map(|a| address_evidence(a)).collect(),
            )
        };

        vec![Finding::new(self.name(), severity, description).with_evidence(evidence)]
    }
}

fn address_evidence(address: &str) -> Evidence {
    let record_type = match address.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => RecordType::AAAA,
        _ => RecordType::A,
    };
    Evidence::Record {
        record_type,
        value: address.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::outcome;
    use crate::services::Normalizer;
    use rankle_domain::{AnswerData, QueryError};

    const PROBE: &str = "rankle-abc.example.com";

    fn apex_a(address: &str) -> rankle_domain::QueryOutcome {
        outcome(
            "example.com",
            RecordType::A,
            "8.8.8.8:53",
            QueryPurpose::Standard,
            Ok(vec![AnswerData::A(address.into())]),
        )
    }

    fn probe(result: Result<Vec<AnswerData>, QueryError>) -> rankle_domain::QueryOutcome {
        outcome(PROBE, RecordType::A, "8.8.8.8:53", QueryPurpose::WildcardProbe, result)
    }

    fn run(outcomes: &[rankle_domain::QueryOutcome]) -> Vec<Finding> {
        let records = Normalizer::normalize(outcomes);
        WildcardDetector.detect(&DetectionContext::new("example.com", &records, outcomes))
    }

    #[test]
    fn test_probe_matching_apex_is_high() {
        let outcomes = vec![
            apex_a("192.0.2.1"),
            probe(Ok(vec![AnswerData::A("192.0.2.1".into())])),
        ];
        let findings = run(&outcomes);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn test_probe_elsewhere_is_medium() {
        let outcomes = vec![
            apex_a("192.0.2.1"),
            probe(Ok(vec![AnswerData::A("198.51.100.7".into())])),
        ];
        let findings = run(&outcomes);
        assert_eq!(findings[0].severity, Severity::Medium);
        assert!(findings[0].description.contains(PROBE));
    }

    #[test]
    fn test_failed_or_empty_probe_is_silent() {
        let nx = vec![
            apex_a("192.0.2.1"),
            probe(Err(QueryError::name_not_found("NXDOMAIN"))),
        ];
        assert!(run(&nx).is_empty());

        let empty = vec![apex_a("192.0.2.1"), probe(Ok(vec![]))];
        assert!(run(&empty).is_empty());
    }
}
