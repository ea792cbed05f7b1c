use super::{DetectionContext, Detector};
use rankle_domain::{Evidence, Finding, QueryPurpose, RecordType, Severity};

pub struct DnssecDetector;

impl Detector for DnssecDetector {
    fn name(&self) -> &'static str {
        "dnssec"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Finding> {
        let mut asked = Vec::new();
        for outcome in ctx.outcomes_for(|p| *p == QueryPurpose::DnssecProbe) {
            asked.push(outcome.resolver_display());
            let signed = outcome.answer().is_some_and(|answer| {
                answer
                    .records
                    .iter()
                    .any(|r| r.data.record_type() == Some(RecordType::DNSKEY))
            });
            if signed {
                return vec![];
            }
        }

        vec![Finding::new(
            self.name(),
            Severity::Info,
            format!("DNSSEC not enabled: no DNSKEY records published for {}", ctx.domain),
        )
        .with_evidence(
            asked
                .into_iter()
                .map(|resolver| Evidence::text(format!("no DNSKEY answer from {}", resolver))),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::outcome;
    use rankle_domain::{AnswerData, RecordSet};

    fn probe(data: Vec<AnswerData>) -> rankle_domain::QueryOutcome {
        outcome(
            "example.com",
            RecordType::DNSKEY,
            "8.8.8.8:53",
            QueryPurpose::DnssecProbe,
            Ok(data),
        )
    }

    #[test]
    fn test_missing_dnskey_is_info() {
        let outcomes = vec![probe(vec![])];
        let records = RecordSet::default();
        let findings =
            DnssecDetector.detect(&DetectionContext::new("example.com", &records, &outcomes));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
    }

    #[test]
    fn test_dnskey_present_is_silent() {
        let outcomes = vec![probe(vec![AnswerData::Other {
            rtype: "DNSKEY".into(),
            text: "257 3 13 mdsswUyr3DPW132mOi8V9xESWE8jTo0d".into(),
        }])];
        let records = RecordSet::default();
        assert!(DnssecDetector
            .detect(&DetectionContext::new("example.com", &records, &outcomes))
            .is_empty());
    }
}
