use super::{DetectionContext, Detector};
use rankle_domain::{Evidence, Finding, QueryPurpose, Severity};

/// Reports nameservers that answered an AXFR with zone data.
pub struct ZoneTransferDetector;

impl Detector for ZoneTransferDetector {
    fn name(&self) -> &'static str {
        "zone_transfer"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Finding> {
        let mut evidence = Vec::new();
        for outcome in ctx.outcomes_for(|p| matches!(p, QueryPurpose::ZoneTransfer { .. })) {
            let QueryPurpose::ZoneTransfer { nameserver } = &outcome.query.purpose else {
                continue;
            };
            match outcome.answer() {
                Some(answer) if !answer.is_empty() => {
                    evidence.push(Evidence::text(format!(
                        "{} ({}) returned {} records",
                        nameserver,
                        outcome.query.resolver,
                        answer.len()
                    )));
                }
                _ => {}
            }
        }

        if evidence.is_empty() {
            return vec![];
        }

        vec![Finding::new(
            self.name(),
            Severity::High,
            format!(
                "Zone transfer (AXFR) of {} allowed by {} nameserver(s)",
                ctx.domain,
                evidence.len()
            ),
        )
        .with_evidence(evidence)]
    }
}
