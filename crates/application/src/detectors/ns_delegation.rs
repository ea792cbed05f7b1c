use super::{DetectionContext, Detector};
use crate::services::canonical_name;
use rankle_domain::{AnswerData, Evidence, Finding, QueryPurpose, RecordType, Severity};
use std::collections::BTreeSet;

/// Flags resolvers that disagree about the delegated nameserver set.
pub struct NsDelegationDetector;

impl Detector for NsDelegationDetector {
    fn name(&self) -> &'static str {
        "ns_delegation"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Finding> {
        let mut per_resolver: Vec<(String, BTreeSet<String>)> = Vec::new();
        for outcome in ctx.outcomes_for(|p| *p == QueryPurpose::Standard) {
            if outcome.query.record_type != RecordType::NS {
                continue;
            }
            let Some(answer) = outcome.answer() else {
                continue;
            };
            let hosts: BTreeSet<String> = answer
                .records
                .iter()
                .filter_map(|r| match &r.data {
                    AnswerData::Ns(host) => Some(canonical_name(host)),
                    _ => None,
                })
                .collect();
            per_resolver.push((outcome.resolver_display(), hosts));
        }

        if per_resolver.len() < 2 {
            return vec![];
        }
        let first = &per_resolver[0].1;
        if per_resolver.iter().all(|(_, hosts)| hosts == first) {
            return vec![];
        }

        let evidence = per_resolver.iter().map(|(resolver, hosts)| {
            let hosts: Vec<&str> = hosts.iter().map(String::as_str).collect();
            Evidence::text(format!("{}: {}", resolver, hosts.join(", ")))
        });

        vec![Finding::new(
            self.name(),
            Severity::Medium,
            format!("Resolvers return different NS sets for {}", ctx.domain),
        )
        .with_evidence(evidence)]
    }
}
