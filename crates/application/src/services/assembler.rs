use chrono::{DateTime, Utc};
use rankle_domain::{Finding, QueryOutcome, RecordSet, Report, RunMetadata};
use std::collections::BTreeMap;
use std::time::Duration;

/// Run facts the assembler cannot derive from outcomes.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub resolvers: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub budget_exhausted: bool,
}

pub struct ReportAssembler;

impl ReportAssembler {
    /// Orders findings by severity (highest first), then detector name, then
    /// the order they were discovered in.
    pub fn assemble(
        domain: &str,
        records: RecordSet,
        mut findings: Vec<Finding>,
        outcomes: &[QueryOutcome],
        summary: RunSummary,
    ) -> Report {
        findings.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.detector.cmp(&b.detector))
        });

        let mut errors_by_kind = BTreeMap::new();
        for error in outcomes.iter().filter_map(QueryOutcome::error) {
            *errors_by_kind.entry(error.kind).or_insert(0) += 1;
        }

        let metadata = RunMetadata {
            started_at: summary.started_at,
            duration_ms: summary.duration.as_millis() as u64,
            resolvers: summary.resolvers,
            queries_planned: outcomes.len(),
            query_error_count: errors_by_kind.values().sum(),
            errors_by_kind,
            budget_exhausted: summary.budget_exhausted,
        };

        Report {
            domain: domain.to_string(),
            records,
            findings,
            metadata,
        }
    }
}
