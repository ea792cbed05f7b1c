use crate::dns_record::RecordSet;
use crate::errors::QueryErrorKind;
use crate::finding::Finding;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Whole-analysis lifecycle. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnalysisPhase {
    Planned,
    Querying,
    Normalizing,
    Detecting,
    Assembled,
}

impl AnalysisPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisPhase::Planned => "planned",
            AnalysisPhase::Querying => "querying",
            AnalysisPhase::Normalizing => "normalizing",
            AnalysisPhase::Detecting => "detecting",
            AnalysisPhase::Assembled => "assembled",
        }
    }

    pub fn next(&self) -> Option<AnalysisPhase> {
        match self {
            AnalysisPhase::Planned => Some(AnalysisPhase::Querying),
            AnalysisPhase::Querying => Some(AnalysisPhase::Normalizing),
            AnalysisPhase::Normalizing => Some(AnalysisPhase::Detecting),
            AnalysisPhase::Detecting => Some(AnalysisPhase::Assembled),
            AnalysisPhase::Assembled => None,
        }
    }
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub resolvers: Vec<String>,
    pub queries_planned: usize,
    /// Planned queries whose terminal outcome was an error
    pub query_error_count: usize,
    pub errors_by_kind: BTreeMap<QueryErrorKind, usize>,
    /// The global budget expired before every query finished
    pub budget_exhausted: bool,
}

impl RunMetadata {
    /// Copy with timing fields zeroed, for comparing runs.
    pub fn without_timing(&self) -> Self {
        Self {
            started_at: DateTime::<Utc>::UNIX_EPOCH,
            duration_ms: 0,
            ..self.clone()
        }
    }
}

/// Final analysis output handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub domain: String,
    pub records: RecordSet,
    pub findings: Vec<Finding>,
    pub metadata: RunMetadata,
}

impl Report {
    pub fn findings_by(&self, detector: &str) -> impl Iterator<Item = &Finding> {
        let detector = detector.to_string();
        self.findings.iter().filter(move |f| f.detector == detector)
    }

    pub fn without_timing(&self) -> Self {
        Self {
            metadata: self.metadata.without_timing(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_progression() {
        let mut phase = AnalysisPhase::Planned;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            assert!(next > phase);
            phase = next;
            seen.push(phase);
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(phase, AnalysisPhase::Assembled);
    }
}
