use crate::detectors::{default_detectors, DetectionContext, Detector};
use crate::ports::{Analyzer, DnsResolver};
use crate::services::{
    generate_probe_label, Normalizer, QueryCache, QueryPlanner, QueryScheduler, ReportAssembler,
    RetryPolicy, RunSummary,
};
use async_trait::async_trait;
use chrono::Utc;
use rankle_domain::validators::validate_domain;
use rankle_domain::{AnalysisError, AnalysisPhase, AnalyzerConfig, QueryOutcome, Report};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// DNS reconnaissance of a single domain.
///
/// Runs the base plan against every resolver, follows up with nameserver
/// address and zone transfer rounds when NS records were found, then
/// normalizes, runs the detectors and assembles the report. A run keeps no
/// state once the report is returned.
pub struct DnsAnalyzer {
    resolver: Arc<dyn DnsResolver>,
    detectors: Vec<Box<dyn Detector>>,
    fallback_resolvers: Vec<SocketAddr>,
    probe_label: Option<String>,
}

impl DnsAnalyzer {
    pub const NAME: &'static str = "dns";

    /// `fallback_resolvers` are used when the configuration lists none.
    pub fn new(resolver: Arc<dyn DnsResolver>, fallback_resolvers: Vec<SocketAddr>) -> Self {
        Self {
            resolver,
            detectors: default_detectors(),
            fallback_resolvers,
            probe_label: None,
        }
    }

    pub fn with_detectors(mut self, detectors: Vec<Box<dyn Detector>>) -> Self {
        self.detectors = detectors;
        self
    }

    /// Fix the wildcard probe label instead of drawing a random one per run.
    pub fn with_probe_label(mut self, label: impl Into<String>) -> Self {
        self.probe_label = Some(label.into());
        self
    }

    #[instrument(skip(self, config))]
    pub async fn run(&self, domain: &str, config: &AnalyzerConfig) -> Result<Report, AnalysisError> {
        let domain =
            validate_domain(domain).map_err(|e| AnalysisError::InvalidDomain(e.to_string()))?;
        let resolvers = self.resolvers(config)?;

        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = start + config.total_budget();

        let mut phase = AnalysisPhase::Planned;
        let planner = QueryPlanner::new(config.timeout_per_query());
        let probe_label = self
            .probe_label
            .clone()
            .unwrap_or_else(generate_probe_label);
        let plan = planner.base_plan(&domain, &resolvers, &probe_label);
        info!(phase = %phase, resolvers = resolvers.len(), queries = plan.len(), "Analysis planned");

        advance(&mut phase);
        let scheduler = QueryScheduler::new(
            Arc::clone(&self.resolver),
            config.max_concurrency,
            RetryPolicy {
                max_retries: config.max_retries,
                backoff: config.retry_backoff(),
            },
        );
        let mut cache = QueryCache::new();
        let base = scheduler.run_round(&plan, deadline, &mut cache).await;
        let mut budget_exhausted = base.budget_exhausted;
        let mut outcomes = base.outcomes;

        let hosts = Normalizer::nameserver_hosts(&outcomes);
        if !hosts.is_empty() && !budget_exhausted {
            let ns_plan = planner.nameserver_plan(&hosts, &resolvers);
            let ns_round = scheduler.run_round(&ns_plan, deadline, &mut cache).await;
            budget_exhausted |= ns_round.budget_exhausted;

            if config.zone_transfer && !budget_exhausted {
                let axfr_plan = planner.zone_transfer_plan(&domain, &ns_round.outcomes);
                outcomes.extend(ns_round.outcomes);
                let axfr_round = scheduler.run_round(&axfr_plan, deadline, &mut cache).await;
                budget_exhausted |= axfr_round.budget_exhausted;
                outcomes.extend(axfr_round.outcomes);
            } else {
                outcomes.extend(ns_round.outcomes);
            }
        }
        debug!(cache_entries = cache.len(), cache_hits = cache.hits(), "Query rounds finished");

        if !outcomes.iter().any(QueryOutcome::has_response) {
            warn!(queries = outcomes.len(), "No resolver produced a response");
            return Err(AnalysisError::AllResolversUnreachable);
        }

        advance(&mut phase);
        let records = Normalizer::normalize(&outcomes);

        advance(&mut phase);
        let ctx = DetectionContext::new(&domain, &records, &outcomes);
        let findings: Vec<_> = self
            .detectors
            .iter()
            .flat_map(|detector| {
                let found = detector.detect(&ctx);
                debug!(detector = detector.name(), findings = found.len(), "Detector finished");
                found
            })
            .collect();

        advance(&mut phase);
        let summary = RunSummary {
            resolvers: resolvers.iter().map(ToString::to_string).collect(),
            started_at,
            duration: start.elapsed(),
            budget_exhausted,
        };
        let report = ReportAssembler::assemble(&domain, records, findings, &outcomes, summary);

        info!(
            records = report.records.len(),
            findings = report.findings.len(),
            errors = report.metadata.query_error_count,
            duration_ms = report.metadata.duration_ms,
            budget_exhausted,
            "Analysis complete"
        );
        Ok(report)
    }

    fn resolvers(&self, config: &AnalyzerConfig) -> Result<Vec<SocketAddr>, AnalysisError> {
        let configured = config
            .resolver_addrs()
            .map_err(|e| AnalysisError::InvalidResolver(e.to_string()))?;
        let resolvers = if configured.is_empty() {
            self.fallback_resolvers.clone()
        } else {
            configured
        };
        if resolvers.is_empty() {
            return Err(AnalysisError::NoResolvers);
        }
        Ok(resolvers)
    }
}

fn advance(phase: &mut AnalysisPhase) {
    if let Some(next) = phase.next() {
        debug!(from = %phase, to = %next, "Analysis phase transition");
        *phase = next;
    }
}

#[async_trait]
impl Analyzer for DnsAnalyzer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn analyze(
        &self,
        domain: &str,
        config: &AnalyzerConfig,
    ) -> Result<Report, AnalysisError> {
        self.run(domain, config).await
    }
}
