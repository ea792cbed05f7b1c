//! Anomaly detectors.
//!
//! Each detector is a pure function of the [`DetectionContext`]; the set run
//! by an analysis is a plain list so callers can add or drop checks.
mod dnssec;
mod email_auth;
mod mail;
mod ns_delegation;
mod wildcard;
mod zone_transfer;

pub use dnssec::DnssecDetector;
pub use email_auth::EmailAuthDetector;
pub use mail::MailDetector;
pub use ns_delegation::NsDelegationDetector;
pub use wildcard::WildcardDetector;
pub use zone_transfer::ZoneTransferDetector;

use rankle_domain::{Finding, QueryOutcome, QueryPurpose, RecordSet};

pub struct DetectionContext<'a> {
    pub domain: &'a str,
    pub records: &'a RecordSet,
    pub outcomes: &'a [QueryOutcome],
}

impl<'a> DetectionContext<'a> {
    pub fn new(domain: &'a str, records: &'a RecordSet, outcomes: &'a [QueryOutcome]) -> Self {
        Self {
            domain,
            records,
            outcomes,
        }
    }

    /// Outcomes whose query was issued for a matching purpose, in plan order.
    pub fn outcomes_for<F>(&self, matches: F) -> impl Iterator<Item = &'a QueryOutcome>
    where
        F: Fn(&QueryPurpose) -> bool,
    {
        self.outcomes
            .iter()
            .filter(move |outcome| matches(&outcome.query.purpose))
    }
}

pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Finding>;
}

pub fn default_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(WildcardDetector),
        Box::new(ZoneTransferDetector),
        Box::new(EmailAuthDetector),
        Box::new(DnssecDetector),
        Box::new(NsDelegationDetector),
        Box::new(MailDetector),
    ]
}
