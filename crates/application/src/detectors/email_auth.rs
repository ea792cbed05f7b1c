use super::{DetectionContext, Detector};
use rankle_domain::{AnswerData, Evidence, Finding, QueryPurpose, Record, RecordType, Severity};

const SPF_PREFIX: &str = "v=spf1";
const DMARC_PREFIX: &str = "v=dmarc1";

/// SPF and DMARC presence and obvious policy mistakes.
pub struct EmailAuthDetector;

impl Detector for EmailAuthDetector {
    fn name(&self) -> &'static str {
        "email_auth"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        self.check_spf(ctx, &mut findings);
        self.check_dmarc(ctx, &mut findings);
        findings
    }
}

impl EmailAuthDetector {
    fn check_spf(&self, ctx: &DetectionContext<'_>, findings: &mut Vec<Finding>) {
        let spf: Vec<&Record> = ctx
            .records
            .get(RecordType::TXT)
            .iter()
            .filter(|r| has_prefix(&r.value, SPF_PREFIX))
            .collect();

        if spf.is_empty() {
            findings.push(Finding::new(
                self.name(),
                Severity::Low,
                format!("No SPF record published for {}", ctx.domain),
            ));
            return;
        }

        if spf.len() > 1 {
            findings.push(
                Finding::new(
                    self.name(),
                    Severity::Low,
                    format!(
                        "{} SPF records published; receivers treat this as a permanent error",
                        spf.len()
                    ),
                )
                .with_evidence(spf.iter().map(|r| Evidence::from(*r))),
            );
        }

        for record in spf.iter().filter(|r| allows_any_sender(&r.value)) {
            findings.push(
                Finding::new(
                    self.name(),
                    Severity::Medium,
                    "SPF record ends in +all and authorizes any sender",
                )
                .with_evidence([Evidence::from(*record)]),
            );
        }
    }

    fn check_dmarc(&self, ctx: &DetectionContext<'_>, findings: &mut Vec<Finding>) {
        let mut policies: Vec<String> = Vec::new();
        for outcome in ctx.outcomes_for(|p| *p == QueryPurpose::DmarcPolicy) {
            let Some(answer) = outcome.answer() else {
                continue;
            };
            for record in &answer.records {
                if let AnswerData::Txt(text) = &record.data {
                    let text = text.trim();
                    if has_prefix(text, DMARC_PREFIX) && !policies.iter().any(|p| p == text) {
                        policies.push(text.to_string());
                    }
                }
            }
        }

        if policies.is_empty() {
            findings.push(Finding::new(
                self.name(),
                Severity::Low,
                format!("No DMARC record published at _dmarc.{}", ctx.domain),
            ));
            return;
        }

        let monitoring_only = policies
            .iter()
            .filter(|p| dmarc_tag(p, "p").is_some_and(|v| v.eq_ignore_ascii_case("none")));
        for policy in monitoring_only {
            findings.push(
                Finding::new(
                    self.name(),
                    Severity::Info,
                    "DMARC policy is p=none and only monitors failures",
                )
                .with_evidence([Evidence::Record {
                    record_type: RecordType::TXT,
                    value: policy.clone(),
                }]),
            );
        }
    }
}

fn has_prefix(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn allows_any_sender(spf: &str) -> bool {
    spf.split_whitespace()
        .last()
        .is_some_and(|mechanism| mechanism == "+all")
}

/// Value of a DMARC tag. Tag names compare case-insensitively.
fn dmarc_tag<'a>(record: &'a str, tag: &str) -> Option<&'a str> {
    record.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim().eq_ignore_ascii_case(tag).then(|| value.trim())
    })
}
