use super::{DetectionContext, Detector};
use rankle_domain::{Finding, RecordType, Severity};

pub struct MailDetector;

impl Detector for MailDetector {
    fn name(&self) -> &'static str {
        "mail"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Finding> {
        let records = ctx.records;
        let has_address =
            records.contains_type(RecordType::A) || records.contains_type(RecordType::AAAA);
        if records.contains_type(RecordType::MX) || !has_address {
            return vec![];
        }

        vec![Finding::new(
            self.name(),
            Severity::Info,
            format!(
                "{} publishes address records but no MX; mail falls back to the A/AAAA host",
                ctx.domain
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankle_domain::{Record, RecordSet};

    #[test]
    fn test_address_without_mx() {
        let mut builder = RecordSet::builder();
        builder.insert(Record::new(RecordType::A, "192.0.2.1", 300, "8.8.8.8:53"));
        let records = builder.build();

        let findings = MailDetector.detect(&DetectionContext::new("example.com", &records, &[]));
        assert_eq!(findings.len(), 1);

        let mut builder = RecordSet::builder();
        builder.insert(Record::new(RecordType::A, "192.0.2.1", 300, "8.8.8.8:53"));
        builder.insert(Record::new(RecordType::MX, "10 mx.example.com", 300, "8.8.8.8:53"));
        let records = builder.build();
        assert!(MailDetector
            .detect(&DetectionContext::new("example.com", &records, &[]))
            .is_empty());
    }
}
