use rankle_domain::{
    AnswerData, AnswerRecord, QueryOutcome, QueryPurpose, Record, RecordSet, RecordType,
};
use std::net::IpAddr;
use tracing::debug;

/// Lower-case a domain name and strip the trailing dot. The root stays `.`.
pub fn canonical_name(name: &str) -> String {
    let name = name.trim().trim_end_matches('.').to_lowercase();
    if name.is_empty() {
        ".".to_string()
    } else {
        name
    }
}

/// Parse and re-render an IP address. `None` when it does not parse.
pub fn canonical_address(address: &str) -> Option<String> {
    address
        .trim()
        .parse::<IpAddr>()
        .ok()
        .map(|ip| ip.to_string())
}

/// Turns raw outcomes of standard queries into a deduplicated [`RecordSet`].
pub struct Normalizer;

impl Normalizer {
    /// Outcomes are consumed in the order given, which fixes the per-type
    /// record order. Probe outcomes and failed queries contribute nothing.
    pub fn normalize(outcomes: &[QueryOutcome]) -> RecordSet {
        let mut builder = RecordSet::builder();
        let mut inserted = 0usize;

        for outcome in outcomes {
            if outcome.query.purpose != QueryPurpose::Standard {
                continue;
            }
            let Some(answer) = outcome.answer() else {
                continue;
            };
            let resolver = outcome.resolver_display();
            for answer_record in &answer.records {
                if let Some(record) = to_record(answer_record, &resolver) {
                    if builder.insert(record) {
                        inserted += 1;
                    }
                }
            }
        }

        let records = builder.build();
        debug!(distinct = inserted, types = records.types().count(), "Normalized records");
        records
    }

    /// Nameserver host names from successful standard NS answers, first-seen order.
    pub fn nameserver_hosts(outcomes: &[QueryOutcome]) -> Vec<String> {
        let mut hosts: Vec<String> = Vec::new();
        for outcome in outcomes {
            if outcome.query.purpose != QueryPurpose::Standard
                || outcome.query.record_type != RecordType::NS
            {
                continue;
            }
            let Some(answer) = outcome.answer() else {
                continue;
            };
            for record in &answer.records {
                if let AnswerData::Ns(host) = &record.data {
                    let host = canonical_name(host);
                    if !hosts.contains(&host) {
                        hosts.push(host);
                    }
                }
            }
        }
        hosts
    }
}

fn to_record(answer: &AnswerRecord, resolver: &str) -> Option<Record> {
    let ttl = answer.ttl;
    let record = match &answer.data {
        AnswerData::A(address) => address_record(RecordType::A, address, ttl, resolver),
        AnswerData::Aaaa(address) => address_record(RecordType::AAAA, address, ttl, resolver),
        AnswerData::Mx {
            preference,
            exchange,
        } => Record::new(
            RecordType::MX,
            format!("{} {}", preference, canonical_name(exchange)),
            ttl,
            resolver,
        ),
        AnswerData::Txt(text) => Record::new(RecordType::TXT, text.trim(), ttl, resolver),
        AnswerData::Ns(host) => Record::new(RecordType::NS, canonical_name(host), ttl, resolver),
        AnswerData::Soa {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        } => Record::new(
            RecordType::SOA,
            format!(
                "{} {} {} {} {} {} {}",
                canonical_name(mname),
                canonical_name(rname),
                serial,
                refresh,
                retry,
                expire,
                minimum
            ),
            ttl,
            resolver,
        ),
        AnswerData::Cname(target) => {
            Record::new(RecordType::CNAME, canonical_name(target), ttl, resolver)
        }
        AnswerData::Ptr(target) => Record::new(RecordType::PTR, canonical_name(target), ttl, resolver),
        AnswerData::Other { rtype, text } => {
            // Standard types land here only when their rdata could not be decoded.
            let record_type = rtype.parse::<RecordType>().ok().filter(RecordType::is_standard)?;
            Record::new(record_type, text.trim(), ttl, resolver).malformed()
        }
    };
    Some(record)
}

fn address_record(record_type: RecordType, address: &str, ttl: u32, resolver: &str) -> Record {
    match canonical_address(address) {
        Some(address) => Record::new(record_type, address, ttl, resolver),
        None => Record::new(record_type, address.trim(), ttl, resolver).malformed(),
    }
}
