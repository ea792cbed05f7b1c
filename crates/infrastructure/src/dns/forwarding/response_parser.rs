use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{RData, Record};
use rankle_domain::{AnswerData, AnswerRecord, QueryError, RawAnswer};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub rcode: ResponseCode,
    pub truncated: bool,
    pub authoritative: bool,
    pub records: Vec<AnswerRecord>,
}

impl DnsResponse {
    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    pub fn is_server_error(&self) -> bool {
        !matches!(self.rcode, ResponseCode::NoError | ResponseCode::NXDomain)
    }

    /// Classify the response: NOERROR is an answer (possibly NODATA),
    /// NXDOMAIN is `NameNotFound`, every other rcode is `ServerFailure`.
    /// Only SERVFAIL stays retryable; the rest are refusals.
    pub fn into_answer(self, name: &str) -> Result<RawAnswer, QueryError> {
        if self.is_nxdomain() {
            return Err(QueryError::name_not_found(format!("{} does not exist", name)));
        }
        if self.is_server_error() {
            let message = format!(
                "resolver answered {} for {}",
                ResponseParser::rcode_to_status(self.rcode),
                name
            );
            return Err(if self.rcode == ResponseCode::ServFail {
                QueryError::server_failure(message)
            } else {
                QueryError::rejected(message)
            });
        }
        Ok(RawAnswer::new(self.records, self.authoritative))
    }
}

/// Tracks a zone transfer stream: it ends after the closing SOA, or at the
/// first message that is not a successful answer.
#[derive(Debug, Default)]
pub struct TransferProgress {
    soa_seen: usize,
}

impl TransferProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw message; returns `true` once the stream is complete.
    pub fn observe(&mut self, message_bytes: &[u8]) -> bool {
        let Ok(message) = Message::from_vec(message_bytes) else {
            return true;
        };
        if message.response_code() != ResponseCode::NoError {
            return true;
        }
        self.soa_seen += message
            .answers()
            .iter()
            .filter(|r| matches!(r.data(), RData::SOA(_)))
            .count();
        self.soa_seen >= 2 || message.answers().is_empty()
    }
}

pub struct ResponseParser;

impl ResponseParser {
    /// Decode a response and check it answers the query with `expected_id`.
    pub fn parse(response_bytes: &[u8], expected_id: u16) -> Result<DnsResponse, QueryError> {
        let message = Message::from_vec(response_bytes)
            .map_err(|e| QueryError::malformed(format!("failed to parse DNS response: {}", e)))?;

        if message.id() != expected_id {
            return Err(QueryError::malformed(format!(
                "response ID {} does not match query ID {}",
                message.id(),
                expected_id
            )));
        }

        let rcode = message.response_code();
        let truncated = message.truncated();
        let records: Vec<AnswerRecord> = message.answers().iter().map(to_answer_record).collect();

        debug!(
            rcode = ?rcode,
            answers = records.len(),
            truncated = truncated,
            "DNS response parsed"
        );

        Ok(DnsResponse {
            rcode,
            truncated,
            authoritative: message.authoritative(),
            records,
        })
    }

    /// Merge the messages of a zone transfer into one response.
    ///
    /// The first message decides the rcode; answers of every message are
    /// concatenated in stream order.
    pub fn parse_transfer(
        messages: &[Vec<u8>],
        expected_id: u16,
    ) -> Result<DnsResponse, QueryError> {
        let mut iter = messages.iter();
        let first = iter
            .next()
            .ok_or_else(|| QueryError::malformed("zone transfer returned no messages"))?;
        let mut merged = Self::parse(first, expected_id)?;
        if merged.rcode != ResponseCode::NoError {
            return Ok(merged);
        }

        for message in iter {
            let next = Self::parse(message, expected_id)?;
            if next.rcode != ResponseCode::NoError {
                break;
            }
            merged.records.extend(next.records);
        }
        Ok(merged)
    }

    pub fn rcode_to_status(rcode: ResponseCode) -> &'static str {
        match rcode {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::FormErr => "FORMERR",
            ResponseCode::NotAuth => "NOTAUTH",
            _ => "UNKNOWN",
        }
    }
}

fn to_answer_record(record: &Record) -> AnswerRecord {
    let data = match record.data() {
        RData::A(a) => AnswerData::A(a.0.to_string()),
        RData::AAAA(aaaa) => AnswerData::Aaaa(aaaa.0.to_string()),
        RData::MX(mx) => AnswerData::Mx {
            preference: mx.preference(),
            exchange: mx.exchange().to_utf8(),
        },
        RData::TXT(txt) => AnswerData::Txt(
            txt.txt_data()
                .iter()
                .map(|chunk| String::from_utf8_lossy(chunk))
                .collect(),
        ),
        RData::NS(ns) => AnswerData::Ns(ns.0.to_utf8()),
        RData::SOA(soa) => AnswerData::Soa {
            mname: soa.mname().to_utf8(),
            rname: soa.rname().to_utf8(),
            serial: soa.serial(),
            refresh: soa.refresh(),
            retry: soa.retry(),
            expire: soa.expire(),
            minimum: soa.minimum(),
        },
        RData::CNAME(cname) => AnswerData::Cname(cname.0.to_utf8()),
        RData::PTR(ptr) => AnswerData::Ptr(ptr.0.to_utf8()),
        other => AnswerData::Other {
            rtype: record.record_type().to_string(),
            text: other.to_string(),
        },
    };
    AnswerRecord::new(record.name().to_utf8(), record.ttl(), data)
}
