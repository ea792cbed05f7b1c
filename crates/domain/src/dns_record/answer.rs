use super::RecordType;
use serde::{Deserialize, Serialize};

/// Data carried by one answer record, tagged by record kind.
///
/// Values are kept as the resolver rendered them; canonicalization happens
/// in the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "UPPERCASE")]
pub enum AnswerData {
    A(String),
    Aaaa(String),
    Mx {
        preference: u16,
        exchange: String,
    },
    Txt(String),
    Ns(String),
    Soa {
        mname: String,
        rname: String,
        serial: u32,
        refresh: i32,
        retry: i32,
        expire: i32,
        minimum: u32,
    },
    Cname(String),
    Ptr(String),
    /// Anything outside the modelled set (DNSKEY, DS, SRV inside a zone
    /// transfer, ...), rendered as presentation text.
    Other { rtype: String, text: String },
}

impl AnswerData {
    /// Record type of this answer, `None` for unmodelled `Other` kinds.
    pub fn record_type(&self) -> Option<RecordType> {
        match self {
            AnswerData::A(_) => Some(RecordType::A),
            AnswerData::Aaaa(_) => Some(RecordType::AAAA),
            AnswerData::Mx { .. } => Some(RecordType::MX),
            AnswerData::Txt(_) => Some(RecordType::TXT),
            AnswerData::Ns(_) => Some(RecordType::NS),
            AnswerData::Soa { .. } => Some(RecordType::SOA),
            AnswerData::Cname(_) => Some(RecordType::CNAME),
            AnswerData::Ptr(_) => Some(RecordType::PTR),
            AnswerData::Other { rtype, .. } => rtype.parse().ok(),
        }
    }

    /// Address text for A/AAAA answers.
    pub fn address(&self) -> Option<&str> {
        match self {
            AnswerData::A(addr) | AnswerData::Aaaa(addr) => Some(addr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Owner name as returned by the resolver
    pub name: String,
    pub ttl: u32,
    pub data: AnswerData,
}

impl AnswerRecord {
    pub fn new(name: impl Into<String>, ttl: u32, data: AnswerData) -> Self {
        Self {
            name: name.into(),
            ttl,
            data,
        }
    }
}

/// Successful response to one query attempt.
///
/// An empty `records` list is a NODATA answer: the name exists but holds no
/// record of the requested type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnswer {
    pub records: Vec<AnswerRecord>,
    /// Minimum TTL across the answer section
    pub ttl: Option<u32>,
    pub authoritative: bool,
}

impl RawAnswer {
    pub fn new(records: Vec<AnswerRecord>, authoritative: bool) -> Self {
        let ttl = records.iter().map(|r| r.ttl).min();
        Self {
            records,
            ttl,
            authoritative,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Addresses of every A/AAAA record in the answer.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.records.iter().filter_map(|r| r.data.address())
    }
}
