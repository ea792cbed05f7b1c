use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DNS record types the analyzer queries.
///
/// The first eight variants form the standard set collected into the
/// [`RecordSet`](super::RecordSet). `DNSKEY`, `DS` and `AXFR` are only issued
/// as probes and never appear as record set keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    A,
    AAAA,
    MX,
    TXT,
    NS,
    SOA,
    CNAME,
    PTR,

    // Probe-only
    DNSKEY,
    DS,
    AXFR,
}

impl RecordType {
    /// Record types queried once per resolver for every target.
    pub const STANDARD: [RecordType; 8] = [
        RecordType::A,
        RecordType::AAAA,
        RecordType::MX,
        RecordType::TXT,
        RecordType::NS,
        RecordType::SOA,
        RecordType::CNAME,
        RecordType::PTR,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::MX => "MX",
            RecordType::TXT => "TXT",
            RecordType::NS => "NS",
            RecordType::SOA => "SOA",
            RecordType::CNAME => "CNAME",
            RecordType::PTR => "PTR",
            RecordType::DNSKEY => "DNSKEY",
            RecordType::DS => "DS",
            RecordType::AXFR => "AXFR",
        }
    }

    /// Convert from wire format number (RFC 1035)
    ///
    /// Returns `None` for types the analyzer does not model.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(RecordType::A),
            2 => Some(RecordType::NS),
            5 => Some(RecordType::CNAME),
            6 => Some(RecordType::SOA),
            12 => Some(RecordType::PTR),
            15 => Some(RecordType::MX),
            16 => Some(RecordType::TXT),
            28 => Some(RecordType::AAAA),
            43 => Some(RecordType::DS),
            48 => Some(RecordType::DNSKEY),
            252 => Some(RecordType::AXFR),
            _ => None,
        }
    }

    /// Convert to wire format number
    pub fn to_u16(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::PTR => 12,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::DS => 43,
            RecordType::DNSKEY => 48,
            RecordType::AXFR => 252,
        }
    }

    pub fn is_standard(&self) -> bool {
        Self::STANDARD.contains(self)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::AAAA),
            "MX" => Ok(RecordType::MX),
            "TXT" => Ok(RecordType::TXT),
            "NS" => Ok(RecordType::NS),
            "SOA" => Ok(RecordType::SOA),
            "CNAME" => Ok(RecordType::CNAME),
            "PTR" => Ok(RecordType::PTR),
            "DNSKEY" => Ok(RecordType::DNSKEY),
            "DS" => Ok(RecordType::DS),
            "AXFR" => Ok(RecordType::AXFR),
            _ => Err(format!("Invalid record type: {}", s)),
        }
    }
}
