use hickory_proto::rr::RecordType as HickoryRecordType;
use rankle_domain::RecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    pub fn to_hickory(record_type: &RecordType) -> HickoryRecordType {
        match record_type {
            RecordType::A => HickoryRecordType::A,
            RecordType::AAAA => HickoryRecordType::AAAA,
            RecordType::MX => HickoryRecordType::MX,
            RecordType::TXT => HickoryRecordType::TXT,
            RecordType::NS => HickoryRecordType::NS,
            RecordType::SOA => HickoryRecordType::SOA,
            RecordType::CNAME => HickoryRecordType::CNAME,
            RecordType::PTR => HickoryRecordType::PTR,
            RecordType::DNSKEY => HickoryRecordType::DNSKEY,
            RecordType::DS => HickoryRecordType::DS,
            RecordType::AXFR => HickoryRecordType::AXFR,
        }
    }

    /// `None` for hickory types outside the analyzer's model.
    pub fn from_hickory(record_type: HickoryRecordType) -> Option<RecordType> {
        RecordType::from_u16(u16::from(record_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_maps_back() {
        let all = [
            RecordType::A,
            RecordType::AAAA,
            RecordType::MX,
            RecordType::TXT,
            RecordType::NS,
            RecordType::SOA,
            RecordType::CNAME,
            RecordType::PTR,
            RecordType::DNSKEY,
            RecordType::DS,
            RecordType::AXFR,
        ];
        for rt in all {
            let hickory = RecordTypeMapper::to_hickory(&rt);
            assert_eq!(RecordTypeMapper::from_hickory(hickory), Some(rt));
        }
    }

    #[test]
    fn test_unmodelled_type_is_none() {
        assert_eq!(RecordTypeMapper::from_hickory(HickoryRecordType::SRV), None);
    }
}
