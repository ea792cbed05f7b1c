//! Wire-format query construction on top of `hickory-proto`.

use super::record_type_map::RecordTypeMapper;
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use rankle_domain::{QueryError, RecordType};
use std::str::FromStr;

/// Advertised UDP payload size; matches the UDP receive buffer.
pub const EDNS_MAX_PAYLOAD: u16 = 4096;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Serialized query with a random ID.
    pub fn build_query(domain: &str, record_type: &RecordType) -> Result<Vec<u8>, QueryError> {
        Self::build_query_with_id(domain, record_type).map(|(_, bytes)| bytes)
    }

    /// Serialized query plus its ID, for matching the response. RD is set and
    /// an OPT record advertises `EDNS_MAX_PAYLOAD`.
    pub fn build_query_with_id(
        domain: &str,
        record_type: &RecordType,
    ) -> Result<(u16, Vec<u8>), QueryError> {
        let name = Name::from_str(domain).map_err(|e| {
            QueryError::malformed(format!("cannot encode query name '{}': {}", domain, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(RecordTypeMapper::to_hickory(record_type));
        query.set_query_class(DNSClass::IN);

        let id = fastrand::u16(..);
        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        let mut edns = Edns::new();
        edns.set_max_payload(EDNS_MAX_PAYLOAD);
        message.set_edns(edns);

        let bytes = Self::serialize_message(&message)?;
        Ok((id, bytes))
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, QueryError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        message
            .emit(&mut encoder)
            .map_err(|e| QueryError::malformed(format!("failed to serialize DNS query: {}", e)))?;
        Ok(buf)
    }
}
