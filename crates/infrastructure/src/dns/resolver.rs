use super::forwarding::{MessageBuilder, ResponseParser, TransferProgress};
use super::transport::tcp::TcpTransport;
use super::transport::udp::UdpTransport;
use super::transport::DnsTransport;
use async_trait::async_trait;
use rankle_application::ports::DnsResolver;
use rankle_domain::{DnsQuery, QueryError, RawAnswer, RecordType};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// [`DnsResolver`] that speaks the DNS wire protocol directly to the
/// resolver named in each query.
///
/// Lookups go over UDP and repeat over TCP when the answer comes back
/// truncated. Zone transfers run over TCP only. One call never outlives
/// the query's timeout.
#[derive(Debug, Default, Clone)]
pub struct WireDnsResolver;

impl WireDnsResolver {
    pub fn new() -> Self {
        Self
    }

    async fn lookup(&self, query: &DnsQuery, deadline: Instant) -> Result<RawAnswer, QueryError> {
        let (id, bytes) = MessageBuilder::build_query_with_id(&query.name, &query.record_type)?;

        let udp = UdpTransport::new(query.resolver);
        let response = udp.send(&bytes, remaining(deadline)?).await?;
        let parsed = ResponseParser::parse(&response.bytes, id)?;
        if !parsed.truncated {
            return parsed.into_answer(&query.name);
        }

        debug!(query = %query, "Truncated UDP response, retrying over TCP");
        let tcp = TcpTransport::new(query.resolver);
        let response = tcp.send(&bytes, remaining(deadline)?).await?;
        ResponseParser::parse(&response.bytes, id)?.into_answer(&query.name)
    }

    async fn zone_transfer(
        &self,
        query: &DnsQuery,
        deadline: Instant,
    ) -> Result<RawAnswer, QueryError> {
        let (id, bytes) = MessageBuilder::build_query_with_id(&query.name, &RecordType::AXFR)?;

        let tcp = TcpTransport::new(query.resolver);
        let mut progress = TransferProgress::new();
        let messages = tcp
            .transfer(&bytes, remaining(deadline)?, |message| progress.observe(message))
            .await?;

        let merged = ResponseParser::parse_transfer(&messages, id)?;
        debug!(
            query = %query,
            messages = messages.len(),
            records = merged.records.len(),
            "Zone transfer finished"
        );
        merged.into_answer(&query.name)
    }
}

fn remaining(deadline: Instant) -> Result<Duration, QueryError> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        Err(QueryError::timeout("query timeout elapsed"))
    } else {
        Ok(left)
    }
}

#[async_trait]
impl DnsResolver for WireDnsResolver {
    async fn resolve(&self, query: &DnsQuery) -> Result<RawAnswer, QueryError> {
        let deadline = Instant::now() + query.timeout;
        let exchange = async {
            match query.record_type {
                RecordType::AXFR => self.zone_transfer(query, deadline).await,
                _ => self.lookup(query, deadline).await,
            }
        };

        tokio::time::timeout(query.timeout, exchange)
            .await
            .map_err(|_| {
                QueryError::timeout(format!(
                    "no answer from {} within {}ms",
                    query.resolver,
                    query.timeout.as_millis()
                ))
            })?
    }
}
