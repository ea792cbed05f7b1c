use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use rankle_domain::QueryError;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Upper bound on messages read from one zone transfer stream.
const MAX_TRANSFER_MESSAGES: usize = 10_000;

/// DNS over TCP with the two-byte length prefix (RFC 1035 4.2.2).
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn connect(&self, timeout: Duration) -> Result<TcpStream, QueryError> {
        tokio::time::timeout(timeout, TcpStream::connect(self.server_addr))
            .await
            .map_err(|_| {
                QueryError::timeout(format!("timeout connecting to {} over TCP", self.server_addr))
            })?
            .map_err(|e| {
                QueryError::unreachable(format!(
                    "failed to connect to {} over TCP: {}",
                    self.server_addr, e
                ))
            })
    }

    async fn write_message(
        &self,
        stream: &mut TcpStream,
        message_bytes: &[u8],
    ) -> Result<(), QueryError> {
        let len = u16::try_from(message_bytes.len())
            .map_err(|_| QueryError::malformed("DNS message exceeds 65535 bytes"))?;
        let mut frame = BytesMut::with_capacity(message_bytes.len() + 2);
        frame.put_u16(len);
        frame.put_slice(message_bytes);

        stream.write_all(&frame).await.map_err(|e| {
            QueryError::unreachable(format!(
                "failed to send TCP query to {}: {}",
                self.server_addr, e
            ))
        })
    }

    /// Reads one length-prefixed message. `Ok(None)` on a clean EOF.
    async fn read_message(&self, stream: &mut TcpStream) -> Result<Option<Vec<u8>>, QueryError> {
        let len = match stream.read_u16().await {
            Ok(len) => len as usize,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => {
                return Err(QueryError::unreachable(format!(
                    "failed to read TCP response from {}: {}",
                    self.server_addr, e
                )))
            }
        };

        let mut buf = vec![0u8; len];
        stream.read_exact(&mut buf).await.map_err(|e| {
            QueryError::malformed(format!(
                "truncated TCP response from {}: {}",
                self.server_addr, e
            ))
        })?;
        Ok(Some(buf))
    }

    /// Zone transfer: send one query and collect response messages until
    /// `is_last` accepts one, the server closes the stream, or `timeout`
    /// passes for the whole exchange.
    pub async fn transfer<F>(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
        mut is_last: F,
    ) -> Result<Vec<Vec<u8>>, QueryError>
    where
        F: FnMut(&[u8]) -> bool + Send,
    {
        let exchange = async {
            let mut stream = self.connect(timeout).await?;
            self.write_message(&mut stream, message_bytes).await?;

            let mut messages = Vec::new();
            while messages.len() < MAX_TRANSFER_MESSAGES {
                let Some(message) = self.read_message(&mut stream).await? else {
                    break;
                };
                let done = is_last(&message);
                messages.push(message);
                if done {
                    break;
                }
            }
            Ok::<_, QueryError>(messages)
        };

        let messages = tokio::time::timeout(timeout, exchange).await.map_err(|_| {
            QueryError::timeout(format!(
                "zone transfer from {} did not finish within {}ms",
                self.server_addr,
                timeout.as_millis()
            ))
        })??;

        if messages.is_empty() {
            return Err(QueryError::unreachable(format!(
                "{} closed the TCP connection without answering",
                self.server_addr
            )));
        }

        debug!(server = %self.server_addr, messages = messages.len(), "Zone transfer stream read");
        Ok(messages)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, QueryError> {
        let exchange = async {
            let mut stream = self.connect(timeout).await?;
            self.write_message(&mut stream, message_bytes).await?;
            debug!(server = %self.server_addr, bytes_sent = message_bytes.len(), "TCP query sent");
            self.read_message(&mut stream).await
        };

        let response = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| {
                QueryError::timeout(format!(
                    "timeout waiting for TCP response from {}",
                    self.server_addr
                ))
            })??
            .ok_or_else(|| {
                QueryError::unreachable(format!(
                    "{} closed the TCP connection without answering",
                    self.server_addr
                ))
            })?;

        debug!(server = %self.server_addr, bytes_received = response.len(), "TCP response received");

        Ok(TransportResponse { bytes: response })
    }
}
