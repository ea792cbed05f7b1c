use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use rankle_domain::QueryError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP. Each query binds its own ephemeral socket.
pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn bind_addr(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, QueryError> {
        let socket = UdpSocket::bind(self.bind_addr()).await.map_err(|e| {
            QueryError::unreachable(format!("failed to bind UDP socket: {}", e))
        })?;

        // Connected so ICMP port-unreachable surfaces as a refused receive.
        socket.connect(self.server_addr).await.map_err(|e| {
            QueryError::unreachable(format!("failed to connect UDP socket to {}: {}", self.server_addr, e))
        })?;

        let bytes_sent = tokio::time::timeout(timeout, socket.send(message_bytes))
            .await
            .map_err(|_| {
                QueryError::timeout(format!("timeout sending UDP query to {}", self.server_addr))
            })?
            .map_err(|e| {
                QueryError::unreachable(format!(
                    "failed to send UDP query to {}: {}",
                    self.server_addr, e
                ))
            })?;

        debug!(server = %self.server_addr, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let bytes_received = tokio::time::timeout(timeout, socket.recv(&mut recv_buf))
            .await
            .map_err(|_| {
                QueryError::timeout(format!(
                    "timeout waiting for UDP response from {}",
                    self.server_addr
                ))
            })?
            .map_err(|e| {
                QueryError::unreachable(format!(
                    "failed to receive UDP response from {}: {}",
                    self.server_addr, e
                ))
            })?;

        recv_buf.truncate(bytes_received);
        debug!(server = %self.server_addr, bytes_received, "UDP response received");

        Ok(TransportResponse { bytes: recv_buf })
    }
}
