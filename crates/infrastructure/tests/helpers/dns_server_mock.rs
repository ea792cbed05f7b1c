use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::task::JoinHandle;

pub const RCODE_NOERROR: u8 = 0;
pub const RCODE_SERVFAIL: u8 = 2;
pub const RCODE_NXDOMAIN: u8 = 3;
pub const RCODE_REFUSED: u8 = 5;

pub const TYPE_A: u16 = 1;
pub const TYPE_NS: u16 = 2;
pub const TYPE_SOA: u16 = 6;
pub const TYPE_MX: u16 = 15;
pub const TYPE_TXT: u16 = 16;
pub const TYPE_AXFR: u16 = 252;

const MOCK_TTL: u32 = 300;

/// One answer record served by the mock, owner name is always the question.
#[derive(Debug, Clone)]
pub enum MockRecord {
    A(Ipv4Addr),
    Ns(String),
    Mx(u16, String),
    Txt(Vec<String>),
    Soa(String, String, u32),
}

impl MockRecord {
    fn rtype(&self) -> u16 {
        match self {
            MockRecord::A(_) => TYPE_A,
            MockRecord::Ns(_) => TYPE_NS,
            MockRecord::Mx(..) => TYPE_MX,
            MockRecord::Txt(_) => TYPE_TXT,
            MockRecord::Soa(..) => TYPE_SOA,
        }
    }

    fn rdata(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            MockRecord::A(ip) => out.extend_from_slice(&ip.octets()),
            MockRecord::Ns(host) => encode_name(host, &mut out),
            MockRecord::Mx(preference, exchange) => {
                out.extend_from_slice(&preference.to_be_bytes());
                encode_name(exchange, &mut out);
            }
            MockRecord::Txt(chunks) => {
                for chunk in chunks {
                    out.push(chunk.len() as u8);
                    out.extend_from_slice(chunk.as_bytes());
                }
            }
            MockRecord::Soa(mname, rname, serial) => {
                encode_name(mname, &mut out);
                encode_name(rname, &mut out);
                for value in [*serial, 7200, 3600, 1_209_600, 300] {
                    out.extend_from_slice(&value.to_be_bytes());
                }
            }
        }
        out
    }
}

/// What the mock sends back for one question. `None` from the handler
/// means the server stays silent.
#[derive(Debug, Clone, Default)]
pub struct MockReply {
    pub rcode: u8,
    pub records: Vec<MockRecord>,
    /// Over UDP, answer with TC set and no records.
    pub truncate_udp: bool,
    /// Answer with a different message ID.
    pub wrong_id: bool,
    /// Over TCP, split the records across this many messages.
    pub tcp_messages: usize,
}

impl MockReply {
    pub fn answer(records: Vec<MockRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn rcode(rcode: u8) -> Self {
        Self {
            rcode,
            ..Self::default()
        }
    }
}

pub type Handler = Arc<dyn Fn(&str, u16) -> Option<MockReply> + Send + Sync>;

/// Loopback DNS server answering over UDP and TCP on the same port.
pub struct MockDnsServer {
    addr: SocketAddr,
    tasks: Vec<JoinHandle<()>>,
}

impl MockDnsServer {
    pub async fn start<F>(handler: F) -> Result<Self, std::io::Error>
    where
        F: Fn(&str, u16) -> Option<MockReply> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let udp = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = udp.local_addr()?;
        let tcp = TcpListener::bind(addr).await?;

        let udp_handler = Arc::clone(&handler);
        let udp_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            while let Ok((len, peer)) = udp.recv_from(&mut buf).await {
                let Some((name, qtype, question_end)) = parse_question(&buf[..len]) else {
                    continue;
                };
                let Some(reply) = udp_handler(&name, qtype) else {
                    continue;
                };
                let query = &buf[..question_end];
                let response = if reply.truncate_udp {
                    build_response(query, &reply, &[], true)
                } else {
                    build_response(query, &reply, &reply.records, false)
                };
                let _ = udp.send_to(&response, peer).await;
            }
        });

        let tcp_task = tokio::spawn(async move {
            while let Ok((stream, _)) = tcp.accept().await {
                tokio::spawn(serve_tcp(stream, Arc::clone(&handler)));
            }
        });

        Ok(Self {
            addr,
            tasks: vec![udp_task, tcp_task],
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// An address on loopback where nothing listens.
pub async fn closed_port() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.local_addr().unwrap()
}

async fn serve_tcp(mut stream: TcpStream, handler: Handler) {
    let Ok(len) = stream.read_u16().await else {
        return;
    };
    let mut query = vec![0u8; len as usize];
    if stream.read_exact(&mut query).await.is_err() {
        return;
    }
    let Some((name, qtype, question_end)) = parse_question(&query) else {
        return;
    };
    let Some(reply) = handler(&name, qtype) else {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        return;
    };

    let query = &query[..question_end];
    let parts = reply.tcp_messages.max(1);
    let per_message = reply.records.len().div_ceil(parts).max(1);
    let chunks: Vec<&[MockRecord]> = if reply.records.is_empty() {
        vec![&reply.records[..]]
    } else {
        reply.records.chunks(per_message).collect()
    };

    for chunk in chunks {
        let message = build_response(query, &reply, chunk, false);
        let mut framed = (message.len() as u16).to_be_bytes().to_vec();
        framed.extend_from_slice(&message);
        if stream.write_all(&framed).await.is_err() {
            return;
        }
    }
}

fn encode_name(name: &str, out: &mut Vec<u8>) {
    for label in name.trim_end_matches('.').split('.').filter(|l| !l.is_empty()) {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
}

/// Question name, type and the offset where the question section ends.
fn parse_question(query: &[u8]) -> Option<(String, u16, usize)> {
    let mut pos = 12;
    let mut labels = Vec::new();
    loop {
        let len = *query.get(pos)? as usize;
        pos += 1;
        if len == 0 {
            break;
        }
        let label = query.get(pos..pos + len)?;
        labels.push(String::from_utf8_lossy(label).to_lowercase());
        pos += len;
    }
    let qtype = u16::from_be_bytes([*query.get(pos)?, *query.get(pos + 1)?]);
    Some((labels.join("."), qtype, pos + 4))
}

fn build_response(query: &[u8], reply: &MockReply, records: &[MockRecord], truncated: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(512);

    let id = u16::from_be_bytes([query[0], query[1]]);
    let id = if reply.wrong_id { id.wrapping_add(1) } else { id };
    out.extend_from_slice(&id.to_be_bytes());

    // QR, AA, optional TC, RD copied from the query
    let mut flags = 0x80 | 0x04 | (query[2] & 0x01);
    if truncated {
        flags |= 0x02;
    }
    out.push(flags);
    out.push(0x80 | (reply.rcode & 0x0f));

    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&(records.len() as u16).to_be_bytes());
    out.extend_from_slice(&[0, 0, 0, 0]);
    out.extend_from_slice(&query[12..]);

    for record in records {
        let rdata = record.rdata();
        out.extend_from_slice(&[0xc0, 0x0c]);
        out.extend_from_slice(&record.rtype().to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&MOCK_TTL.to_be_bytes());
        out.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        out.extend_from_slice(&rdata);
    }
    out
}
