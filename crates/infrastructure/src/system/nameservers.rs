use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, warn};

const DNS_PORT: u16 = 53;

/// Public resolvers used when the system configuration lists none.
pub const DEFAULT_NAMESERVERS: [&str; 2] = ["1.1.1.1:53", "8.8.8.8:53"];

/// Parse `nameserver` lines of a resolv.conf file.
///
/// Comments (`#`, `;`), IPv6 zone suffixes and unparsable entries are
/// skipped. Order is kept and duplicates dropped.
pub fn parse_resolv_conf(content: &str) -> Vec<SocketAddr> {
    let mut servers = Vec::new();

    for line in content.lines() {
        let line = line.split(['#', ';']).next().unwrap_or_default().trim();
        let mut fields = line.split_whitespace();
        if fields.next() != Some("nameserver") {
            continue;
        }
        let Some(value) = fields.next() else {
            continue;
        };
        let address = value.split('%').next().unwrap_or(value);
        match IpAddr::from_str(address) {
            Ok(ip) => {
                let server = SocketAddr::new(ip, DNS_PORT);
                if !servers.contains(&server) {
                    servers.push(server);
                }
            }
            Err(_) => debug!(entry = %value, "Skipping unparsable nameserver entry"),
        }
    }

    servers
}

/// Resolvers from `/etc/resolv.conf`, or the public defaults.
pub async fn system_nameservers() -> Vec<SocketAddr> {
    SystemNameservers::new().load().await
}

/// Reads the host's configured resolvers (`/etc/resolv.conf`).
pub struct SystemNameservers {
    resolv_conf_path: String,
}

impl SystemNameservers {
    pub fn new() -> Self {
        Self {
            resolv_conf_path: "/etc/resolv.conf".to_string(),
        }
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            resolv_conf_path: path.into(),
        }
    }

    /// Configured nameservers, or [`DEFAULT_NAMESERVERS`] when the file is
    /// missing or lists none.
    pub async fn load(&self) -> Vec<SocketAddr> {
        let servers = match fs::read_to_string(&self.resolv_conf_path).await {
            Ok(content) => parse_resolv_conf(&content),
            Err(e) => {
                warn!(path = %self.resolv_conf_path, error = %e, "Cannot read resolver configuration");
                Vec::new()
            }
        };

        if servers.is_empty() {
            debug!("No system nameservers found, using public defaults");
            return DEFAULT_NAMESERVERS
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();
        }

        debug!(count = servers.len(), "Loaded system nameservers");
        servers
    }
}

impl Default for SystemNameservers {
    fn default() -> Self {
        Self::new()
    }
}
