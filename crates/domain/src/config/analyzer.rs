use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_DNS_PORT: u16 = 53;

/// DNS analysis policy.
///
/// Retry counts, timeouts and concurrency are policy, not protocol
/// constants; every field can be set from the config file or CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnalyzerConfig {
    /// Resolver endpoints (`ip` or `ip:port`). Empty = system resolvers.
    #[serde(default)]
    pub resolvers: Vec<String>,

    /// Per-attempt timeout in milliseconds
    #[serde(default = "default_timeout_per_query")]
    pub timeout_per_query_ms: u64,

    /// Wall-clock budget for the whole run in milliseconds
    #[serde(default = "default_total_budget")]
    pub total_budget_ms: u64,

    /// Maximum queries in flight at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Retries after the first attempt for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Linear backoff step between retries in milliseconds
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Attempt AXFR against discovered nameservers
    #[serde(default = "default_true")]
    pub zone_transfer: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            resolvers: vec![],
            timeout_per_query_ms: default_timeout_per_query(),
            total_budget_ms: default_total_budget(),
            max_concurrency: default_max_concurrency(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
            zone_transfer: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn timeout_per_query(&self) -> Duration {
        Duration::from_millis(self.timeout_per_query_ms)
    }

    pub fn total_budget(&self) -> Duration {
        Duration::from_millis(self.total_budget_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Parse the configured resolvers, keeping order and dropping repeats.
    pub fn resolver_addrs(&self) -> Result<Vec<SocketAddr>, DomainError> {
        let mut addrs = Vec::with_capacity(self.resolvers.len());
        for raw in &self.resolvers {
            let addr = parse_resolver(raw)?;
            if !addrs.contains(&addr) {
                addrs.push(addr);
            }
        }
        Ok(addrs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_per_query_ms == 0 {
            return Err("timeout_per_query_ms must be greater than 0".into());
        }
        if self.total_budget_ms == 0 {
            return Err("total_budget_ms must be greater than 0".into());
        }
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be at least 1".into());
        }
        self.resolver_addrs().map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Parse `1.1.1.1`, `1.1.1.1:5353`, `2606:4700::1111` or `[2606:4700::1111]:53`.
pub fn parse_resolver(raw: &str) -> Result<SocketAddr, DomainError> {
    let trimmed = raw.trim();
    if let Ok(addr) = trimmed.parse::<SocketAddr>() {
        return Ok(addr);
    }
    trimmed
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DEFAULT_DNS_PORT))
        .map_err(|_| DomainError::InvalidResolverAddress(raw.to_string()))
}

fn default_timeout_per_query() -> u64 {
    3000
}

fn default_total_budget() -> u64 {
    30_000
}

fn default_max_concurrency() -> usize {
    15
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff() -> u64 {
    250
}

fn default_true() -> bool {
    true
}
