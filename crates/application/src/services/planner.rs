use rankle_domain::{DnsQuery, QueryOutcome, QueryPurpose, RecordType};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const PROBE_PREFIX: &str = "rankle-";
const PROBE_RANDOM_LEN: usize = 20;
const AXFR_PORT: u16 = 53;
/// Wildcard A and AAAA, DMARC and DNSKEY queries added per resolver.
const PROBES_PER_RESOLVER: usize = 4;

/// Random label for the wildcard probe. Generated once per run.
pub fn generate_probe_label() -> String {
    let mut label = String::with_capacity(PROBE_PREFIX.len() + PROBE_RANDOM_LEN);
    label.push_str(PROBE_PREFIX);
    for _ in 0..PROBE_RANDOM_LEN {
        label.push(fastrand::alphanumeric().to_ascii_lowercase());
    }
    label
}

/// Builds the query plans for each scheduling round.
///
/// Plans are plain vectors; their order is the order outcomes come back in
/// and therefore the first-seen order of the normalized records.
pub struct QueryPlanner {
    timeout: Duration,
}

impl QueryPlanner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Standard record types plus wildcard, DMARC and DNSSEC probes, per resolver.
    pub fn base_plan(
        &self,
        domain: &str,
        resolvers: &[SocketAddr],
        probe_label: &str,
    ) -> Vec<Arc<DnsQuery>> {
        let probe_name = format!("{}.{}", probe_label, domain);
        let dmarc_name = format!("_dmarc.{}", domain);

        let mut plan =
            Vec::with_capacity(resolvers.len() * (RecordType::STANDARD.len() + PROBES_PER_RESOLVER));
        for &resolver in resolvers {
            for record_type in RecordType::STANDARD {
                plan.push(self.query(domain, record_type, resolver, QueryPurpose::Standard));
            }
            for record_type in [RecordType::A, RecordType::AAAA] {
                plan.push(self.query(
                    &probe_name,
                    record_type,
                    resolver,
                    QueryPurpose::WildcardProbe,
                ));
            }
            plan.push(self.query(
                &dmarc_name,
                RecordType::TXT,
                resolver,
                QueryPurpose::DmarcPolicy,
            ));
            plan.push(self.query(
                domain,
                RecordType::DNSKEY,
                resolver,
                QueryPurpose::DnssecProbe,
            ));
        }

        debug!(domain, resolvers = resolvers.len(), queries = plan.len(), "Base plan built");
        plan
    }

    /// `A` lookups for each distinct nameserver host through every resolver,
    /// so one dead resolver cannot hide a nameserver's address.
    pub fn nameserver_plan(
        &self,
        hosts: &[String],
        resolvers: &[SocketAddr],
    ) -> Vec<Arc<DnsQuery>> {
        let mut seen: Vec<&str> = Vec::with_capacity(hosts.len());
        let mut plan = Vec::with_capacity(hosts.len() * resolvers.len());
        for host in hosts {
            if seen.contains(&host.as_str()) {
                continue;
            }
            seen.push(host.as_str());
            let nameserver: Arc<str> = Arc::from(host.as_str());
            for &resolver in resolvers {
                plan.push(self.query(
                    host,
                    RecordType::A,
                    resolver,
                    QueryPurpose::NameserverAddress {
                        nameserver: Arc::clone(&nameserver),
                    },
                ));
            }
        }
        plan
    }

    /// AXFR of `domain` against every distinct address resolved for a nameserver.
    pub fn zone_transfer_plan(
        &self,
        domain: &str,
        nameserver_outcomes: &[QueryOutcome],
    ) -> Vec<Arc<DnsQuery>> {
        let mut targets: Vec<IpAddr> = Vec::new();
        let mut plan = Vec::new();

        for outcome in nameserver_outcomes {
            let QueryPurpose::NameserverAddress { nameserver } = &outcome.query.purpose else {
                continue;
            };
            let Some(answer) = outcome.answer() else {
                continue;
            };
            for address in answer.addresses() {
                let Ok(ip) = address.parse::<IpAddr>() else {
                    continue;
                };
                if targets.contains(&ip) {
                    continue;
                }
                targets.push(ip);
                plan.push(self.query(
                    domain,
                    RecordType::AXFR,
                    SocketAddr::new(ip, AXFR_PORT),
                    QueryPurpose::ZoneTransfer {
                        nameserver: Arc::clone(nameserver),
                    },
                ));
            }
        }

        debug!(domain, targets = plan.len(), "Zone transfer plan built");
        plan
    }

    fn query(
        &self,
        name: &str,
        record_type: RecordType,
        resolver: SocketAddr,
        purpose: QueryPurpose,
    ) -> Arc<DnsQuery> {
        Arc::new(DnsQuery::new(name, record_type, resolver, self.timeout).with_purpose(purpose))
    }
}
