pub mod nameservers;

pub use nameservers::{parse_resolv_conf, system_nameservers, SystemNameservers, DEFAULT_NAMESERVERS};
