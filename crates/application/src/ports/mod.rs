mod analyzer;
mod dns_resolver;

pub use analyzer::Analyzer;
pub use dns_resolver::DnsResolver;
