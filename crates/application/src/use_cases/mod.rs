pub mod dns_analyzer;

pub use dns_analyzer::DnsAnalyzer;
