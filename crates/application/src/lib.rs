//! Rankle Application Layer
pub mod detectors;
pub mod ports;
pub mod registry;
pub mod services;
pub mod use_cases;

pub use registry::{AnalyzerRegistry, AnalyzerRegistryBuilder};
pub use use_cases::DnsAnalyzer;
