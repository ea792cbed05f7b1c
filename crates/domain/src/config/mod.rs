//! Configuration module for Rankle
//!
//! - `root`: Main configuration and CLI overrides
//! - `analyzer`: DNS analysis policy (resolvers, timeouts, concurrency, retries)
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod analyzer;
pub mod errors;
pub mod logging;
pub mod root;

pub use analyzer::AnalyzerConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
