//! Rankle Domain Layer
pub mod config;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod finding;
pub mod report;
pub mod validators;

pub use config::{AnalyzerConfig, CliOverrides, Config, ConfigError, LoggingConfig};
pub use dns_query::{DnsQuery, QueryOutcome, QueryPurpose};
pub use dns_record::{AnswerData, AnswerRecord, RawAnswer, Record, RecordSet, RecordType};
pub use errors::{AnalysisError, DomainError, QueryError, QueryErrorKind};
pub use finding::{Evidence, Finding, Severity};
pub use report::{AnalysisPhase, Report, RunMetadata};
