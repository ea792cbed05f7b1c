use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid resolver address: {0}")]
    InvalidResolverAddress(String),

}

/// Classification of a failed DNS query attempt.
///
/// Keeps "the name does not exist" (`NameNotFound`) apart from "the resolver
/// could not be reached" (`ResolverUnreachable`, `Timeout`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryErrorKind {
    Timeout,
    ResolverUnreachable,
    Malformed,
    NameNotFound,
    ServerFailure,
}

impl QueryErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryErrorKind::Timeout => "timeout",
            QueryErrorKind::ResolverUnreachable => "resolver_unreachable",
            QueryErrorKind::Malformed => "malformed",
            QueryErrorKind::NameNotFound => "name_not_found",
            QueryErrorKind::ServerFailure => "server_failure",
        }
    }

    /// Transient failures worth another attempt.
    ///
    /// An authoritative NXDOMAIN will not change on retry, and a response we
    /// could not decode once is unlikely to decode the next time.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QueryErrorKind::Timeout
                | QueryErrorKind::ResolverUnreachable
                | QueryErrorKind::ServerFailure
        )
    }

    /// Whether the failure still proves a resolver answered us.
    pub fn is_resolver_response(&self) -> bool {
        matches!(self, QueryErrorKind::NameNotFound)
    }
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub message: String,
    /// Set when the resolver answered with a policy refusal (REFUSED, NOTIMP,
    /// FORMERR, NOTAUTH). Asking again gets the same answer.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub permanent: bool,
}

impl QueryError {
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            permanent: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::Timeout, message)
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::ResolverUnreachable, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::Malformed, message)
    }

    pub fn name_not_found(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::NameNotFound, message)
    }

    pub fn server_failure(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::ServerFailure, message)
    }

    /// A server failure that must not be retried.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            permanent: true,
            ..Self::server_failure(message)
        }
    }

    pub fn is_retryable(&self) -> bool {
        !self.permanent && self.kind.is_retryable()
    }
}

/// Hard failures of a whole analysis run.
///
/// Individual query errors never surface here; they are folded into the
/// report metadata.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("All resolvers unreachable: no query produced a response within the analysis budget")]
    AllResolversUnreachable,

    #[error("No resolvers configured and none found in the system configuration")]
    NoResolvers,

    #[error("Invalid target domain: {0}")]
    InvalidDomain(String),

    #[error("Invalid resolver configuration: {0}")]
    InvalidResolver(String),

    #[error("Unknown analyzer: {0}")]
    UnknownAnalyzer(String),
}
