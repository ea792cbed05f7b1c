use async_trait::async_trait;
use rankle_domain::{DnsQuery, QueryError, RawAnswer};

/// Resolver client: issues one query against the resolver named in it.
///
/// Implementations apply `query.timeout` strictly and classify every failure
/// into a [`QueryError`]. A NOERROR response without answers is `Ok` with an
/// empty [`RawAnswer`].
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve(&self, query: &DnsQuery) -> Result<RawAnswer, QueryError>;
}
