use rankle_domain::{DnsQuery, QueryError, RawAnswer, RecordType};
use rustc_hash::FxHashMap;
use std::net::SocketAddr;

type CacheKey = (String, RecordType, SocketAddr);

/// Terminal outcomes of one analysis run, keyed by `(name, type, resolver)`.
///
/// Created per run and handed to the scheduler; nothing survives the run.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: FxHashMap<CacheKey, Result<RawAnswer, QueryError>>,
    hits: usize,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&mut self, query: &DnsQuery) -> Option<Result<RawAnswer, QueryError>> {
        let hit = self.entries.get(&query.cache_key()).cloned();
        if hit.is_some() {
            self.hits += 1;
        }
        hit
    }

    /// Keeps the first outcome stored for a key.
    pub fn insert(&mut self, query: &DnsQuery, result: &Result<RawAnswer, QueryError>) {
        self.entries
            .entry(query.cache_key())
            .or_insert_with(|| result.clone());
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
