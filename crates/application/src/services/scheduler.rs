use crate::ports::DnsResolver;
use crate::services::cache::QueryCache;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use rankle_domain::{DnsQuery, QueryError, QueryOutcome, RawAnswer};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{sleep, sleep_until, timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const BUDGET_EXHAUSTED: &str = "analysis budget exhausted";

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Linear step; attempt `n` waits `backoff * n` before retrying.
    pub backoff: Duration,
}

#[derive(Debug)]
pub struct RoundResult {
    /// One outcome per planned query, in plan order.
    pub outcomes: Vec<QueryOutcome>,
    pub budget_exhausted: bool,
}

struct AttemptResult {
    result: Result<RawAnswer, QueryError>,
    attempts: u32,
    /// The global deadline, not the query timeout, ended the last attempt.
    budget_cut: bool,
}

impl AttemptResult {
    fn done(result: Result<RawAnswer, QueryError>, attempts: u32) -> Self {
        Self {
            result,
            attempts,
            budget_cut: false,
        }
    }

    fn budget_cut(attempts: u32) -> Self {
        Self {
            result: Err(QueryError::timeout(BUDGET_EXHAUSTED)),
            attempts,
            budget_cut: true,
        }
    }
}

/// Runs query plans against the resolver port under a shared deadline.
///
/// Workers only produce `(index, result)` pairs; the round loop owns the
/// result slots and is the only writer.
pub struct QueryScheduler {
    resolver: Arc<dyn DnsResolver>,
    max_concurrency: usize,
    retry: RetryPolicy,
}

impl QueryScheduler {
    pub fn new(resolver: Arc<dyn DnsResolver>, max_concurrency: usize, retry: RetryPolicy) -> Self {
        Self {
            resolver,
            max_concurrency: max_concurrency.max(1),
            retry,
        }
    }

    pub async fn run_round(
        &self,
        plan: &[Arc<DnsQuery>],
        deadline: Instant,
        cache: &mut QueryCache,
    ) -> RoundResult {
        let mut slots: Vec<Option<QueryOutcome>> = vec![None; plan.len()];
        let mut leaders: FxHashMap<_, usize> = FxHashMap::default();
        let mut followers: Vec<(usize, usize)> = Vec::new();
        let mut pending: Vec<usize> = Vec::with_capacity(plan.len());

        for (idx, query) in plan.iter().enumerate() {
            if let Some(result) = cache.lookup(query) {
                slots[idx] = Some(QueryOutcome::new(Arc::clone(query), result, 0));
                continue;
            }
            match leaders.entry(query.cache_key()) {
                Entry::Occupied(leader) => {
                    followers.push((idx, *leader.get()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(idx);
                    pending.push(idx);
                }
            }
        }

        debug!(
            planned = plan.len(),
            dispatched = pending.len(),
            cached = plan.len() - pending.len() - followers.len(),
            "Starting query round"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let token = CancellationToken::new();
        let mut abort_handles = Vec::with_capacity(pending.len());
        let mut tasks = FuturesUnordered::new();

        for &idx in &pending {
            let query = Arc::clone(&plan[idx]);
            let resolver = Arc::clone(&self.resolver);
            let semaphore = Arc::clone(&semaphore);
            let token = token.clone();
            let retry = self.retry;

            let handle = tokio::spawn(async move {
                let _permit = tokio::select! {
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return (idx, None),
                    },
                    _ = token.cancelled() => return (idx, None),
                };
                let result =
                    resolve_with_retry(resolver.as_ref(), &query, deadline, retry, &token).await;
                (idx, Some(result))
            });
            abort_handles.push(handle.abort_handle());
            tasks.push(handle);
        }

        let budget = sleep_until(deadline);
        tokio::pin!(budget);
        let mut deadline_hit = false;
        let mut budget_cut = false;

        loop {
            // Finished results win over an expired budget.
            tokio::select! {
                biased;
                next = tasks.next() => match next {
                    Some(Ok((idx, Some(attempt)))) => {
                        budget_cut |= attempt.budget_cut;
                        if !attempt.budget_cut {
                            cache.insert(&plan[idx], &attempt.result);
                        }
                        slots[idx] = Some(QueryOutcome::new(
                            Arc::clone(&plan[idx]),
                            attempt.result,
                            attempt.attempts,
                        ));
                    }
                    Some(Ok((_, None))) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "Query task failed");
                    }
                    None => break,
                },
                _ = &mut budget => {
                    deadline_hit = true;
                    token.cancel();
                    for handle in &abort_handles {
                        handle.abort();
                    }
                    break;
                }
            }
        }

        for (idx, leader) in followers {
            let shared = slots[leader].as_ref().map(|outcome| outcome.result.clone());
            if let Some(result) = shared {
                slots[idx] = Some(QueryOutcome::new(Arc::clone(&plan[idx]), result, 0));
            }
        }

        let incomplete = slots.iter().filter(|slot| slot.is_none()).count();
        let budget_exhausted = budget_cut || (deadline_hit && incomplete > 0);
        if budget_exhausted {
            info!(incomplete, "Analysis budget exhausted, recording remaining queries as timeouts");
        }

        let outcomes = slots
            .into_iter()
            .zip(plan)
            .map(|(slot, query)| {
                slot.unwrap_or_else(|| {
                    let message = if deadline_hit {
                        BUDGET_EXHAUSTED
                    } else {
                        "query task did not complete"
                    };
                    QueryOutcome::new(Arc::clone(query), Err(QueryError::timeout(message)), 0)
                })
            })
            .collect();

        RoundResult {
            outcomes,
            budget_exhausted,
        }
    }
}

async fn resolve_with_retry(
    resolver: &dyn DnsResolver,
    query: &DnsQuery,
    deadline: Instant,
    retry: RetryPolicy,
    token: &CancellationToken,
) -> AttemptResult {
    let mut attempt: u32 = 0;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return AttemptResult::budget_cut(attempt);
        }
        attempt += 1;

        let limit = query.timeout.min(remaining);
        let result = match timeout(limit, resolver.resolve(query)).await {
            Ok(result) => result,
            Err(_) if limit < query.timeout => return AttemptResult::budget_cut(attempt),
            Err(_) => Err(QueryError::timeout(format!(
                "no answer from {} within {}ms",
                query.resolver,
                limit.as_millis()
            ))),
        };

        match result {
            Ok(answer) => {
                debug!(query = %query, attempt, records = answer.len(), "Query answered");
                return AttemptResult::done(Ok(answer), attempt);
            }
            Err(err) if err.is_retryable() && attempt <= retry.max_retries => {
                let backoff = retry.backoff * attempt;
                debug!(query = %query, attempt, error = %err, backoff_ms = backoff.as_millis() as u64, "Retrying query");
                tokio::select! {
                    _ = sleep(backoff) => {}
                    _ = token.cancelled() => return AttemptResult::done(Err(err), attempt),
                }
            }
            Err(err) => {
                debug!(query = %query, attempt, error = %err, "Query failed");
                return AttemptResult::done(Err(err), attempt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rankle_domain::{QueryErrorKind, RecordType};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyResolver {
        failures_before_success: u32,
        calls: AtomicU32,
        kind: QueryErrorKind,
    }

    #[async_trait]
    impl DnsResolver for FlakyResolver {
        async fn resolve(&self, _query: &DnsQuery) -> Result<RawAnswer, QueryError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(QueryError::new(self.kind, "flaky"))
            } else {
                Ok(RawAnswer::empty())
            }
        }
    }

    fn plan(n: usize) -> Vec<Arc<DnsQuery>> {
        (0..n)
            .map(|i| {
                Arc::new(DnsQuery::new(
                    format!("host{}.example.com", i),
                    RecordType::A,
                    "127.0.0.1:53".parse().unwrap(),
                    Duration::from_secs(1),
                ))
            })
            .collect()
    }

    fn retry(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let resolver = Arc::new(FlakyResolver {
            failures_before_success: 2,
            calls: AtomicU32::new(0),
            kind: QueryErrorKind::ServerFailure,
        });
        let scheduler = QueryScheduler::new(resolver.clone(), 4, retry(2));
        let deadline = Instant::now() + Duration::from_secs(5);

        let round = scheduler
            .run_round(&plan(1), deadline, &mut QueryCache::new())
            .await;

        assert!(round.outcomes[0].is_success());
        assert_eq!(round.outcomes[0].attempts, 3);
        assert!(!round.budget_exhausted);
    }

    #[tokio::test]
    async fn test_name_not_found_is_not_retried() {
        let resolver = Arc::new(FlakyResolver {
            failures_before_success: 10,
            calls: AtomicU32::new(0),
            kind: QueryErrorKind::NameNotFound,
        });
        let scheduler = QueryScheduler::new(resolver.clone(), 4, retry(3));
        let deadline = Instant::now() + Duration::from_secs(5);

        let round = scheduler
            .run_round(&plan(1), deadline, &mut QueryCache::new())
            .await;

        assert_eq!(round.outcomes[0].attempts, 1);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_server_failure_is_not_retried() {
        struct RejectingResolver(AtomicU32);

        #[async_trait]
        impl DnsResolver for RejectingResolver {
            async fn resolve(&self, _query: &DnsQuery) -> Result<RawAnswer, QueryError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(QueryError::rejected("resolver answered REFUSED"))
            }
        }

        let resolver = Arc::new(RejectingResolver(AtomicU32::new(0)));
        let scheduler = QueryScheduler::new(resolver.clone(), 4, retry(2));
        let deadline = Instant::now() + Duration::from_secs(5);

        let round = scheduler
            .run_round(&plan(1), deadline, &mut QueryCache::new())
            .await;

        assert_eq!(round.outcomes[0].attempts, 1);
        assert_eq!(resolver.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_finished_results_kept_when_deadline_already_passed() {
        // Arrange - every query answers long before the round loop wakes up
        let resolver = Arc::new(FlakyResolver {
            failures_before_success: 0,
            calls: AtomicU32::new(0),
            kind: QueryErrorKind::Timeout,
        });
        let scheduler = QueryScheduler::new(resolver.clone(), 8, retry(0));
        let queries = plan(8);
        let deadline = Instant::now() + Duration::from_millis(100);
        let mut cache = QueryCache::new();

        // Act - poll once to spawn workers, then stall past the deadline
        let mut running = Box::pin(scheduler.run_round(&queries, deadline, &mut cache));
        let round = match futures::poll!(running.as_mut()) {
            std::task::Poll::Ready(round) => round,
            std::task::Poll::Pending => {
                std::thread::sleep(Duration::from_millis(300));
                running.await
            }
        };

        // Assert
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 8);
        assert!(round.outcomes.iter().all(|o| o.is_success()));
        assert!(!round.budget_exhausted);
    }

    #[tokio::test]
    async fn test_duplicate_queries_resolved_once() {
        let resolver = Arc::new(FlakyResolver {
            failures_before_success: 0,
            calls: AtomicU32::new(0),
            kind: QueryErrorKind::Timeout,
        });
        let scheduler = QueryScheduler::new(resolver.clone(), 4, retry(0));
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut cache = QueryCache::new();

        let mut queries = plan(2);
        queries.push(Arc::clone(&queries[0]));
        let round = scheduler.run_round(&queries, deadline, &mut cache).await;
        assert_eq!(round.outcomes.len(), 3);
        assert!(round.outcomes.iter().all(|o| o.is_success()));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);

        let again = scheduler.run_round(&plan(1), deadline, &mut cache).await;
        assert!(again.outcomes[0].is_success());
        assert_eq!(again.outcomes[0].attempts, 0);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.hits(), 1);
    }
}
