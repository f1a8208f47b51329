//! Discovery pipeline: walks the source registry, classifies every fetched
//! posting and upserts the accepted ones.
//!
//! Sources run one after another. A failing source is logged and recorded in
//! the run summary; it never aborts the run.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::classifier;
use crate::sources::{
    HostRateLimiter, RawPosting, SourceClient, SourceError, SourcePage, SourceRef,
    SourceRegistry, Targeting,
};
use crate::store::JobStore;

/// Per-request bounds applied to every page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub backoff_base: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            backoff_base: Duration::from_millis(500),
        }
    }
}

/// Counters for one discovery run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub sources_attempted: usize,
    pub sources_failed: Vec<(SourceRef, SourceError)>,
    pub postings_seen: usize,
    pub malformed: usize,
    pub rejected: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub write_errors: usize,
}

pub struct DiscoveryPipeline {
    clients: HashMap<String, Arc<dyn SourceClient>>,
    store: Arc<dyn JobStore>,
    limiter: HostRateLimiter,
    policy: FetchPolicy,
}

impl DiscoveryPipeline {
    pub fn new(store: Arc<dyn JobStore>, limiter: HostRateLimiter, policy: FetchPolicy) -> Self {
        Self {
            clients: HashMap::new(),
            store,
            limiter,
            policy,
        }
    }

    /// Registers a client under its provider name, replacing any previous one.
    pub fn with_client(mut self, client: Arc<dyn SourceClient>) -> Self {
        self.clients.insert(client.provider().to_string(), client);
        self
    }

    pub async fn run(&self, registry: &SourceRegistry) -> RunSummary {
        let mut summary = RunSummary::default();
        let total = registry.sources().len();
        info!(
            "Discovery run over {total} sources (courtesy delay {:?} per host)",
            self.limiter.period()
        );

        for (index, source) in registry.sources().iter().enumerate() {
            summary.sources_attempted += 1;
            info!("[{}/{total}] {source}", index + 1);

            let fetched = match self.clients.get(&source.provider) {
                Some(client) => self.drain(client.as_ref(), &source.id).await,
                None => Err(SourceError::UnknownProvider(source.provider.clone())),
            };

            match fetched {
                Ok(postings) => {
                    self.ingest(source, postings, registry.targeting(), &mut summary)
                        .await;
                }
                Err(e) => {
                    warn!("Source {source} failed: {e}");
                    summary.sources_failed.push((source.clone(), e));
                }
            }
        }

        info!(
            "Discovery finished: {} sources, {} failed, {} seen, {} inserted, {} duplicates, {} rejected, {} malformed, {} write errors",
            summary.sources_attempted,
            summary.sources_failed.len(),
            summary.postings_seen,
            summary.inserted,
            summary.duplicates,
            summary.rejected,
            summary.malformed,
            summary.write_errors,
        );
        summary
    }

    /// Fetches every page of one source. Any page failure fails the whole source.
    async fn drain(
        &self,
        client: &dyn SourceClient,
        source_id: &str,
    ) -> Result<Vec<RawPosting>, SourceError> {
        let mut postings = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.fetch_with_retry(client, source_id, cursor.as_deref()).await?;
            postings.extend(page.postings);

            match page.next_cursor {
                Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                    return Err(SourceError::Decode(format!(
                        "pagination did not advance past cursor '{next}'"
                    )));
                }
                Some(next) => cursor = Some(next),
                None => return Ok(postings),
            }
        }
    }

    /// One page request, spaced by the host limiter and bounded by the
    /// timeout. Transient failures are retried with exponential backoff.
    async fn fetch_with_retry(
        &self,
        client: &dyn SourceClient,
        source_id: &str,
        cursor: Option<&str>,
    ) -> Result<SourcePage, SourceError> {
        let mut attempt: u32 = 0;

        loop {
            self.limiter.until_ready(client.host()).await;

            let result =
                match tokio::time::timeout(self.policy.timeout, client.fetch_page(source_id, cursor))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::Timeout(self.policy.timeout)),
                };

            match result {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && attempt < self.policy.max_retries => {
                    let delay = self
                        .policy
                        .backoff_base
                        .saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    warn!(
                        "{source_id}: attempt {attempt} failed ({e}), retrying after {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn ingest(
        &self,
        source: &SourceRef,
        postings: Vec<RawPosting>,
        targeting: &Targeting,
        summary: &mut RunSummary,
    ) {
        let before = summary.inserted;

        for raw in postings {
            summary.postings_seen += 1;

            let posting = match raw.into_posting(&source.id) {
                Ok(posting) => posting,
                Err(e) => {
                    debug!("{source}: skipping posting: {e}");
                    summary.malformed += 1;
                    continue;
                }
            };

            if !targeting.accepts_location(&posting.location) {
                debug!("{source}: '{}' outside target locations", posting.location);
                summary.rejected += 1;
                continue;
            }

            if !classifier::classify(&posting.title).include {
                debug!("{source}: '{}' is not early-career", posting.title);
                summary.rejected += 1;
                continue;
            }

            match self.store.upsert(&posting).await {
                Ok(true) => summary.inserted += 1,
                Ok(false) => summary.duplicates += 1,
                Err(e) => {
                    error!("{source}: failed to save {}: {e}", posting.url);
                    summary.write_errors += 1;
                }
            }
        }

        info!("{source}: {} new postings", summary.inserted - before);
    }
}
