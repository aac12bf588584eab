//! Mirror-fallback fetch engine with bounded concurrent batches.
//!
//! The engine walks a paper's candidates in priority order until one
//! returns a valid PDF, remembering the winner in its [`SuccessCache`] so
//! the next request for the same paper tries it first.
//!
//! # Concurrency Model
//!
//! - Each batch record runs in its own Tokio task
//! - A per-call semaphore bounds how many records of one batch are in flight
//! - An engine-wide semaphore (the shared pool) bounds in-flight fetches
//!   across all concurrent callers
//! - Permits are released automatically when fetches complete (RAII)
//!
//! # Example
//!
//! ```no_run
//! use exampapers_core::catalog::Catalog;
//! use exampapers_core::fetch::{FetchConfig, FetchEngine};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::builtin();
//! let engine = FetchEngine::new(FetchConfig::default())?;
//! let papers: Vec<_> = catalog.all().iter().take(3).cloned().collect();
//! let results = engine.fetch_batch(&papers, 5).await;
//! println!("fetched {} of {}", results.values().filter(|r| r.is_fetched()).count(), papers.len());
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::cache::{CachedSource, SuccessCache};
use super::client::MirrorClient;
use super::constants::{CONNECT_TIMEOUT, DEFAULT_POOL_SIZE, FETCH_TIMEOUT, PROBE_TIMEOUT};
use crate::catalog::PaperRecord;

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;

/// Error type for fetch engine construction.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid pool size provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Tunables for a [`FetchEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Engine-wide bound on in-flight paper fetches.
    pub pool_size: usize,
    /// Per-request timeout for downloads.
    pub fetch_timeout: Duration,
    /// Per-request timeout for availability probes.
    pub probe_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Optional wall-clock limit for a whole batch.
    pub batch_deadline: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            fetch_timeout: FETCH_TIMEOUT,
            probe_timeout: PROBE_TIMEOUT,
            connect_timeout: CONNECT_TIMEOUT,
            batch_deadline: None,
        }
    }
}

/// Result of fetching one paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A mirror returned a valid PDF.
    Fetched {
        /// The PDF bytes.
        bytes: Bytes,
        /// The record's download filename.
        filename: String,
    },
    /// No candidate produced a valid PDF.
    Unavailable,
}

impl FetchOutcome {
    /// Returns `true` when bytes were fetched.
    #[must_use]
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }

    /// Fetched bytes, if any.
    #[must_use]
    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Fetched { bytes, .. } => Some(bytes),
            Self::Unavailable => None,
        }
    }
}

/// Availability of one candidate, as reported by a HEAD probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorStatus {
    /// Mirror name.
    pub mirror: String,
    /// Probed URL.
    pub url: String,
    /// Final HTTP status, or 0 when no response was received.
    pub status: u16,
    /// `true` only for status 200.
    pub available: bool,
    /// Transport error message when no response was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fetch engine owning the HTTP client, success cache and shared pool.
///
/// Cloning is cheap and clones share all state.
#[derive(Debug, Clone)]
pub struct FetchEngine {
    client: MirrorClient,
    cache: Arc<SuccessCache>,
    pool: Arc<Semaphore>,
    config: FetchConfig,
}

impl FetchEngine {
    /// Creates an engine with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if `config.pool_size` is
    /// outside 1-100, or [`EngineError::Client`] if the client cannot be built.
    pub fn new(config: FetchConfig) -> Result<Self, EngineError> {
        let client = MirrorClient::with_connect_timeout(config.connect_timeout)?;
        Self::with_client(client, config)
    }

    /// Creates an engine around an existing client.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if `config.pool_size` is
    /// outside 1-100.
    #[instrument(level = "debug", skip(client))]
    pub fn with_client(client: MirrorClient, config: FetchConfig) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&config.pool_size) {
            return Err(EngineError::InvalidConcurrency {
                value: config.pool_size,
            });
        }

        debug!(
            pool_size = config.pool_size,
            fetch_timeout_ms = config.fetch_timeout.as_millis(),
            probe_timeout_ms = config.probe_timeout.as_millis(),
            batch_deadline_ms = config.batch_deadline.map(|d| d.as_millis()),
            "creating fetch engine"
        );

        Ok(Self {
            client,
            cache: Arc::new(SuccessCache::new()),
            pool: Arc::new(Semaphore::new(config.pool_size)),
            config,
        })
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Returns the success cache.
    #[must_use]
    pub fn cache(&self) -> &SuccessCache {
        &self.cache
    }

    /// Fetches one paper, trying the cached source first and then every
    /// candidate in order.
    ///
    /// Never fails: exhaustion is reported as [`FetchOutcome::Unavailable`].
    #[instrument(skip(self, record), fields(paper_id = record.id))]
    pub async fn fetch_paper(&self, record: &PaperRecord) -> FetchOutcome {
        // The pool semaphore is never closed, so acquire only fails if the
        // engine is being torn down; fetch without a permit in that case.
        let _permit = self.pool.acquire().await.ok();
        self.fetch_with_fallback(record).await
    }

    async fn fetch_with_fallback(&self, record: &PaperRecord) -> FetchOutcome {
        let timeout = self.config.fetch_timeout;

        if let Some(cached) = self.cache.get(record.id) {
            if let Some(bytes) = self
                .client
                .fetch_from_url(&cached.url, cached.kind.headers(), timeout)
                .await
            {
                debug!(url = %cached.url, mirror = %cached.mirror, "cached source still valid");
                return FetchOutcome::Fetched {
                    bytes,
                    filename: record.filename.clone(),
                };
            }
            debug!(url = %cached.url, "cached source failed; walking candidates");
        }

        for candidate in &record.candidates {
            debug!(mirror = %candidate.mirror, url = %candidate.url, "trying candidate");
            if let Some(bytes) = self
                .client
                .fetch_from_url(&candidate.url, candidate.headers(), timeout)
                .await
            {
                self.cache.record(
                    record.id,
                    CachedSource {
                        url: candidate.url.clone(),
                        mirror: candidate.mirror.clone(),
                        kind: candidate.kind,
                    },
                );
                info!(
                    mirror = %candidate.mirror,
                    bytes = bytes.len(),
                    "paper fetched"
                );
                return FetchOutcome::Fetched {
                    bytes,
                    filename: record.filename.clone(),
                };
            }
        }

        warn!(
            candidates = record.candidates.len(),
            "no mirror returned a valid PDF"
        );
        FetchOutcome::Unavailable
    }

    /// Fetches every record concurrently, at most `max_concurrency` at a time.
    ///
    /// Returns exactly one outcome per distinct record id, whatever the
    /// completion order. A failing or panicking record never affects the
    /// others. When a batch deadline is configured, records still running at
    /// the deadline are cancelled and reported as unavailable.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn fetch_batch(
        &self,
        records: &[PaperRecord],
        max_concurrency: usize,
    ) -> HashMap<u32, FetchOutcome> {
        let limit = Arc::new(Semaphore::new(
            max_concurrency.clamp(MIN_CONCURRENCY, MAX_CONCURRENCY),
        ));
        let deadline = self.config.batch_deadline.map(|d| Instant::now() + d);

        let mut seen = HashSet::with_capacity(records.len());
        let mut handles = Vec::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.id) {
                debug!(paper_id = record.id, "skipping duplicate record in batch");
                continue;
            }

            let engine = self.clone();
            let limit = Arc::clone(&limit);
            let record = record.clone();
            let id = record.id;

            handles.push((
                id,
                tokio::spawn(async move {
                    // Permit is dropped when this block exits (RAII)
                    let _permit = limit.acquire_owned().await.ok();
                    engine.fetch_paper(&record).await
                }),
            ));
        }

        debug!(task_count = handles.len(), "waiting for fetches to complete");

        let mut results = HashMap::with_capacity(handles.len());
        for (id, mut handle) in handles {
            let joined = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, &mut handle).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        handle.abort();
                        warn!(paper_id = id, "batch deadline reached; paper cancelled");
                        results.insert(id, FetchOutcome::Unavailable);
                        continue;
                    }
                },
                None => handle.await,
            };

            let outcome = joined.unwrap_or_else(|e| {
                warn!(paper_id = id, error = %e, "fetch task panicked");
                FetchOutcome::Unavailable
            });
            results.insert(id, outcome);
        }

        let fetched = results.values().filter(|r| r.is_fetched()).count();
        info!(
            fetched,
            unavailable = results.len() - fetched,
            total = results.len(),
            "batch fetch complete"
        );
        results
    }

    /// Probes every candidate of `record` with a HEAD request.
    ///
    /// Rows are returned in candidate order. Transport failures become
    /// `status = 0` rows and never stop the remaining probes.
    #[instrument(skip(self, record), fields(paper_id = record.id))]
    pub async fn check_availability(&self, record: &PaperRecord) -> Vec<MirrorStatus> {
        let timeout = self.config.probe_timeout;
        let probes = record.candidates.iter().map(|candidate| async move {
            match self
                .client
                .head_status(&candidate.url, candidate.headers(), timeout)
                .await
            {
                Ok(status) => MirrorStatus {
                    mirror: candidate.mirror.clone(),
                    url: candidate.url.clone(),
                    status,
                    available: status == 200,
                    error: None,
                },
                Err(error) => {
                    debug!(url = %candidate.url, error = %error, "probe failed");
                    MirrorStatus {
                        mirror: candidate.mirror.clone(),
                        url: candidate.url.clone(),
                        status: 0,
                        available: false,
                        error: Some(error.to_string()),
                    }
                }
            }
        });
        join_all(probes).await
    }
}
