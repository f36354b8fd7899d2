//! Batched ingestion of random users.
//!
//! A request for `target` users is split into chunks of at most
//! `chunk_size`. Each chunk is fetched from the random-user source and
//! written with one `insert_many`, with a fixed pause between chunks to
//! stay polite towards the upstream API.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::{DomainError, RandomUserSource, SourceError, UserRepositoryInterface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionSettings {
    pub chunk_size: usize,
    pub pause: Duration,
    pub max_target: usize,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            chunk_size: 20,
            pause: Duration::from_millis(500),
            max_target: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionReport {
    pub added: u64,
    pub batches: u32,
    /// Records persisted per chunk, in order.
    pub chunk_sizes: Vec<usize>,
}

/// Ingestion stopped early. Chunks persisted before the failure stay
/// committed and are counted in `added` / `batches`.
#[derive(Debug, Error)]
#[error("ingestion stopped after {added} users in {batches} batches: {cause}")]
pub struct IngestionError {
    pub added: u64,
    pub batches: u32,
    #[source]
    pub cause: DomainError,
}

pub struct UserIngestionService {
    repo: Arc<dyn UserRepositoryInterface>,
    source: Arc<dyn RandomUserSource>,
    settings: IngestionSettings,
}

impl UserIngestionService {
    pub fn new(
        repo: Arc<dyn UserRepositoryInterface>,
        source: Arc<dyn RandomUserSource>,
        settings: IngestionSettings,
    ) -> Self {
        Self {
            repo,
            source,
            settings,
        }
    }

    pub fn settings(&self) -> IngestionSettings {
        self.settings
    }

    /// Fetch and persist `target` random users.
    pub async fn ingest(&self, target: usize) -> Result<IngestionReport, IngestionError> {
        let mut report = IngestionReport::default();

        if target == 0 || target > self.settings.max_target {
            return Err(self.fail(
                &report,
                DomainError::Validation(format!(
                    "count must be between 1 and {}",
                    self.settings.max_target
                )),
            ));
        }
        if self.settings.chunk_size == 0 {
            return Err(self.fail(
                &report,
                DomainError::Validation("chunk size must be positive".into()),
            ));
        }

        info!(target, chunk_size = self.settings.chunk_size, "Starting user ingestion");

        let mut generated = 0usize;
        while generated < target {
            let requested = self.settings.chunk_size.min(target - generated);

            let mut users = match self.source.fetch_random_users(requested).await {
                Ok(users) => users,
                Err(e) => return Err(self.fail(&report, e.into())),
            };

            if users.is_empty() {
                return Err(self.fail(&report, SourceError::EmptyBatch { requested }.into()));
            }
            if users.len() > requested {
                warn!(
                    requested,
                    received = users.len(),
                    "Source over-delivered, discarding surplus"
                );
                users.truncate(requested);
            }

            let delivered = users.len();
            if let Err(e) = self.repo.insert_many(users).await {
                return Err(self.fail(&report, e));
            }

            generated += delivered;
            report.added += delivered as u64;
            report.batches += 1;
            report.chunk_sizes.push(delivered);

            metrics::counter!("user_ingestion_batches_total").increment(1);
            metrics::counter!("users_ingested_total").increment(delivered as u64);
            info!(
                batch = report.batches,
                requested,
                delivered,
                added = report.added,
                target,
                "Persisted user batch"
            );

            if generated < target {
                tokio::time::sleep(self.settings.pause).await;
            }
        }

        info!(added = report.added, batches = report.batches, "User ingestion finished");
        Ok(report)
    }

    fn fail(&self, report: &IngestionReport, cause: DomainError) -> IngestionError {
        if !matches!(cause, DomainError::Validation(_)) {
            metrics::counter!("user_ingestion_failures_total").increment(1);
            error!(
                added = report.added,
                batches = report.batches,
                error = %cause,
                "User ingestion failed"
            );
        }
        IngestionError {
            added: report.added,
            batches: report.batches,
            cause,
        }
    }
}
