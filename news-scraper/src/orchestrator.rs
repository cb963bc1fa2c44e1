use crate::config::ScraperConfig;
use crate::dedup::{dedupe, KnownTitles};
use crate::extractor::RecordExtractor;
use crate::types::{
    CandidateRecord, FailureReason, HtmlFetcher, IngestError, PersistFailure, PersistedRecord, Result,
    StoreAdapter,
};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// What one ingestion run did.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub source_url: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Article elements found on the page.
    pub seen: usize,
    /// Candidates whose title was already in the store.
    pub skipped: usize,
    pub persisted: Vec<PersistedRecord>,
    pub failed: Vec<PersistFailure>,
}

impl IngestionReport {
    pub fn persisted_count(&self) -> usize {
        self.persisted.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs fetch, extract, dedupe and persist against one source page.
///
/// Each run snapshots the store's titles before fetching and filters against
/// that snapshot only. Runs on the same orchestrator are serialized; separate
/// orchestrators sharing a store are not coordinated.
pub struct IngestionOrchestrator {
    store: Arc<dyn StoreAdapter>,
    fetcher: Arc<dyn HtmlFetcher>,
    extractor: RecordExtractor,
    source_url: String,
    persist_concurrency: usize,
    run_lock: Mutex<()>,
}

impl IngestionOrchestrator {
    pub fn new(
        store: Arc<dyn StoreAdapter>,
        fetcher: Arc<dyn HtmlFetcher>,
        config: &ScraperConfig,
    ) -> Result<Self> {
        Ok(Self {
            store,
            fetcher,
            extractor: RecordExtractor::new(&config.default_image)?,
            source_url: config.source_url.clone(),
            persist_concurrency: config.persist_concurrency.max(1),
            run_lock: Mutex::new(()),
        })
    }

    pub fn with_extractor(mut self, extractor: RecordExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub async fn run(&self) -> std::result::Result<IngestionReport, IngestError> {
        let _guard = self.run_lock.lock().await;
        let started_at = Utc::now();
        let start_time = Instant::now();

        info!("Starting ingestion run for {}", self.source_url);

        // Baseline first: without it nothing can be classified, so don't fetch
        let known = self.load_known_titles().await?;

        let html = self.fetcher.fetch(&self.source_url).await.map_err(|e| {
            error!("Failed to fetch {}: {}", self.source_url, e);
            IngestError::Fetch(e)
        })?;

        let candidates = self.extractor.extract(&html);
        let seen = candidates.len();

        let fresh: Vec<CandidateRecord> = dedupe(candidates, &known).collect();
        let skipped = seen - fresh.len();
        debug!("{} new candidates, {} already known", fresh.len(), skipped);

        let mut persisted = Vec::new();
        let mut failed = Vec::new();
        for outcome in self.persist_all(fresh).await {
            match outcome {
                Ok(record) => persisted.push(record),
                Err(failure) => failed.push(failure),
            }
        }

        let report = IngestionReport {
            source_url: self.source_url.clone(),
            started_at,
            duration_ms: start_time.elapsed().as_millis() as u64,
            seen,
            skipped,
            persisted,
            failed,
        };

        info!(
            "Ingestion run for {}: seen {}, skipped {}, persisted {}, failed {}",
            report.source_url,
            report.seen,
            report.skipped,
            report.persisted_count(),
            report.failed_count()
        );
        Ok(report)
    }

    async fn load_known_titles(&self) -> std::result::Result<KnownTitles, IngestError> {
        let titles = self.store.list_all_titles().await.map_err(|e| {
            error!("Failed to load known titles: {}", e);
            IngestError::KnownTitles(e)
        })?;

        let known = KnownTitles::new(titles);
        debug!("Loaded {} known titles", known.len());
        Ok(known)
    }

    /// Attempt every candidate; one failure never stops the others.
    /// Outcomes come back in candidate order.
    async fn persist_all(
        &self,
        candidates: Vec<CandidateRecord>,
    ) -> Vec<std::result::Result<PersistedRecord, PersistFailure>> {
        stream::iter(candidates)
            .map(|candidate| self.persist_one(candidate))
            .buffered(self.persist_concurrency)
            .collect::<Vec<_>>()
            .await
    }

    async fn persist_one(
        &self,
        candidate: CandidateRecord,
    ) -> std::result::Result<PersistedRecord, PersistFailure> {
        if !candidate.has_title() {
            warn!("Not persisting article without title (link: '{}')", candidate.link);
            return Err(PersistFailure { candidate, reason: FailureReason::MissingTitle });
        }

        match self.store.create(candidate.clone()).await {
            Ok(record) => {
                debug!("Persisted article {}: {}", record.id, record.title);
                Ok(record)
            }
            Err(e) => {
                warn!("Failed to persist article '{}': {}", candidate.title, e);
                Err(PersistFailure { candidate, reason: FailureReason::Store(e.to_string()) })
            }
        }
    }
}
