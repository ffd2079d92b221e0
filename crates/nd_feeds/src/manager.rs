use chrono::{DateTime, Utc};
use nd_core::{
    ArticleStorage, CandidateArticle, ContentExtractor, FeedSource, NewArticle, Result,
};
use nd_dedup::{content_hash, BatchDeduplicator, BatchRejection};
use nd_inference::{Summarizer, SummarySource};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::IngestConfig;
use crate::throttle::Throttle;

/// Why a candidate did not make it into the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Published before the retention cutoff of this cycle.
    Expired,
    /// Stage 1: an earlier candidate of this cycle already covers it.
    SeenInBatch(BatchRejection),
    /// Stage 2: the store already holds this canonical URL or normalized title.
    AlreadyStored,
    ExtractionFailed(String),
    EmptyContent,
    /// Stage 3: the store already holds an article with the same content hash.
    DuplicateContent { existing_id: i64 },
    /// The store refused the insert on a uniqueness constraint.
    ConstraintViolation(String),
    StorageFailed(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Expired => write!(f, "older than the retention window"),
            Rejection::SeenInBatch(reason) => write!(f, "seen in batch ({})", reason),
            Rejection::AlreadyStored => write!(f, "already stored"),
            Rejection::ExtractionFailed(e) => write!(f, "extraction failed: {}", e),
            Rejection::EmptyContent => write!(f, "no content"),
            Rejection::DuplicateContent { existing_id } => {
                write!(f, "same content as article {}", existing_id)
            }
            Rejection::ConstraintViolation(e) => write!(f, "constraint violation: {}", e),
            Rejection::StorageFailed(e) => write!(f, "storage failed: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Stored { id: i64 },
    Rejected(Rejection),
}

/// Tally of one ingestion cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Articles removed by retention before the cycle started.
    pub expired: u64,
    pub feeds_failed: usize,
    /// Raw feed entries across all companies.
    pub fetched: usize,
    /// Feed entries already past the retention window.
    pub too_old: usize,
    pub seen_in_batch: usize,
    pub already_stored: usize,
    pub extraction_failed: usize,
    pub empty_content: usize,
    pub duplicate_content: usize,
    pub constraint_violations: usize,
    pub storage_failed: usize,
    /// Candidates left unprocessed because shutdown was requested.
    pub cancelled: usize,
    pub stored: usize,
}

impl IngestReport {
    pub fn record(&mut self, outcome: &CandidateOutcome) {
        match outcome {
            CandidateOutcome::Stored { .. } => self.stored += 1,
            CandidateOutcome::Rejected(rejection) => match rejection {
                Rejection::Expired => self.too_old += 1,
                Rejection::SeenInBatch(_) => self.seen_in_batch += 1,
                Rejection::AlreadyStored => self.already_stored += 1,
                Rejection::ExtractionFailed(_) => self.extraction_failed += 1,
                Rejection::EmptyContent => self.empty_content += 1,
                Rejection::DuplicateContent { .. } => self.duplicate_content += 1,
                Rejection::ConstraintViolation(_) => self.constraint_violations += 1,
                Rejection::StorageFailed(_) => self.storage_failed += 1,
            },
        }
    }

    pub fn rejected(&self) -> usize {
        self.too_old
            + self.seen_in_batch
            + self.already_stored
            + self.extraction_failed
            + self.empty_content
            + self.duplicate_content
            + self.constraint_violations
            + self.storage_failed
    }
}

/// Runs ingestion cycles: retention, feed collection with in-batch dedup,
/// then per candidate the store checks, extraction, summarization and insert.
pub struct IngestManager {
    storage: Arc<dyn ArticleStorage>,
    feed: Arc<dyn FeedSource>,
    extractor: Arc<dyn ContentExtractor>,
    summarizer: Summarizer,
    throttle: Throttle,
    config: IngestConfig,
    shutdown: Option<watch::Receiver<bool>>,
}

impl IngestManager {
    pub fn new(
        storage: Arc<dyn ArticleStorage>,
        feed: Arc<dyn FeedSource>,
        extractor: Arc<dyn ContentExtractor>,
        summarizer: Summarizer,
        config: IngestConfig,
    ) -> Self {
        let throttle = Throttle::new(config.max_in_flight, config.pacing);
        Self {
            storage,
            feed,
            extractor,
            summarizer,
            throttle,
            config,
            shutdown: None,
        }
    }

    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    /// Stops the cycle between candidates once the receiver reads `true`.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn storage(&self) -> Arc<dyn ArticleStorage> {
        self.storage.clone()
    }

    /// One cycle over the configured companies.
    pub async fn ingest(&self) -> Result<IngestReport> {
        self.ingest_cycle(&self.config.companies).await
    }

    /// Only a failing retention delete aborts the cycle; every other failure
    /// becomes a rejection or a skipped feed.
    pub async fn ingest_cycle(&self, companies: &[String]) -> Result<IngestReport> {
        info!(companies = ?companies, feed = self.feed.name(), model = self.summarizer.model_name(), "🦗 Starting ingestion cycle");

        let cutoff = self.retention_cutoff();
        let mut report = IngestReport {
            expired: self.purge_expired(cutoff).await?,
            ..Default::default()
        };

        let candidates = self.collect_candidates(companies, cutoff, &mut report).await;
        info!(candidates = candidates.len(), fetched = report.fetched, "📰 Candidates collected");

        let total = candidates.len();
        for (processed, candidate) in candidates.into_iter().enumerate() {
            if self.shutdown_requested() {
                report.cancelled = total - processed;
                warn!(remaining = report.cancelled, "Shutdown requested, stopping cycle");
                break;
            }

            let title = candidate.title.clone();
            let company = candidate.company.clone();
            let outcome = self.process_candidate(candidate).await;
            match &outcome {
                CandidateOutcome::Stored { id } => info!(id, %company, %title, "✨ Stored article"),
                CandidateOutcome::Rejected(rejection) => {
                    debug!(%company, %title, reason = %rejection, "Rejected candidate")
                }
            }
            report.record(&outcome);
        }

        info!(
            stored = report.stored,
            rejected = report.rejected(),
            expired = report.expired,
            feeds_failed = report.feeds_failed,
            cancelled = report.cancelled,
            "✅ Ingestion cycle complete"
        );
        Ok(report)
    }

    /// Oldest publish time an article may have and still be kept.
    pub fn retention_cutoff(&self) -> DateTime<Utc> {
        Utc::now() - self.config.retention()
    }

    /// Deletes articles published before `cutoff`.
    pub async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let deleted = self.storage.delete_older_than(cutoff).await?;
        if deleted > 0 {
            info!(deleted, %cutoff, "🧹 Removed expired articles");
        }
        Ok(deleted)
    }

    /// Stage 1. Companies are walked in the given order and entries in feed
    /// order, so the first sighting of a story wins. The dedup state lives
    /// only for this call. Entries published before `cutoff` are dropped
    /// before they can claim a key.
    pub async fn collect_candidates(
        &self,
        companies: &[String],
        cutoff: DateTime<Utc>,
        report: &mut IngestReport,
    ) -> Vec<CandidateArticle> {
        let mut batch = BatchDeduplicator::new(self.config.similarity_threshold);
        let mut admitted = Vec::new();

        for company in companies {
            let entries = match self.feed.fetch_entries(company).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(%company, error = %e, "Feed fetch failed, skipping company");
                    report.feeds_failed += 1;
                    continue;
                }
            };
            debug!(%company, entries = entries.len(), "Fetched feed");
            report.fetched += entries.len();

            let now = Utc::now();
            for entry in entries {
                let candidate = CandidateArticle::from_entry_at(entry, company, now);
                if candidate.published_at < cutoff {
                    debug!(%company, title = %candidate.title, published_at = %candidate.published_at, "Past retention window");
                    report.record(&CandidateOutcome::Rejected(Rejection::Expired));
                    continue;
                }
                match batch.admit(&candidate) {
                    Ok(()) => admitted.push(candidate),
                    Err(reason) => {
                        debug!(%company, title = %candidate.title, %reason, "Duplicate within batch");
                        report.record(&CandidateOutcome::Rejected(Rejection::SeenInBatch(reason)));
                    }
                }
            }
        }

        admitted
    }

    /// Stages 2 and 3 plus extraction, summarization and the insert.
    pub async fn process_candidate(&self, candidate: CandidateArticle) -> CandidateOutcome {
        use CandidateOutcome::Rejected;

        match self.storage
            .exists_by_url_or_title(&candidate.url_norm, &candidate.title_norm)
            .await
        {
            Ok(true) => return Rejected(Rejection::AlreadyStored),
            Ok(false) => {}
            Err(e) => return Rejected(Rejection::StorageFailed(e.to_string())),
        }

        debug!(url = %candidate.url, "Extracting content");
        let content = match self.throttle.run(self.extractor.extract(&candidate.url)).await {
            Ok(Ok(content)) => content,
            Ok(Err(e)) | Err(e) => {
                warn!(url = %candidate.url, error = %e, "Extraction failed");
                return Rejected(Rejection::ExtractionFailed(e.to_string()));
            }
        };
        if content.trim().is_empty() {
            return Rejected(Rejection::EmptyContent);
        }

        let hash = content_hash(&content);
        match self.storage.find_by_content_hash(&hash).await {
            Ok(Some(existing)) => {
                return Rejected(Rejection::DuplicateContent { existing_id: existing.id })
            }
            Ok(None) => {}
            Err(e) => return Rejected(Rejection::StorageFailed(e.to_string())),
        }

        let summary = match self.throttle.run(self.summarizer.summarize(&content)).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Throttle unavailable, summarizing unpaced");
                self.summarizer.summarize(&content).await
            }
        };
        if let SummarySource::Fallback(reason) = &summary.source {
            debug!(%reason, "Used fallback summary");
        }

        let article = NewArticle::from_candidate(candidate, content, hash, summary.text);
        match self.storage.insert_article(&article).await {
            Ok(stored) => CandidateOutcome::Stored { id: stored.id },
            Err(e) if e.is_duplicate() => Rejected(Rejection::ConstraintViolation(e.to_string())),
            Err(e) => {
                warn!(url = %article.url, error = %e, "Failed to store article");
                Rejected(Rejection::StorageFailed(e.to_string()))
            }
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }
}
