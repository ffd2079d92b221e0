use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_COMPANIES: &[&str] = &["Microsoft", "Google", "Apple", "Meta"];
pub const BING_NEWS_RSS: &str = "https://www.bing.com/news/search?q={query}&format=rss";
/// Longest retention window accepted, in days.
pub const MAX_RETENTION_DAYS: i64 = 36_500;

/// Knobs for one ingestion cycle. The defaults are the tuned production values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Processed in this order; earlier companies win ties between feeds.
    pub companies: Vec<String>,
    /// Feed URL with a `{query}` placeholder for the company name.
    pub feed_url_template: String,
    pub retention_days: i64,
    pub similarity_threshold: f64,
    /// Minimum gap between two throttled outbound calls.
    pub pacing: Duration,
    pub max_in_flight: usize,
    pub max_content_chars: usize,
    /// Extracted text this short or shorter counts as no content.
    pub min_content_chars: usize,
    pub request_timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            companies: DEFAULT_COMPANIES.iter().map(|c| c.to_string()).collect(),
            feed_url_template: BING_NEWS_RSS.to_string(),
            retention_days: 7,
            similarity_threshold: nd_dedup::DEFAULT_SIMILARITY_THRESHOLD,
            pacing: Duration::from_secs(2),
            max_in_flight: 1,
            max_content_chars: 15_000,
            min_content_chars: 200,
            request_timeout: Duration::from_secs(20),
        }
    }
}

impl IngestConfig {
    /// Retention window, clamped to `0..=MAX_RETENTION_DAYS`.
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.retention_days.clamp(0, MAX_RETENTION_DAYS))
    }
}
