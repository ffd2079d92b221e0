use chrono::{DateTime, Utc};
use nd_dedup::{canonicalize, normalize, DedupKeys};
use serde::{Deserialize, Serialize};

/// Source name used when a feed entry does not carry one.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// A raw entry as yielded by a feed, before any normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub source: Option<String>,
}

/// A feed entry tagged with the company it was found for, carrying its
/// comparison keys. Lives for one ingestion cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateArticle {
    pub title: String,
    pub url: String,
    pub title_norm: String,
    pub url_norm: String,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub company: String,
}

impl CandidateArticle {
    pub fn from_entry(entry: FeedEntry, company: &str) -> Self {
        Self::from_entry_at(entry, company, Utc::now())
    }

    /// Like [`CandidateArticle::from_entry`], with an explicit fallback for
    /// entries that carry no publish time.
    pub fn from_entry_at(entry: FeedEntry, company: &str, now: DateTime<Utc>) -> Self {
        Self {
            title_norm: normalize(&entry.title),
            url_norm: canonicalize(&entry.link),
            title: entry.title,
            url: entry.link,
            published_at: entry.published.unwrap_or(now),
            source: entry
                .source
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            company: company.to_string(),
        }
    }
}

impl DedupKeys for CandidateArticle {
    fn url_norm(&self) -> &str {
        &self.url_norm
    }

    fn title_norm(&self) -> &str {
        &self.title_norm
    }
}

/// Everything needed to persist an article; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub url: String,
    pub title_norm: String,
    pub url_norm: String,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub company: String,
    pub content: String,
    pub content_hash: String,
    pub summary: String,
}

impl NewArticle {
    pub fn from_candidate(
        candidate: CandidateArticle,
        content: String,
        content_hash: String,
        summary: String,
    ) -> Self {
        Self {
            title: candidate.title,
            url: candidate.url,
            title_norm: candidate.title_norm,
            url_norm: candidate.url_norm,
            published_at: candidate.published_at,
            source: candidate.source,
            company: candidate.company,
            content,
            content_hash,
            summary,
        }
    }

    pub fn with_id(self, id: i64) -> StoredArticle {
        StoredArticle {
            id,
            title: self.title,
            url: self.url,
            title_norm: self.title_norm,
            url_norm: self.url_norm,
            published_at: self.published_at,
            source: self.source,
            company: self.company,
            content: self.content,
            content_hash: self.content_hash,
            summary: self.summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArticle {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub title_norm: String,
    pub url_norm: String,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub company: String,
    pub content: String,
    pub content_hash: String,
    pub summary: String,
}

pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Listing filter used by the read path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleQuery {
    /// Substring match against `company`.
    pub company: Option<String>,
    pub limit: usize,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            company: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ArticleQuery {
    pub fn matches(&self, article: &StoredArticle) -> bool {
        match &self.company {
            Some(company) => article.company.to_lowercase().contains(&company.to_lowercase()),
            None => true,
        }
    }
}
