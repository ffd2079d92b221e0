use async_trait::async_trait;
use crate::types::FeedEntry;
use crate::Result;

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Returns the name of the feed provider
    fn name(&self) -> &str;

    /// Returns the raw entries of the news feed for one company, in feed order
    async fn fetch_entries(&self, company: &str) -> Result<Vec<FeedEntry>>;
}

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Returns the main text of the page at `url`. An empty string means the
    /// page had nothing usable.
    async fn extract(&self, url: &str) -> Result<String>;
}
