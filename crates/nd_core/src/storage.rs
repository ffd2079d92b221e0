use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::types::{ArticleQuery, NewArticle, StoredArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Point lookup by canonical URL
    async fn find_by_url_norm(&self, url_norm: &str) -> Result<Option<StoredArticle>>;

    /// Point lookup by normalized title
    async fn find_by_title_norm(&self, title_norm: &str) -> Result<Option<StoredArticle>>;

    /// Point lookup by content fingerprint
    async fn find_by_content_hash(&self, content_hash: &str) -> Result<Option<StoredArticle>>;

    /// True when an article with this canonical URL or this normalized title is stored
    async fn exists_by_url_or_title(&self, url_norm: &str, title_norm: &str) -> Result<bool> {
        if self.find_by_url_norm(url_norm).await?.is_some() {
            return Ok(true);
        }
        Ok(self.find_by_title_norm(title_norm).await?.is_some())
    }

    /// Insert an article atomically. A clash on `url_norm` or `content_hash`
    /// fails with [`crate::Error::Duplicate`].
    async fn insert_article(&self, article: &NewArticle) -> Result<StoredArticle>;

    /// Delete every article published before `cutoff`, returning how many went away
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    /// Newest first
    async fn list_articles(&self, query: &ArticleQuery) -> Result<Vec<StoredArticle>>;

    async fn get_article(&self, id: i64) -> Result<Option<StoredArticle>>;
}
