use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nd_core::{ArticleQuery, ArticleStorage, Error, NewArticle, Result, StoredArticle};
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::StorageBackend;

#[derive(Debug)]
pub struct MemoryStore {
    articles: Vec<StoredArticle>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            articles: Vec::new(),
            next_id: 1,
        }
    }

    fn find(&self, predicate: impl Fn(&StoredArticle) -> bool) -> Option<StoredArticle> {
        self.articles.iter().find(|a| predicate(a)).cloned()
    }

    pub fn insert_article(&mut self, article: &NewArticle) -> Result<StoredArticle> {
        if self.articles.iter().any(|a| a.url_norm == article.url_norm) {
            return Err(Error::Duplicate(format!("url_norm {}", article.url_norm)));
        }
        if self.articles.iter().any(|a| a.content_hash == article.content_hash) {
            return Err(Error::Duplicate(format!("content_hash {}", article.content_hash)));
        }

        let stored = article.clone().with_id(self.next_id);
        self.next_id += 1;
        self.articles.push(stored.clone());
        Ok(stored)
    }

    pub fn delete_older_than(&mut self, cutoff: DateTime<Utc>) -> u64 {
        let before = self.articles.len();
        self.articles.retain(|a| a.published_at >= cutoff);
        (before - self.articles.len()) as u64
    }

    pub fn list_articles(&self, query: &ArticleQuery) -> Vec<StoredArticle> {
        let mut articles = self.articles.iter()
            .filter(|a| query.matches(a))
            .cloned()
            .collect::<Vec<_>>();
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles.truncate(query.limit);
        articles
    }
}

/// Process-local store. Each insert happens under one write lock, so readers
/// never see half an article and the uniqueness checks cannot race.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.articles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    async fn new() -> Result<Self> where Self: Sized {
        Ok(InMemoryStorage::new())
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn find_by_url_norm(&self, url_norm: &str) -> Result<Option<StoredArticle>> {
        Ok(self.store.read().await.find(|a| a.url_norm == url_norm))
    }

    async fn find_by_title_norm(&self, title_norm: &str) -> Result<Option<StoredArticle>> {
        Ok(self.store.read().await.find(|a| a.title_norm == title_norm))
    }

    async fn find_by_content_hash(&self, content_hash: &str) -> Result<Option<StoredArticle>> {
        Ok(self.store.read().await.find(|a| a.content_hash == content_hash))
    }

    async fn insert_article(&self, article: &NewArticle) -> Result<StoredArticle> {
        self.store.write().await.insert_article(article)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        Ok(self.store.write().await.delete_older_than(cutoff))
    }

    async fn list_articles(&self, query: &ArticleQuery) -> Result<Vec<StoredArticle>> {
        Ok(self.store.read().await.list_articles(query))
    }

    async fn get_article(&self, id: i64) -> Result<Option<StoredArticle>> {
        Ok(self.store.read().await.find(|a| a.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use nd_dedup::content_hash;

    fn article(n: u32, company: &str, age_days: i64) -> NewArticle {
        let content = format!("Body of article {} about {}.", n, company);
        NewArticle {
            title: format!("Headline {} - Reuters", n),
            url: format!("https://news.example/{}?utm_source=rss", n),
            title_norm: format!("headline {}", n),
            url_norm: format!("https://news.example/{}", n),
            published_at: Utc::now() - Duration::days(age_days),
            source: "Reuters".to_string(),
            company: company.to_string(),
            content_hash: content_hash(&content),
            content,
            summary: "Summary.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = InMemoryStorage::new();
        let stored = storage.insert_article(&article(1, "Apple", 0)).await.unwrap();
        assert_eq!(stored.id, 1);

        let found = storage.find_by_url_norm("https://news.example/1").await.unwrap();
        assert_eq!(found.map(|a| a.id), Some(1));
        assert!(storage.find_by_title_norm("headline 1").await.unwrap().is_some());
        assert!(storage.find_by_content_hash(&stored.content_hash).await.unwrap().is_some());
        assert!(storage.exists_by_url_or_title("https://other.example", "headline 1").await.unwrap());
        assert!(!storage.exists_by_url_or_title("https://other.example", "headline 2").await.unwrap());
        assert_eq!(storage.get_article(1).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_unique_url_norm() {
        let storage = InMemoryStorage::new();
        storage.insert_article(&article(1, "Apple", 0)).await.unwrap();

        let mut clash = article(2, "Apple", 0);
        clash.url_norm = "https://news.example/1".to_string();
        let err = storage.insert_article(&clash).await.unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_unique_content_hash() {
        let storage = InMemoryStorage::new();
        let first = storage.insert_article(&article(1, "Apple", 0)).await.unwrap();

        let mut clash = article(2, "Apple", 0);
        clash.content_hash = first.content_hash.clone();
        assert!(storage.insert_article(&clash).await.unwrap_err().is_duplicate());
    }

    #[tokio::test]
    async fn test_delete_older_than() {
        let storage = InMemoryStorage::new();
        storage.insert_article(&article(1, "Apple", 10)).await.unwrap();
        storage.insert_article(&article(2, "Apple", 1)).await.unwrap();

        let deleted = storage.delete_older_than(Utc::now() - Duration::days(7)).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(storage.find_by_url_norm("https://news.example/1").await.unwrap().is_none());
        assert!(storage.find_by_url_norm("https://news.example/2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_articles() {
        let storage = InMemoryStorage::new();
        storage.insert_article(&article(1, "Apple", 3)).await.unwrap();
        storage.insert_article(&article(2, "Microsoft", 1)).await.unwrap();
        storage.insert_article(&article(3, "Apple", 2)).await.unwrap();

        let all = storage.list_articles(&ArticleQuery::default()).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let apple = storage
            .list_articles(&ArticleQuery { company: Some("App".to_string()), limit: 1 })
            .await
            .unwrap();
        assert_eq!(apple.len(), 1);
        assert_eq!(apple[0].id, 3);

        let lower = storage
            .list_articles(&ArticleQuery { company: Some("apple".to_string()), limit: usize::MAX })
            .await
            .unwrap();
        assert_eq!(lower.len(), 2);
    }
}
