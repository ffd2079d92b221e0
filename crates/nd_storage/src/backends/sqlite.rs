use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use nd_core::{ArticleQuery, ArticleStorage, Error, NewArticle, Result, StoredArticle};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::PathBuf;
use std::sync::Arc;
use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        url TEXT NOT NULL,
        title_norm TEXT NOT NULL,
        url_norm TEXT NOT NULL,
        content_hash TEXT NOT NULL,
        published_at TEXT NOT NULL,
        source TEXT NOT NULL,
        company TEXT NOT NULL,
        summary TEXT NOT NULL,
        content TEXT NOT NULL,
        CONSTRAINT uq_url_norm UNIQUE (url_norm),
        CONSTRAINT uq_content_hash UNIQUE (content_hash)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_title_norm_company ON articles (title_norm, company)",
    "CREATE INDEX IF NOT EXISTS ix_published_at ON articles (published_at)",
    // Add future migrations here
];

/// Fixed-width UTC timestamps so that text comparison orders them correctly.
fn encode_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse date {}: {}", raw, e)))
}

fn db_error(context: &str, e: sqlx::Error) -> Error {
    Error::Database(format!("{}: {}", context, e))
}

fn row_to_article(row: &SqliteRow) -> Result<StoredArticle> {
    let published_at: String = row.try_get("published_at").map_err(|e| db_error("Failed to read row", e))?;
    let get = |column: &str| -> Result<String> {
        row.try_get::<String, _>(column).map_err(|e| db_error("Failed to read row", e))
    };

    Ok(StoredArticle {
        id: row.try_get("id").map_err(|e| db_error("Failed to read row", e))?,
        title: get("title")?,
        url: get("url")?,
        title_norm: get("title_norm")?,
        url_norm: get("url_norm")?,
        published_at: decode_time(&published_at)?,
        source: get("source")?,
        company: get("company")?,
        content: get("content")?,
        content_hash: get("content_hash")?,
        summary: get("summary")?,
    })
}

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    async fn new() -> Result<Self> {
        let db_path = PathBuf::from("news.db");
        Self::new_with_path(&db_path).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| db_error("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| db_error(&format!("Failed to run migration {}", i), e))?;
        }
        tracing::debug!(path = %db_path.display(), "SQLite storage ready");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<StoredArticle>> {
        // column names come from this module only
        let sql = format!("SELECT * FROM articles WHERE {} = ? LIMIT 1", column);
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to look up article", e))?;
        row.as_ref().map(row_to_article).transpose()
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn find_by_url_norm(&self, url_norm: &str) -> Result<Option<StoredArticle>> {
        self.find_one("url_norm", url_norm).await
    }

    async fn find_by_title_norm(&self, title_norm: &str) -> Result<Option<StoredArticle>> {
        self.find_one("title_norm", title_norm).await
    }

    async fn find_by_content_hash(&self, content_hash: &str) -> Result<Option<StoredArticle>> {
        self.find_one("content_hash", content_hash).await
    }

    async fn exists_by_url_or_title(&self, url_norm: &str, title_norm: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM articles WHERE url_norm = ? OR title_norm = ? LIMIT 1")
            .bind(url_norm)
            .bind(title_norm)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to look up article", e))?;
        Ok(row.is_some())
    }

    async fn insert_article(&self, article: &NewArticle) -> Result<StoredArticle> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles
            (title, url, title_norm, url_norm, content_hash, published_at, source, company, summary, content)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.title)
        .bind(&article.url)
        .bind(&article.title_norm)
        .bind(&article.url_norm)
        .bind(&article.content_hash)
        .bind(encode_time(&article.published_at))
        .bind(&article.source)
        .bind(&article.company)
        .bind(&article.summary)
        .bind(&article.content)
        .execute(&*self.pool)
        .await;

        match result {
            Ok(done) => Ok(article.clone().with_id(done.last_insert_rowid())),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(Error::Duplicate(e.message().to_string()))
            }
            Err(e) => Err(db_error("Failed to store article", e)),
        }
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let done = sqlx::query("DELETE FROM articles WHERE published_at < ?")
            .bind(encode_time(&cutoff))
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to delete old articles", e))?;
        Ok(done.rows_affected())
    }

    async fn list_articles(&self, query: &ArticleQuery) -> Result<Vec<StoredArticle>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM articles
            WHERE (?1 IS NULL OR instr(lower(company), lower(?1)) > 0)
            ORDER BY published_at DESC
            LIMIT ?2
            "#,
        )
        .bind(query.company.as_deref())
        .bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| db_error("Failed to list articles", e))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn get_article(&self, id: i64) -> Result<Option<StoredArticle>> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to get article", e))?;
        row.as_ref().map(row_to_article).transpose()
    }
}
