use async_trait::async_trait;
use nd_core::{ArticleStorage, Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn new() -> Result<Self> where Self: Sized;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Memory,
    SQLite,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::SQLite),
            other => Err(Error::Storage(format!(
                "Unknown storage backend: {} (expected memory or sqlite)",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::SQLite => write!(f, "sqlite"),
        }
    }
}

/// Opens the named backend. `location` is the database path for SQLite and
/// ignored for the in-memory store.
pub async fn create_storage(kind: &str, location: Option<&str>) -> Result<Arc<dyn ArticleStorage>> {
    match kind.parse::<StorageKind>()? {
        StorageKind::Memory => Ok(Arc::new(<InMemoryStorage as StorageBackend>::new().await?)),
        #[cfg(feature = "sqlite")]
        StorageKind::SQLite => {
            let storage = match location {
                Some(path) => SQLiteStorage::new_with_path(&std::path::PathBuf::from(path)).await?,
                None => <SQLiteStorage as StorageBackend>::new().await?,
            };
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageKind::SQLite => {
            let _ = location;
            Err(Error::Storage("SQLite support was not compiled in (enable the sqlite feature)".to_string()))
        }
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend, StorageKind};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_storage_kind() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!("SQLite".parse::<StorageKind>().unwrap(), StorageKind::SQLite);
        assert!("qdrant".parse::<StorageKind>().is_err());
        assert_eq!(StorageKind::SQLite.to_string(), "sqlite");
    }

    #[tokio::test]
    async fn test_create_memory_storage() {
        let storage = create_storage("memory", None).await.unwrap();
        assert!(storage.get_article(1).await.unwrap().is_none());
    }
}
