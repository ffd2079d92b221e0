use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    /// A uniqueness constraint rejected the write (`url_norm` or `content_hash`).
    #[error("Duplicate article: {0}")]
    Duplicate(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::Duplicate(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_is_distinguishable() {
        assert!(Error::Duplicate("url_norm".to_string()).is_duplicate());
        assert!(!Error::Storage("disk full".to_string()).is_duplicate());
        assert_eq!(
            Error::Duplicate("content_hash".to_string()).to_string(),
            "Duplicate article: content_hash"
        );
    }
}
