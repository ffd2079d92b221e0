pub mod error;
pub mod models;
pub mod sources;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::InferenceModel;
pub use sources::{ContentExtractor, FeedSource};
pub use storage::ArticleStorage;
pub use types::{
    ArticleQuery, CandidateArticle, FeedEntry, NewArticle, StoredArticle, DEFAULT_LIST_LIMIT,
    UNKNOWN_SOURCE,
};
