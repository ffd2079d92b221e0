use nd_core::ArticleStorage;
use nd_feeds::IngestManager;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AppState {
    pub storage: Arc<dyn ArticleStorage>,
    pub manager: Arc<IngestManager>,
    /// Held by the running background cycle.
    pub ingest_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(manager: Arc<IngestManager>) -> Self {
        Self {
            storage: manager.storage(),
            manager,
            ingest_lock: Arc::new(Mutex::new(())),
        }
    }
}
