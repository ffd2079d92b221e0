use std::sync::Arc;
use nd_core::{InferenceModel, Result};
use crate::Config;

pub mod fallback;
pub mod groq;

pub use fallback::{fallback_summary, FallbackModel};
pub use groq::GroqModel;

/// Picks the remote model when an API key is configured, the local fallback otherwise.
pub fn create_model(config: Option<Config>) -> Result<Arc<dyn InferenceModel>> {
    let config = config.unwrap_or_default();
    if config.api_key.as_deref().map_or(true, |key| key.trim().is_empty()) {
        tracing::warn!("No API key configured, summaries will use the local fallback");
        return Ok(Arc::new(FallbackModel));
    }
    Ok(Arc::new(GroqModel::new(&config)?))
}
