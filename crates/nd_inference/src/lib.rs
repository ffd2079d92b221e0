use std::time::Duration;

pub mod models;
pub mod summarizer;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL_NAME: &str = "llama-3.1-8b-instant";
pub const DEFAULT_MAX_INPUT_CHARS: usize = 4000;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: String,
    pub base_url: String,
    /// Longer article text is cut before it is sent to the model.
    pub max_input_chars: usize,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            timeout: Duration::from_secs(30),
        }
    }
}

pub mod prelude {
    pub use super::Config;
    pub use super::models::create_model;
    pub use super::summarizer::{Summarizer, Summary, SummarySource};
    pub use nd_core::{InferenceModel, Result, Error};
}

pub use models::create_model;
pub use summarizer::{Summarizer, Summary, SummarySource};
