use std::fmt;
use nd_core::{InferenceModel, Result};

pub const EMPTY_CONTENT_SUMMARY: &str = "No content available to summarize.";
const FALLBACK_SENTENCES: usize = 3;
const FALLBACK_MAX_WORDS: usize = 40;

/// Local summary used when no model is configured or the model call fails:
/// the first three sentences, cut to forty words.
pub fn fallback_summary(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return EMPTY_CONTENT_SUMMARY.to_string();
    }

    let lead = text
        .split(". ")
        .take(FALLBACK_SENTENCES)
        .collect::<Vec<_>>()
        .join(". ");
    let summary = format!("{}.", lead.trim_end_matches('.'));

    let words: Vec<&str> = summary.split_whitespace().collect();
    if words.len() > FALLBACK_MAX_WORDS {
        format!("{}...", words[..FALLBACK_MAX_WORDS].join(" "))
    } else {
        summary
    }
}

/// Model that never leaves the process.
pub struct FallbackModel;

impl fmt::Debug for FallbackModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackModel").finish()
    }
}

#[async_trait::async_trait]
impl InferenceModel for FallbackModel {
    fn name(&self) -> &str {
        "Fallback"
    }

    async fn summarize(&self, content: &str) -> Result<String> {
        Ok(fallback_summary(content))
    }
}
