use std::sync::Arc;
use nd_core::InferenceModel;
use crate::models::fallback_summary;

/// Where a summary came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarySource {
    Model(String),
    /// The model was not used or failed; the reason is kept for logging.
    Fallback(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    pub source: SummarySource,
}

/// Summarizes article text and never fails: model errors and empty model
/// output degrade to [`fallback_summary`].
#[derive(Clone)]
pub struct Summarizer {
    model: Arc<dyn InferenceModel>,
}

impl Summarizer {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn summarize(&self, content: &str) -> Summary {
        if content.trim().is_empty() {
            return Summary {
                text: fallback_summary(content),
                source: SummarySource::Fallback("empty content".to_string()),
            };
        }

        match self.model.summarize(content).await {
            Ok(text) if !text.trim().is_empty() => Summary {
                text,
                source: SummarySource::Model(self.model.name().to_string()),
            },
            Ok(_) => Summary {
                text: fallback_summary(content),
                source: SummarySource::Fallback("model returned an empty summary".to_string()),
            },
            Err(e) => {
                tracing::warn!(model = self.model.name(), error = %e, "Summarization failed, using fallback");
                Summary {
                    text: fallback_summary(content),
                    source: SummarySource::Fallback(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nd_core::{Error, Result};

    struct FixedModel(&'static str);
    struct BrokenModel;

    #[async_trait]
    impl InferenceModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn summarize(&self, _content: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[async_trait]
    impl InferenceModel for BrokenModel {
        fn name(&self) -> &str {
            "broken"
        }

        async fn summarize(&self, _content: &str) -> Result<String> {
            Err(Error::Inference("rate limited".to_string()))
        }
    }

    #[tokio::test]
    async fn test_uses_model_output() {
        let summarizer = Summarizer::new(Arc::new(FixedModel("Short take.")));
        let summary = summarizer.summarize("Long article. With sentences.").await;
        assert_eq!(summary.text, "Short take.");
        assert_eq!(summary.source, SummarySource::Model("fixed".to_string()));
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let summarizer = Summarizer::new(Arc::new(BrokenModel));
        let summary = summarizer.summarize("First. Second. Third. Fourth.").await;
        assert_eq!(summary.text, "First. Second. Third.");
        assert!(matches!(summary.source, SummarySource::Fallback(reason) if reason.contains("rate limited")));
    }

    #[tokio::test]
    async fn test_empty_model_output_falls_back() {
        let summarizer = Summarizer::new(Arc::new(FixedModel("   ")));
        let summary = summarizer.summarize("Only sentence").await;
        assert_eq!(summary.text, "Only sentence.");
        assert!(matches!(summary.source, SummarySource::Fallback(_)));
    }
}
