use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait InferenceModel: Send + Sync {
    fn name(&self) -> &str;

    /// Summarize the extracted text of an article
    async fn summarize(&self, content: &str) -> Result<String>;
}
