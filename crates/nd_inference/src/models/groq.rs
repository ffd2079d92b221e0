use std::fmt;
use std::sync::Arc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use nd_core::{Error, InferenceModel, Result};
use crate::Config;

const SYSTEM_PROMPT: &str = "You are a financial news assistant. Summarize the following news article in 30-40 words. Focus on the main financial impact or event.";

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Chat-completions client for Groq, or any OpenAI-compatible endpoint.
pub struct GroqModel {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    model_name: String,
    max_input_chars: usize,
}

impl GroqModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Inference("Groq API key is required".to_string()))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model_name: config.model_name.clone(),
            max_input_chars: config.max_input_chars,
        })
    }

    fn build_request(&self, content: &str) -> ChatRequest {
        let excerpt: String = content.chars().take(self.max_input_chars).collect();
        ChatRequest {
            model: self.model_name.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: excerpt,
                },
            ],
        }
    }
}

impl fmt::Debug for GroqModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .finish()
    }
}

#[async_trait::async_trait]
impl InferenceModel for GroqModel {
    fn name(&self) -> &str {
        "Groq"
    }

    async fn summarize(&self, content: &str) -> Result<String> {
        let request = self.build_request(content);

        let response = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|summary| !summary.is_empty())
            .ok_or_else(|| Error::Inference("Model returned no summary".to_string()))
    }
}
