use async_trait::async_trait;
use nd_core::{ContentExtractor, Result};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("news-dedup/", env!("CARGO_PKG_VERSION"));

static LD_JSON: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script[type='application/ld+json']").expect("ld+json selector is valid")
});

/// Paragraph containers, most specific first.
static PARAGRAPHS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article p", "main p", "[role='main'] p", "p"]
        .iter()
        .map(|s| Selector::parse(s).expect("paragraph selector is valid"))
        .collect()
});

/// Fetches a page and pulls out its main text.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    client: Client,
    min_chars: usize,
    max_chars: usize,
}

impl HtmlExtractor {
    pub fn new(timeout: Duration, min_chars: usize, max_chars: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, min_chars, max_chars })
    }
}

#[async_trait]
impl ContentExtractor for HtmlExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        let html = self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(extract_text(&html, self.min_chars, self.max_chars))
    }
}

/// Returns the article text of `html`, or an empty string when there are no
/// more than `min_chars` characters of it. Output is cut to `max_chars`.
///
/// A JSON-LD `articleBody` is preferred; otherwise paragraphs are collected
/// from the first container selector that yields any.
pub fn extract_text(html: &str, min_chars: usize, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    let text = article_body(&document).unwrap_or_else(|| paragraphs(&document));
    if text.chars().count() <= min_chars {
        return String::new();
    }
    text.chars().take(max_chars).collect()
}

fn article_body(document: &Html) -> Option<String> {
    document
        .select(&LD_JSON)
        .filter_map(|script| serde_json::from_str::<Value>(script.text().collect::<String>().trim()).ok())
        .find_map(|json| find_article_body(&json))
}

fn find_article_body(json: &Value) -> Option<String> {
    match json {
        Value::Array(items) => items.iter().find_map(find_article_body),
        Value::Object(obj) => {
            if let Some(body) = obj.get("articleBody").and_then(|b| b.as_str()) {
                let body = body.trim();
                if !body.is_empty() {
                    return Some(body.to_string());
                }
            }
            obj.get("@graph").and_then(find_article_body)
        }
        _ => None,
    }
}

fn paragraphs(document: &Html) -> String {
    for selector in PARAGRAPHS.iter() {
        let parts: Vec<String> = document
            .select(selector)
            .map(|el| el.text().collect::<Vec<_>>().join(" "))
            .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|text| !text.is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join("\n\n");
        }
    }
    String::new()
}
