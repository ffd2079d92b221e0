use async_trait::async_trait;
use nd_core::{Error, FeedEntry, FeedSource, Result};
use reqwest::Client;
use std::time::Duration;
use url::{form_urlencoded, Url};

/// Fetches one RSS search feed per company (Bing News by default).
#[derive(Debug, Clone)]
pub struct RssFeedSource {
    client: Client,
    url_template: String,
}

impl RssFeedSource {
    pub fn new(url_template: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url_template: url_template.to_string(),
        })
    }

    pub fn feed_url(&self, company: &str) -> Result<Url> {
        let query: String = form_urlencoded::byte_serialize(company.as_bytes()).collect();
        let raw = self.url_template.replace("{query}", &query);
        Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    fn name(&self) -> &str {
        "rss"
    }

    async fn fetch_entries(&self, company: &str) -> Result<Vec<FeedEntry>> {
        let url = self.feed_url(company)?;
        let body = self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        parse_feed(&body)
    }
}

/// Parses an RSS or Atom document into feed entries, in document order.
/// Entries without a title or a link are skipped.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(body)
        .map_err(|e| Error::Feed(format!("Failed to parse feed: {}", e)))?;

    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let title = entry.title.map(|t| t.content.trim().to_string())?;
            let link = entry.links.first().map(|l| l.href.trim().to_string())?;
            if title.is_empty() || link.is_empty() {
                return None;
            }
            Some(FeedEntry {
                title,
                link,
                published: entry.published.or(entry.updated),
                source: entry.source,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0">
  <channel>
    <title>Microsoft - Bing News</title>
    <link>https://www.bing.com/news/search?q=Microsoft</link>
    <description>Search results</description>
    <item>
      <title>Microsoft shares hit record high - Reuters</title>
      <link>https://www.reuters.com/markets/msft-record?utm_source=bing</link>
      <description>Shares rose.</description>
      <pubDate>Tue, 05 Mar 2024 14:30:00 GMT</pubDate>
    </item>
    <item>
      <title>Untimed story</title>
      <link>https://example.com/untimed</link>
    </item>
    <item>
      <description>No title, skipped</description>
      <link>https://example.com/no-title</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed() {
        let entries = parse_feed(SAMPLE_RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].title, "Microsoft shares hit record high - Reuters");
        assert_eq!(entries[0].link, "https://www.reuters.com/markets/msft-record?utm_source=bing");
        assert_eq!(
            entries[0].published,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap())
        );

        assert_eq!(entries[1].title, "Untimed story");
        assert!(entries[1].published.is_none());
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(parse_feed(b"this is not xml").is_err());
    }

    #[test]
    fn test_feed_url_encodes_company() {
        let source = RssFeedSource::new(crate::config::BING_NEWS_RSS, Duration::from_secs(5)).unwrap();
        let url = source.feed_url("Berkshire Hathaway").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.bing.com/news/search?q=Berkshire+Hathaway&format=rss"
        );
    }
}
