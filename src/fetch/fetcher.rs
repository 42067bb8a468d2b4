use feed_rs::parser;
use reqwest::blocking::Client;
use scraper::Html;

use crate::domain::FeedEntry;
use crate::errors::{WatchError, WatchResult};

#[cfg_attr(test, mockall::automock)]
pub trait FetchEntries: Send + Sync {
    /// One retrieval of one source. A failed fetch yields an error,
    /// never a partial sequence.
    fn fetch(&self, url: &str) -> WatchResult<Vec<FeedEntry>>;
}

pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .connect_timeout(std::time::Duration::from_secs(10))
                .user_agent(concat!("feedwatch/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn fetch_and_parse(&self, url: &str) -> WatchResult<feed_rs::model::Feed> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| WatchError::Fetch(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(WatchError::Fetch(format!(
                "{}: HTTP {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| WatchError::Fetch(format!("{}: {}", url, e)))?;

        Self::parse_bytes(&bytes)
    }

    fn parse_bytes(bytes: &[u8]) -> WatchResult<feed_rs::model::Feed> {
        parser::parse(bytes).map_err(|e| WatchError::FeedParse(e.to_string()))
    }

    fn entries_from_feed(feed: feed_rs::model::Feed) -> Vec<FeedEntry> {
        feed.entries
            .into_iter()
            .map(|entry| {
                // First link href is the entry identity; feeds without links
                // fall back to the entry id.
                let link = entry
                    .links
                    .first()
                    .map(|l| l.href.clone())
                    .unwrap_or(entry.id);

                let title = entry
                    .title
                    .map(|t| t.content)
                    .unwrap_or_else(|| "Untitled".to_string());

                let summary = entry
                    .summary
                    .map(|s| html_to_text(&s.content))
                    .unwrap_or_default();

                FeedEntry::new(link, title).with_summary(summary)
            })
            .collect()
    }

    #[cfg(test)]
    fn entries_from_bytes(bytes: &[u8]) -> WatchResult<Vec<FeedEntry>> {
        Ok(Self::entries_from_feed(Self::parse_bytes(bytes)?))
    }
}

impl Default for HttpFeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchEntries for HttpFeedFetcher {
    fn fetch(&self, url: &str) -> WatchResult<Vec<FeedEntry>> {
        let parsed = self.fetch_and_parse(url)?;
        Ok(Self::entries_from_feed(parsed))
    }
}

/// Flatten an HTML summary to whitespace-normalized plain text.
fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
