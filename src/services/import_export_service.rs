use opml::{Outline, OPML};
use url::Url;

use crate::errors::{WatchError, WatchResult};
use crate::storage::traits::SourceRepository;

pub struct ImportResult {
    pub added: Vec<String>,
    pub duplicates: Vec<String>,
    pub invalid: Vec<(String, String)>, // (url, error_message)
}

/// OPML exchange for the configured source list.
pub struct ImportExportService<R: SourceRepository> {
    source_repo: R,
}

impl<R: SourceRepository> ImportExportService<R> {
    pub fn new(source_repo: R) -> Self {
        Self { source_repo }
    }

    /// Import source URLs from OPML content
    pub fn import_opml(&self, content: &str) -> WatchResult<ImportResult> {
        let opml = OPML::from_str(content).map_err(|e| WatchError::OpmlParse(e.to_string()))?;

        let mut result = ImportResult {
            added: Vec::new(),
            duplicates: Vec::new(),
            invalid: Vec::new(),
        };

        for url in Self::extract_feed_urls(&opml.body.outlines) {
            match Url::parse(&url) {
                Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
                Ok(parsed) => {
                    result
                        .invalid
                        .push((url, format!("unsupported scheme: {}", parsed.scheme())));
                    continue;
                }
                Err(e) => {
                    result.invalid.push((url, e.to_string()));
                    continue;
                }
            }

            if self.source_repo.add(&url)? {
                result.added.push(url);
            } else {
                result.duplicates.push(url);
            }
        }

        Ok(result)
    }

    /// Recursively extract feed URLs from OPML outlines
    fn extract_feed_urls(outlines: &[Outline]) -> Vec<String> {
        let mut urls = Vec::new();

        for outline in outlines {
            if let Some(url) = &outline.xml_url {
                if !url.is_empty() {
                    urls.push(url.clone());
                }
            }
            urls.extend(Self::extract_feed_urls(&outline.outlines));
        }

        urls
    }

    /// Export the configured sources to OPML format
    pub fn export_opml(&self) -> WatchResult<String> {
        let sources = self.source_repo.list()?;

        let mut opml = OPML::default();
        opml.head = Some(opml::Head {
            title: Some("feedwatch sources".to_string()),
            ..Default::default()
        });

        for url in sources {
            let outline = Outline {
                text: url.clone(),
                r#type: Some("rss".to_string()),
                xml_url: Some(url),
                ..Default::default()
            };
            opml.body.outlines.push(outline);
        }

        opml.to_string()
            .map_err(|e| WatchError::OpmlParse(e.to_string()))
    }
}
