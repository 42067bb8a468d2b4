use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::errors::{WatchError, WatchResult};

#[cfg_attr(test, mockall::automock)]
pub trait Translate: Send + Sync {
    fn translate(&self, text: &str, source: &str, target: &str) -> WatchResult<String>;
}

/// Translation client for a LibreTranslate-compatible endpoint.
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl HttpTranslator {
    pub fn new(endpoint: &str, api_key: Option<String>) -> WatchResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

impl Translate for HttpTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> WatchResult<String> {
        let request = TranslateRequest {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/translate", self.endpoint))
            .json(&request)
            .send()
            .map_err(|e| WatchError::Translation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WatchError::Translation(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: TranslateResponse = response
            .json()
            .map_err(|e| WatchError::Translation(e.to_string()))?;

        Ok(body.translated_text)
    }
}

/// Returns the input unchanged. Used when no translation endpoint is
/// configured, and as the harmless capability in tests.
pub struct PassthroughTranslator;

impl Translate for PassthroughTranslator {
    fn translate(&self, text: &str, _source: &str, _target: &str) -> WatchResult<String> {
        Ok(text.to_string())
    }
}
