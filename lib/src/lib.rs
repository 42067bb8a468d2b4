//! Slack Web API bindings for Rust
//! Provides a minimal client to post text messages to a channel via chat.postMessage

use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_API_URL: &str = "https://slack.com/api";

#[derive(Error, Debug)]
pub enum SlackError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Slack API rejected the message: {0}")]
    Api(String),
    #[error("Invalid token")]
    InvalidToken,
}

#[derive(Debug, Serialize)]
struct PostMessagePayload<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct SlackClient {
    url: String,
    client: Client,
}

impl SlackClient {
    pub fn new() -> Result<Self, SlackError> {
        Self::with_base_url(DEFAULT_API_URL)
    }

    /// Build a client against a non-default API root (used by tests)
    pub fn with_base_url(url: &str) -> Result<Self, SlackError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Post a text message to a channel. The token is passed per call because
    /// it comes from runtime configuration, not process environment.
    pub fn send_message(
        &self,
        token: &str,
        channel: &str,
        text: &str,
    ) -> Result<(), SlackError> {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| SlackError::InvalidToken)?;

        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.url))
            .header(AUTHORIZATION, bearer)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&PostMessagePayload { channel, text })
            .send()?;

        let body: PostMessageResponse = response.json()?;

        if !body.ok {
            return Err(SlackError::Api(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(())
    }
}
