use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    // Configuration errors
    #[error("Pipeline is not configured (no settings stored)")]
    ConfigMissing,

    // Feed errors
    #[error("Invalid source URL: {0}")]
    InvalidUrl(String),

    #[error("Feed fetch failed: {0}")]
    Fetch(String),

    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    #[error("OPML parsing failed: {0}")]
    OpmlParse(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // Translation errors
    #[error("Translation failed: {0}")]
    Translation(String),

    // Delivery errors
    #[error("Delivery failed: {0}")]
    Delivery(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<slack::SlackError> for WatchError {
    fn from(err: slack::SlackError) -> Self {
        WatchError::Delivery(err.to_string())
    }
}

pub type WatchResult<T> = Result<T, WatchError>;
