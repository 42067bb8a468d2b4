use serde::{Deserialize, Serialize};

/// One item from a polled feed. Transient: only the link survives a run,
/// as the key in the delivered-entries ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub link: String,
    pub title: String,
    pub summary: String,
}

impl FeedEntry {
    pub fn new(link: String, title: String) -> Self {
        Self {
            link,
            title,
            summary: String::new(),
        }
    }

    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = summary;
        self
    }

    /// Title and summary joined the way keyword matching sees them.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}
