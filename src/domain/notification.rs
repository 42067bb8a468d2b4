use super::FeedEntry;

/// A delivery-ready message for one matched entry.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub matched_keywords: Vec<String>,
}

impl Notification {
    pub fn from_entry(entry: &FeedEntry, summary: String, matched_keywords: Vec<String>) -> Self {
        Self {
            title: entry.title.clone(),
            link: entry.link.clone(),
            summary,
            matched_keywords,
        }
    }

    /// Slack mrkdwn body: title, URL, summary and the keywords that matched.
    pub fn format(&self) -> String {
        format!(
            "*Title:* {}\n*URL:* {}\n*Summary:* {}\n*Matched keywords:* {}",
            self.title,
            self.link,
            self.summary,
            self.matched_keywords.join(", ")
        )
    }
}
