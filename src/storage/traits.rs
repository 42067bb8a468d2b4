use chrono::{DateTime, Utc};

use crate::domain::Settings;
use crate::errors::WatchResult;

#[cfg_attr(test, mockall::automock)]
pub trait SettingsRepository: Send + Sync {
    /// The singleton settings row, or None when the pipeline is unconfigured.
    fn get(&self) -> WatchResult<Option<Settings>>;
    /// Upsert the singleton row. The last-run timestamp is preserved.
    fn set(&self, settings: &Settings) -> WatchResult<()>;
    /// Stamp the end of a completed run.
    fn touch_last_run(&self, at: DateTime<Utc>) -> WatchResult<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait KeywordRepository: Send + Sync {
    /// Returns false when the keyword already exists.
    fn add(&self, keyword: &str) -> WatchResult<bool>;
    fn remove(&self, keyword: &str) -> WatchResult<()>;
    fn list(&self) -> WatchResult<Vec<String>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait SourceRepository: Send + Sync {
    /// Returns false when the source URL already exists.
    fn add(&self, url: &str) -> WatchResult<bool>;
    fn remove(&self, url: &str) -> WatchResult<()>;
    fn list(&self) -> WatchResult<Vec<String>>;
    fn exists(&self, url: &str) -> WatchResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
pub trait LedgerRepository: Send + Sync {
    fn is_delivered(&self, entry_url: &str) -> WatchResult<bool>;
    /// Insert-if-absent; marking an already-present URL is a no-op.
    fn mark_delivered(&self, entry_url: &str) -> WatchResult<()>;
}
