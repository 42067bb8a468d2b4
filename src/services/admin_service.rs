use std::time::Duration;

use url::Url;

use crate::domain::Settings;
use crate::errors::{WatchError, WatchResult};
use crate::scheduler::SchedulerHandle;
use crate::storage::traits::{KeywordRepository, SettingsRepository, SourceRepository};

/// The administrative surface: settings, keyword and source management.
/// Input validation happens here, so nothing blank or malformed reaches
/// the store.
pub struct AdminService<S, K, R>
where
    S: SettingsRepository,
    K: KeywordRepository,
    R: SourceRepository,
{
    settings_repo: S,
    keyword_repo: K,
    source_repo: R,
    scheduler: Option<SchedulerHandle>,
}

impl<S, K, R> AdminService<S, K, R>
where
    S: SettingsRepository,
    K: KeywordRepository,
    R: SourceRepository,
{
    pub fn new(settings_repo: S, keyword_repo: K, source_repo: R) -> Self {
        Self {
            settings_repo,
            keyword_repo,
            source_repo,
            scheduler: None,
        }
    }

    /// Attach a scheduler so settings updates retune the poll interval
    /// in the running process.
    pub fn with_scheduler(mut self, handle: SchedulerHandle) -> Self {
        self.scheduler = Some(handle);
        self
    }

    pub fn get_settings(&self) -> WatchResult<Option<Settings>> {
        self.settings_repo.get()
    }

    pub fn set_settings(
        &self,
        channel_token: &str,
        channel_id: &str,
        interval_minutes: u32,
    ) -> WatchResult<()> {
        if channel_token.trim().is_empty() {
            return Err(WatchError::InvalidInput("channel token is empty".to_string()));
        }
        if channel_id.trim().is_empty() {
            return Err(WatchError::InvalidInput("channel id is empty".to_string()));
        }
        if interval_minutes == 0 {
            return Err(WatchError::InvalidInput(
                "interval must be at least one minute".to_string(),
            ));
        }

        let settings = Settings::new(
            channel_token.trim().to_string(),
            channel_id.trim().to_string(),
            interval_minutes,
        );
        self.settings_repo.set(&settings)?;

        if let Some(scheduler) = &self.scheduler {
            scheduler.reconfigure(Duration::from_secs(u64::from(interval_minutes) * 60));
        }

        Ok(())
    }

    /// Returns false when the keyword already exists.
    pub fn add_keyword(&self, keyword: &str) -> WatchResult<bool> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(WatchError::InvalidInput("keyword is empty".to_string()));
        }
        self.keyword_repo.add(keyword)
    }

    pub fn remove_keyword(&self, keyword: &str) -> WatchResult<()> {
        self.keyword_repo.remove(keyword.trim())
    }

    pub fn list_keywords(&self) -> WatchResult<Vec<String>> {
        self.keyword_repo.list()
    }

    /// Returns false when the source URL already exists.
    pub fn add_source(&self, url: &str) -> WatchResult<bool> {
        let url = url.trim();
        let parsed = Url::parse(url).map_err(|e| WatchError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(WatchError::InvalidUrl(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }
        self.source_repo.add(url)
    }

    pub fn remove_source(&self, url: &str) -> WatchResult<()> {
        self.source_repo.remove(url.trim())
    }

    pub fn list_sources(&self) -> WatchResult<Vec<String>> {
        self.source_repo.list()
    }
}
