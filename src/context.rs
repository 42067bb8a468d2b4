use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::errors::WatchResult;
use crate::fetch::HttpFeedFetcher;
use crate::localize::{HttpTranslator, Localizer, PassthroughTranslator, Translate};
use crate::services::{AdminService, PipelineService, SlackNotifier};
use crate::storage::sqlite::{
    SqliteKeywordRepository, SqliteLedgerRepository, SqliteSettingsRepository,
    SqliteSourceRepository, SqliteStorage,
};

pub type SqlitePipeline = PipelineService<
    SqliteSettingsRepository,
    SqliteKeywordRepository,
    SqliteSourceRepository,
    SqliteLedgerRepository,
>;

pub type SqliteAdmin =
    AdminService<SqliteSettingsRepository, SqliteKeywordRepository, SqliteSourceRepository>;

/// Process-lifetime wiring: one store handle, one pipeline, one admin
/// surface. Constructed once at startup and passed to command handlers.
pub struct AppContext {
    pub storage: SqliteStorage,
    pub admin: SqliteAdmin,
    pub pipeline: Arc<SqlitePipeline>,
}

impl AppContext {
    pub fn initialize(config: &Config) -> WatchResult<Self> {
        let storage = SqliteStorage::new(&config.db_path)?;

        let translator: Box<dyn Translate> = match &config.translate_url {
            Some(url) => Box::new(HttpTranslator::new(url, config.translate_api_key.clone())?),
            None => {
                debug!("no translation endpoint configured, summaries pass through untranslated");
                Box::new(PassthroughTranslator)
            }
        };
        let localizer = Localizer::new(
            translator,
            config.translate_source_lang.clone(),
            config.translate_target_lang.clone(),
        );

        let pipeline = Arc::new(PipelineService::new(
            SqliteSettingsRepository::new(storage.clone()),
            SqliteKeywordRepository::new(storage.clone()),
            SqliteSourceRepository::new(storage.clone()),
            SqliteLedgerRepository::new(storage.clone()),
            Box::new(HttpFeedFetcher::new()),
            localizer,
            Box::new(SlackNotifier::new()?),
        ));

        let admin = AdminService::new(
            SqliteSettingsRepository::new(storage.clone()),
            SqliteKeywordRepository::new(storage.clone()),
            SqliteSourceRepository::new(storage.clone()),
        );

        Ok(Self {
            storage,
            admin,
            pipeline,
        })
    }
}
