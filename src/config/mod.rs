use crate::errors::WatchResult;

/// Process-level configuration loaded from the environment.
///
/// Slack token, channel and poll interval are runtime state and live in the
/// database (see `storage::SettingsRepository`); only the database location
/// and the translation capability are wired through the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub translate_url: Option<String>,
    pub translate_api_key: Option<String>,
    pub translate_source_lang: String,
    pub translate_target_lang: String,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> WatchResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        // Default db_path is relative to executable directory
        let db_path = std::env::var("FEEDWATCH_DB_PATH").unwrap_or_else(|_| {
            exe_dir
                .map(|d| d.join("feedwatch.db").to_string_lossy().into_owned())
                .unwrap_or_else(|| "./feedwatch.db".to_string())
        });

        let translate_url = std::env::var("TRANSLATE_URL").ok().filter(|s| !s.is_empty());
        let translate_api_key = std::env::var("TRANSLATE_API_KEY")
            .ok()
            .filter(|s| !s.is_empty());

        let translate_source_lang =
            std::env::var("TRANSLATE_SOURCE_LANG").unwrap_or_else(|_| "en".to_string());
        let translate_target_lang =
            std::env::var("TRANSLATE_TARGET_LANG").unwrap_or_else(|_| "ja".to_string());

        Ok(Self {
            db_path,
            translate_url,
            translate_api_key,
            translate_source_lang,
            translate_target_lang,
        })
    }
}
