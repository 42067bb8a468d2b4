pub mod traits;
pub mod sqlite;

pub use traits::{KeywordRepository, LedgerRepository, SettingsRepository, SourceRepository};
pub use sqlite::{
    SqliteKeywordRepository, SqliteLedgerRepository, SqliteSettingsRepository,
    SqliteSourceRepository, SqliteStorage,
};
