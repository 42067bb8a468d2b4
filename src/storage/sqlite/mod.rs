mod connection;
mod settings_repository;
mod keyword_repository;
mod source_repository;
mod ledger_repository;

pub use connection::SqliteStorage;
pub use settings_repository::SqliteSettingsRepository;
pub use keyword_repository::SqliteKeywordRepository;
pub use source_repository::SqliteSourceRepository;
pub use ledger_repository::SqliteLedgerRepository;
