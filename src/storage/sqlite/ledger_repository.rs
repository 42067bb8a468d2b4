use crate::errors::WatchResult;
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::LedgerRepository;

pub struct SqliteLedgerRepository {
    storage: SqliteStorage,
}

impl SqliteLedgerRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl LedgerRepository for SqliteLedgerRepository {
    fn is_delivered(&self, entry_url: &str) -> WatchResult<bool> {
        let conn = self.storage.connection()?;
        let mut stmt =
            conn.prepare("SELECT EXISTS(SELECT 1 FROM delivered_entries WHERE url = ?1)")?;
        let exists: bool = stmt.query_row([entry_url], |row| row.get(0))?;
        Ok(exists)
    }

    fn mark_delivered(&self, entry_url: &str) -> WatchResult<()> {
        let conn = self.storage.connection()?;
        conn.execute(
            "INSERT OR IGNORE INTO delivered_entries (url) VALUES (?1)",
            [entry_url],
        )?;
        Ok(())
    }
}
