use crate::errors::WatchResult;
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::SourceRepository;

pub struct SqliteSourceRepository {
    storage: SqliteStorage,
}

impl SqliteSourceRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl SourceRepository for SqliteSourceRepository {
    fn add(&self, url: &str) -> WatchResult<bool> {
        let conn = self.storage.connection()?;
        let inserted = conn.execute("INSERT OR IGNORE INTO sources (url) VALUES (?1)", [url])?;
        Ok(inserted > 0)
    }

    fn remove(&self, url: &str) -> WatchResult<()> {
        let conn = self.storage.connection()?;
        conn.execute("DELETE FROM sources WHERE url = ?1", [url])?;
        Ok(())
    }

    // Insertion order, which is also the polling order for a run.
    fn list(&self) -> WatchResult<Vec<String>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare("SELECT url FROM sources ORDER BY id")?;

        let sources = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sources)
    }

    fn exists(&self, url: &str) -> WatchResult<bool> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM sources WHERE url = ?1)")?;
        let exists: bool = stmt.query_row([url], |row| row.get(0))?;
        Ok(exists)
    }
}
