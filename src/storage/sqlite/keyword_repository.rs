use crate::errors::WatchResult;
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::KeywordRepository;

pub struct SqliteKeywordRepository {
    storage: SqliteStorage,
}

impl SqliteKeywordRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl KeywordRepository for SqliteKeywordRepository {
    fn add(&self, keyword: &str) -> WatchResult<bool> {
        let conn = self.storage.connection()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO keywords (keyword) VALUES (?1)",
            [keyword],
        )?;
        Ok(inserted > 0)
    }

    fn remove(&self, keyword: &str) -> WatchResult<()> {
        let conn = self.storage.connection()?;
        conn.execute("DELETE FROM keywords WHERE keyword = ?1", [keyword])?;
        Ok(())
    }

    fn list(&self) -> WatchResult<Vec<String>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare("SELECT keyword FROM keywords ORDER BY id")?;

        let keywords = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(keywords)
    }
}
