use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::errors::{WatchError, WatchResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    id INTEGER PRIMARY KEY,
    channel_token TEXT NOT NULL,
    channel_id TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS keywords (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    keyword TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS delivered_entries (
    url TEXT PRIMARY KEY,
    delivered_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_keywords_keyword ON keywords(keyword);
CREATE INDEX IF NOT EXISTS idx_sources_url ON sources(url);
"#;

#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> WatchResult<Self> {
        let conn = Connection::open(path)?;
        Self::initialize(conn)
    }

    pub fn in_memory() -> WatchResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> WatchResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Self::migrate_settings(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Additive settings migration: databases created before the scheduler
    /// columns existed gain them with defaults, existing rows untouched.
    fn migrate_settings(conn: &Connection) -> WatchResult<()> {
        let mut stmt = conn.prepare("PRAGMA table_info(settings)")?;
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        if !columns.iter().any(|c| c == "schedule_interval") {
            conn.execute_batch(
                "ALTER TABLE settings ADD COLUMN schedule_interval INTEGER NOT NULL DEFAULT 30",
            )?;
        }
        if !columns.iter().any(|c| c == "last_run_at") {
            conn.execute_batch("ALTER TABLE settings ADD COLUMN last_run_at TEXT")?;
        }

        Ok(())
    }

    pub fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, WatchError> {
        self.conn
            .lock()
            .map_err(|_| WatchError::Database(rusqlite::Error::InvalidQuery))
    }
}
