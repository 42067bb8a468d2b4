use chrono::{DateTime, Utc};

use crate::domain::Settings;
use crate::errors::{WatchError, WatchResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::SettingsRepository;

pub struct SqliteSettingsRepository {
    storage: SqliteStorage,
}

impl SqliteSettingsRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl SettingsRepository for SqliteSettingsRepository {
    fn get(&self) -> WatchResult<Option<Settings>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT channel_token, channel_id, schedule_interval, last_run_at FROM settings WHERE id = 1",
        )?;

        let settings = stmt.query_row([], |row| {
            let interval: i64 = row.get(2)?;
            let last_run: Option<String> = row.get(3)?;

            Ok(Settings {
                channel_token: row.get(0)?,
                channel_id: row.get(1)?,
                interval_minutes: interval.max(1) as u32,
                // Unparseable legacy values read back as None rather than failing.
                last_run_at: last_run.as_deref().and_then(parse_timestamp),
            })
        });

        match settings {
            Ok(s) => Ok(Some(s)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(WatchError::from(e)),
        }
    }

    fn set(&self, settings: &Settings) -> WatchResult<()> {
        let conn = self.storage.connection()?;
        conn.execute(
            "INSERT INTO settings (id, channel_token, channel_id, schedule_interval)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                 channel_token = excluded.channel_token,
                 channel_id = excluded.channel_id,
                 schedule_interval = excluded.schedule_interval",
            (
                &settings.channel_token,
                &settings.channel_id,
                i64::from(settings.interval_minutes),
            ),
        )?;
        Ok(())
    }

    fn touch_last_run(&self, at: DateTime<Utc>) -> WatchResult<()> {
        let conn = self.storage.connection()?;
        conn.execute(
            "UPDATE settings SET last_run_at = ?1 WHERE id = 1",
            [at.to_rfc3339()],
        )?;
        Ok(())
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
