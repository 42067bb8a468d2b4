use chrono::{DateTime, Utc};

pub const DEFAULT_INTERVAL_MINUTES: u32 = 30;

/// Runtime pipeline configuration, stored as a singleton row.
/// Absence means the pipeline is unconfigured and must not run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub channel_token: String,
    pub channel_id: String,
    pub interval_minutes: u32,
    pub last_run_at: Option<DateTime<Utc>>,
}

impl Settings {
    pub fn new(channel_token: String, channel_id: String, interval_minutes: u32) -> Self {
        Self {
            channel_token,
            channel_id,
            interval_minutes,
            last_run_at: None,
        }
    }

    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.interval_minutes) * 60)
    }
}
