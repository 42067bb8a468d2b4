use std::sync::{Mutex, TryLockError};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::domain::Notification;
use crate::errors::{WatchError, WatchResult};
use crate::fetch::FetchEntries;
use crate::filter;
use crate::localize::Localizer;
use crate::services::notification_service::Notify;
use crate::storage::traits::{
    KeywordRepository, LedgerRepository, SettingsRepository, SourceRepository,
};

/// Counters for one completed run, surfaced in logs and by the CLI.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub sources_polled: usize,
    pub sources_failed: usize,
    pub entries_evaluated: usize,
    pub entries_skipped: usize,
    pub matched: usize,
    pub delivered: usize,
    pub delivery_failures: usize,
}

/// The run entry point shared by the scheduler and the manual trigger.
#[cfg_attr(test, mockall::automock)]
pub trait RunPipeline: Send + Sync {
    /// Attempt one run. `Ok(None)` means a run was already in progress and
    /// this trigger was dropped.
    fn try_run(&self) -> WatchResult<Option<RunReport>>;
}

pub struct PipelineService<S, K, R, L>
where
    S: SettingsRepository,
    K: KeywordRepository,
    R: SourceRepository,
    L: LedgerRepository,
{
    settings_repo: S,
    keyword_repo: K,
    source_repo: R,
    ledger_repo: L,
    fetcher: Box<dyn FetchEntries>,
    localizer: Localizer,
    notifier: Box<dyn Notify>,
    run_lock: Mutex<()>,
}

impl<S, K, R, L> PipelineService<S, K, R, L>
where
    S: SettingsRepository,
    K: KeywordRepository,
    R: SourceRepository,
    L: LedgerRepository,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings_repo: S,
        keyword_repo: K,
        source_repo: R,
        ledger_repo: L,
        fetcher: Box<dyn FetchEntries>,
        localizer: Localizer,
        notifier: Box<dyn Notify>,
    ) -> Self {
        Self {
            settings_repo,
            keyword_repo,
            source_repo,
            ledger_repo,
            fetcher,
            localizer,
            notifier,
            run_lock: Mutex::new(()),
        }
    }

    /// One full run: load config, fetch every source, evaluate every entry,
    /// then deliver the queued matches and stamp the run timestamp.
    ///
    /// Per-source and per-entry failures are contained; only a missing
    /// configuration (or a storage failure) aborts the run.
    fn run(&self) -> WatchResult<RunReport> {
        let settings = self.settings_repo.get()?.ok_or(WatchError::ConfigMissing)?;
        let keywords = self.keyword_repo.list()?;
        let sources = self.source_repo.list()?;

        info!(
            sources = sources.len(),
            keywords = keywords.len(),
            "feed run started"
        );

        let mut report = RunReport::default();
        let mut queued: Vec<Notification> = Vec::new();

        for source_url in &sources {
            let entries = match self.fetcher.fetch(source_url) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(source = %source_url, error = %e, "source fetch failed, skipping");
                    report.sources_failed += 1;
                    continue;
                }
            };
            report.sources_polled += 1;

            for entry in entries {
                if self.ledger_repo.is_delivered(&entry.link)? {
                    report.entries_skipped += 1;
                    continue;
                }
                report.entries_evaluated += 1;

                let combined = entry.combined_text();
                let matched: Vec<String> = filter::matching_keywords(&combined, &keywords)
                    .into_iter()
                    .map(str::to_string)
                    .collect();

                if !matched.is_empty() {
                    let summary = self.localizer.localize_summary(&combined, &entry.summary);
                    queued.push(Notification::from_entry(&entry, summary, matched));
                }

                // Marked before any delivery, matched and unmatched alike:
                // each entry is evaluated at most once, even if a later step
                // of this run fails. A crash here loses messages rather than
                // duplicating them.
                self.ledger_repo.mark_delivered(&entry.link)?;
            }
        }

        report.matched = queued.len();

        // Deliver only after every source has been evaluated.
        for notification in &queued {
            match self.notifier.send(
                &settings.channel_token,
                &settings.channel_id,
                &notification.format(),
            ) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    error!(entry = %notification.link, error = %e, "delivery failed");
                    report.delivery_failures += 1;
                }
            }
        }

        // Reaching this point counts as a completed run, partial per-source
        // failures included.
        self.settings_repo.touch_last_run(Utc::now())?;

        info!(
            polled = report.sources_polled,
            failed = report.sources_failed,
            evaluated = report.entries_evaluated,
            skipped = report.entries_skipped,
            matched = report.matched,
            delivered = report.delivered,
            delivery_failures = report.delivery_failures,
            "feed run finished"
        );

        Ok(report)
    }
}

impl<S, K, R, L> RunPipeline for PipelineService<S, K, R, L>
where
    S: SettingsRepository,
    K: KeywordRepository,
    R: SourceRepository,
    L: LedgerRepository,
{
    fn try_run(&self) -> WatchResult<Option<RunReport>> {
        let _guard = match self.run_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                debug!("run already in progress, trigger dropped");
                return Ok(None);
            }
            // A previous run panicked mid-flight; the ledger state is still
            // consistent (mark-before-deliver), so keep running.
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        self.run().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{Receiver, Sender};
    use std::sync::{Arc, Mutex as StdMutex};

    use crate::domain::{FeedEntry, Settings};
    use crate::fetch::MockFetchEntries;
    use crate::localize::{Localizer, PassthroughTranslator};
    use crate::storage::sqlite::{
        SqliteKeywordRepository, SqliteLedgerRepository, SqliteSettingsRepository,
        SqliteSourceRepository, SqliteStorage,
    };
    use crate::storage::traits::{
        KeywordRepository as _, LedgerRepository as _, SettingsRepository as _,
        SourceRepository as _,
    };

    type SqlitePipeline = PipelineService<
        SqliteSettingsRepository,
        SqliteKeywordRepository,
        SqliteSourceRepository,
        SqliteLedgerRepository,
    >;

    /// Records every delivered message; optionally fails deliveries whose
    /// text contains a marker.
    struct RecordingNotifier {
        sent: Arc<StdMutex<Vec<String>>>,
        fail_containing: Option<String>,
    }

    impl Notify for RecordingNotifier {
        fn send(&self, _token: &str, _channel: &str, text: &str) -> WatchResult<()> {
            if let Some(marker) = &self.fail_containing {
                if text.contains(marker.as_str()) {
                    return Err(WatchError::Delivery("simulated failure".to_string()));
                }
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct Fixture {
        storage: SqliteStorage,
        sent: Arc<StdMutex<Vec<String>>>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                storage: SqliteStorage::in_memory().unwrap(),
                sent: Arc::new(StdMutex::new(Vec::new())),
            }
        }

        fn settings_repo(&self) -> SqliteSettingsRepository {
            SqliteSettingsRepository::new(self.storage.clone())
        }

        fn keyword_repo(&self) -> SqliteKeywordRepository {
            SqliteKeywordRepository::new(self.storage.clone())
        }

        fn source_repo(&self) -> SqliteSourceRepository {
            SqliteSourceRepository::new(self.storage.clone())
        }

        fn ledger_repo(&self) -> SqliteLedgerRepository {
            SqliteLedgerRepository::new(self.storage.clone())
        }

        fn configure(&self) {
            self.settings_repo()
                .set(&Settings::new("xoxb-test".to_string(), "C123".to_string(), 30))
                .unwrap();
        }

        fn pipeline(
            &self,
            fetcher: Box<dyn FetchEntries>,
            fail_containing: Option<String>,
        ) -> SqlitePipeline {
            let notifier = RecordingNotifier {
                sent: self.sent.clone(),
                fail_containing,
            };
            PipelineService::new(
                self.settings_repo(),
                self.keyword_repo(),
                self.source_repo(),
                self.ledger_repo(),
                fetcher,
                Localizer::new(Box::new(PassthroughTranslator), "en".into(), "ja".into()),
                Box::new(notifier),
            )
        }
    }

    fn entry(link: &str, title: &str, summary: &str) -> FeedEntry {
        FeedEntry::new(link.to_string(), title.to_string()).with_summary(summary.to_string())
    }

    #[test]
    fn first_run_delivers_match_second_run_delivers_nothing() {
        let fixture = Fixture::new();
        fixture.configure();
        fixture.keyword_repo().add("security").unwrap();
        fixture
            .source_repo()
            .add("https://example.com/feed.xml")
            .unwrap();

        let mut fetcher = MockFetchEntries::new();
        fetcher
            .expect_fetch()
            .times(2)
            .returning(|_| Ok(vec![entry("a", "Security patch", "security fix")]));

        let pipeline = fixture.pipeline(Box::new(fetcher), None);

        let first = pipeline.try_run().unwrap().unwrap();
        assert_eq!(first.matched, 1);
        assert_eq!(first.delivered, 1);
        {
            let sent = fixture.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert!(sent[0].contains("a"));
            assert!(sent[0].contains("security"));
        }
        assert!(fixture.ledger_repo().is_delivered("a").unwrap());

        let second = pipeline.try_run().unwrap().unwrap();
        assert_eq!(second.delivered, 0);
        assert_eq!(second.entries_skipped, 1);
        assert_eq!(fixture.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn unmatched_entries_are_marked_but_not_delivered() {
        let fixture = Fixture::new();
        fixture.configure();
        fixture.keyword_repo().add("security").unwrap();
        fixture
            .source_repo()
            .add("https://example.com/feed.xml")
            .unwrap();

        let mut fetcher = MockFetchEntries::new();
        fetcher
            .expect_fetch()
            .returning(|_| Ok(vec![entry("b", "Weather report", "sunny")]));

        let pipeline = fixture.pipeline(Box::new(fetcher), None);
        let report = pipeline.try_run().unwrap().unwrap();

        assert_eq!(report.matched, 0);
        assert_eq!(report.delivered, 0);
        assert!(fixture.sent.lock().unwrap().is_empty());
        assert!(fixture.ledger_repo().is_delivered("b").unwrap());
    }

    #[test]
    fn unconfigured_pipeline_aborts_before_any_mutation() {
        let fixture = Fixture::new();
        fixture
            .source_repo()
            .add("https://example.com/feed.xml")
            .unwrap();

        let mut fetcher = MockFetchEntries::new();
        fetcher.expect_fetch().never();

        let pipeline = fixture.pipeline(Box::new(fetcher), None);
        let result = pipeline.try_run();

        assert!(matches!(result, Err(WatchError::ConfigMissing)));

        let conn = fixture.storage.connection().unwrap();
        let ledger_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM delivered_entries", [], |row| row.get(0))
            .unwrap();
        assert_eq!(ledger_rows, 0);
    }

    #[test]
    fn fetch_failure_skips_source_and_continues() {
        let fixture = Fixture::new();
        fixture.configure();
        fixture.keyword_repo().add("security").unwrap();
        fixture.source_repo().add("https://down.example.com/feed").unwrap();
        fixture.source_repo().add("https://up.example.com/feed").unwrap();

        let mut fetcher = MockFetchEntries::new();
        fetcher
            .expect_fetch()
            .withf(|url| url.contains("down"))
            .returning(|_| Err(WatchError::Fetch("connection refused".to_string())));
        fetcher
            .expect_fetch()
            .withf(|url| url.contains("up"))
            .returning(|_| Ok(vec![entry("c", "security fix", "patched")]));

        let pipeline = fixture.pipeline(Box::new(fetcher), None);
        let report = pipeline.try_run().unwrap().unwrap();

        assert_eq!(report.sources_failed, 1);
        assert_eq!(report.sources_polled, 1);
        assert_eq!(report.delivered, 1);
        assert!(fixture.ledger_repo().is_delivered("c").unwrap());
    }

    #[test]
    fn delivery_failure_does_not_block_later_entries() {
        let fixture = Fixture::new();
        fixture.configure();
        fixture.keyword_repo().add("security").unwrap();
        fixture
            .source_repo()
            .add("https://example.com/feed.xml")
            .unwrap();

        let mut fetcher = MockFetchEntries::new();
        fetcher.expect_fetch().returning(|_| {
            Ok(vec![
                entry("a", "security alpha", "first"),
                entry("b", "security beta", "second"),
            ])
        });

        let pipeline = fixture.pipeline(Box::new(fetcher), Some("alpha".to_string()));
        let report = pipeline.try_run().unwrap().unwrap();

        assert_eq!(report.matched, 2);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.delivery_failures, 1);

        let sent = fixture.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("beta"));
        drop(sent);

        // Both entries are in the ledger regardless of delivery outcome.
        assert!(fixture.ledger_repo().is_delivered("a").unwrap());
        assert!(fixture.ledger_repo().is_delivered("b").unwrap());
    }

    #[test]
    fn run_stamps_last_run_even_with_partial_failures() {
        let fixture = Fixture::new();
        fixture.configure();
        fixture.source_repo().add("https://down.example.com/feed").unwrap();

        let mut fetcher = MockFetchEntries::new();
        fetcher
            .expect_fetch()
            .returning(|_| Err(WatchError::Fetch("timeout".to_string())));

        let pipeline = fixture.pipeline(Box::new(fetcher), None);
        pipeline.try_run().unwrap().unwrap();

        let settings = fixture.settings_repo().get().unwrap().unwrap();
        assert!(settings.last_run_at.is_some());
    }

    #[test]
    fn unconfigured_run_leaves_last_run_unset() {
        let fixture = Fixture::new();

        let mut fetcher = MockFetchEntries::new();
        fetcher.expect_fetch().never();

        let pipeline = fixture.pipeline(Box::new(fetcher), None);
        assert!(pipeline.try_run().is_err());

        assert!(fixture.settings_repo().get().unwrap().is_none());
    }

    #[test]
    fn evaluation_happens_for_all_sources_before_any_delivery() {
        let fixture = Fixture::new();
        fixture.configure();
        fixture.keyword_repo().add("security").unwrap();
        fixture.source_repo().add("https://one.example.com/feed").unwrap();
        fixture.source_repo().add("https://two.example.com/feed").unwrap();

        let mut fetcher = MockFetchEntries::new();
        fetcher
            .expect_fetch()
            .withf(|url| url.contains("one"))
            .returning(|_| Ok(vec![entry("a", "security one", "s1")]));
        fetcher
            .expect_fetch()
            .withf(|url| url.contains("two"))
            .returning(|_| Ok(vec![entry("b", "security two", "s2")]));

        let pipeline = fixture.pipeline(Box::new(fetcher), None);
        let report = pipeline.try_run().unwrap().unwrap();

        // Both sources contributed to the same delivery phase.
        assert_eq!(report.matched, 2);
        assert_eq!(report.delivered, 2);
        let sent = fixture.sent.lock().unwrap();
        assert!(sent[0].contains("one"));
        assert!(sent[1].contains("two"));
    }

    /// Blocks inside fetch until released, so a second trigger can observe
    /// the run lock being held.
    struct GatedFetcher {
        entered: StdMutex<Sender<()>>,
        gate: StdMutex<Receiver<()>>,
    }

    impl FetchEntries for GatedFetcher {
        fn fetch(&self, _url: &str) -> WatchResult<Vec<FeedEntry>> {
            self.entered.lock().unwrap().send(()).unwrap();
            self.gate.lock().unwrap().recv().ok();
            Ok(Vec::new())
        }
    }

    #[test]
    fn concurrent_trigger_is_dropped_while_run_in_progress() {
        let fixture = Fixture::new();
        fixture.configure();
        fixture
            .source_repo()
            .add("https://example.com/feed.xml")
            .unwrap();

        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();

        let fetcher = GatedFetcher {
            entered: StdMutex::new(entered_tx),
            gate: StdMutex::new(release_rx),
        };

        let pipeline = Arc::new(fixture.pipeline(Box::new(fetcher), None));

        let background = {
            let pipeline = Arc::clone(&pipeline);
            std::thread::spawn(move || pipeline.try_run())
        };

        // Wait until the background run is inside the fetch phase.
        entered_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("background run should start");

        // A trigger arriving mid-run is dropped, not queued.
        let dropped = pipeline.try_run().unwrap();
        assert!(dropped.is_none());

        release_tx.send(()).unwrap();
        let finished = background.join().unwrap().unwrap();
        assert!(finished.is_some());
    }
}
