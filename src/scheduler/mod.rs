use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::errors::WatchError;
use crate::services::RunPipeline;

enum Command {
    Reconfigure(Duration),
    TriggerNow,
    Shutdown,
}

/// Cheap clonable handle for controlling a running scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: Sender<Command>,
}

impl SchedulerHandle {
    /// Replace the interval. The pending tick at the old cadence is
    /// abandoned; the next trigger fires one new interval from now.
    pub fn reconfigure(&self, interval: Duration) {
        let _ = self.tx.send(Command::Reconfigure(interval));
    }

    /// Run the pipeline outside the timer. Dropped by the run lock if a
    /// run is already in progress.
    pub fn trigger_now(&self) {
        let _ = self.tx.send(Command::TriggerNow);
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

/// Triggers pipeline runs on a recurring interval. One worker thread,
/// driven by a command channel; the timer is the channel receive timeout.
pub struct Scheduler {
    handle: SchedulerHandle,
    worker: JoinHandle<()>,
}

impl Scheduler {
    pub fn start<P: RunPipeline + 'static>(pipeline: Arc<P>, interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("feedwatch-scheduler".to_string())
            .spawn(move || worker_loop(pipeline, rx, interval))
            .expect("failed to spawn scheduler thread");

        Self {
            handle: SchedulerHandle { tx },
            worker,
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    /// Block until the worker exits. The handle stays alive for the
    /// duration, so the worker only stops on an explicit shutdown.
    pub fn join(self) {
        let _handle = self.handle;
        let _ = self.worker.join();
    }
}

fn worker_loop<P: RunPipeline>(pipeline: Arc<P>, rx: Receiver<Command>, mut interval: Duration) {
    info!(interval_secs = interval.as_secs(), "scheduler started");
    let mut deadline = Instant::now() + interval;

    loop {
        let timeout = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                attempt_run(pipeline.as_ref());
                deadline = Instant::now() + interval;
            }
            Ok(Command::Reconfigure(new_interval)) => {
                interval = new_interval;
                deadline = Instant::now() + interval;
                info!(interval_secs = interval.as_secs(), "scheduler reconfigured");
            }
            Ok(Command::TriggerNow) => {
                // Manual runs do not move the timer deadline.
                attempt_run(pipeline.as_ref());
            }
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                info!("scheduler stopped");
                break;
            }
        }
    }
}

fn attempt_run<P: RunPipeline>(pipeline: &P) {
    match pipeline.try_run() {
        Ok(Some(_)) => {}
        Ok(None) => debug!("previous run still in progress, trigger dropped"),
        Err(WatchError::ConfigMissing) => warn!("pipeline not configured, run skipped"),
        Err(e) => error!(error = %e, "pipeline run failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::errors::WatchResult;
    use crate::services::RunReport;

    struct CountingPipeline {
        runs: AtomicUsize,
    }

    impl CountingPipeline {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                runs: AtomicUsize::new(0),
            })
        }

        fn count(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    impl RunPipeline for CountingPipeline {
        fn try_run(&self) -> WatchResult<Option<RunReport>> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(Some(RunReport::default()))
        }
    }

    #[test]
    fn timer_triggers_runs_at_the_configured_interval() {
        let pipeline = CountingPipeline::new();
        let scheduler = Scheduler::start(Arc::clone(&pipeline), Duration::from_millis(50));

        thread::sleep(Duration::from_millis(500));
        scheduler.handle().shutdown();
        scheduler.join();

        assert!(pipeline.count() >= 2, "expected >=2 runs, got {}", pipeline.count());
    }

    #[test]
    fn first_run_waits_one_full_interval() {
        let pipeline = CountingPipeline::new();
        let scheduler = Scheduler::start(Arc::clone(&pipeline), Duration::from_secs(3600));

        thread::sleep(Duration::from_millis(100));
        assert_eq!(pipeline.count(), 0);

        scheduler.handle().shutdown();
        scheduler.join();
    }

    #[test]
    fn trigger_now_runs_without_waiting_for_the_timer() {
        let pipeline = CountingPipeline::new();
        let scheduler = Scheduler::start(Arc::clone(&pipeline), Duration::from_secs(3600));

        scheduler.handle().trigger_now();

        let deadline = Instant::now() + Duration::from_secs(5);
        while pipeline.count() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(pipeline.count(), 1);

        scheduler.handle().shutdown();
        scheduler.join();
    }

    #[test]
    fn reconfigure_replaces_the_cadence_before_the_next_trigger() {
        let pipeline = CountingPipeline::new();
        let scheduler = Scheduler::start(Arc::clone(&pipeline), Duration::from_secs(3600));

        // Nothing fires at the (long) original interval.
        thread::sleep(Duration::from_millis(50));
        assert_eq!(pipeline.count(), 0);

        scheduler.handle().reconfigure(Duration::from_millis(50));

        let deadline = Instant::now() + Duration::from_secs(5);
        while pipeline.count() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(pipeline.count() >= 1, "new interval never fired");

        scheduler.handle().shutdown();
        scheduler.join();
    }

    #[test]
    fn shutdown_stops_the_timer() {
        let pipeline = CountingPipeline::new();
        let scheduler = Scheduler::start(Arc::clone(&pipeline), Duration::from_millis(30));

        scheduler.handle().shutdown();
        scheduler.join();

        let stopped_at = pipeline.count();
        thread::sleep(Duration::from_millis(150));
        assert_eq!(pipeline.count(), stopped_at);
    }
}
