//! Fixed-interval scheduler for reconciliation cycles.
//!
//! `Idle -> Running -> (Succeeded | Failed) -> Idle`, forever:
//! - the first cycle starts immediately, then one per interval tick;
//! - a tick that fires while a cycle is still running is skipped, never queued;
//! - a failed (or panicking) cycle is logged and the loop carries on;
//! - on shutdown an in-flight cycle is allowed to finish.
//!
//! Cycles are blocking, so each runs on tokio's blocking pool. The engine is
//! moved into the cycle task and handed back when it ends, which is what
//! makes two overlapping cycles impossible.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use revtrack_core::{DocumentSource, TrackingStore};

use crate::cycle::{CycleReport, SyncEngine};
use crate::error::SyncError;

type CycleResult = Result<CycleReport, SyncError>;

/// Scheduler bookkeeping. Owned by [`SyncScheduler`]; only readable outside it.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    last_cycle_start: Option<DateTime<Utc>>,
    is_running: bool,
    succeeded: u64,
    failed: u64,
    skipped_ticks: u64,
    last_error: Option<String>,
    last_report: Option<CycleReport>,
}

impl SchedulerState {
    #[must_use]
    pub fn last_cycle_start(&self) -> Option<DateTime<Utc>> {
        self.last_cycle_start
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    #[must_use]
    pub fn succeeded(&self) -> u64 {
        self.succeeded
    }

    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed
    }

    #[must_use]
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped_ticks
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn last_report(&self) -> Option<&CycleReport> {
        self.last_report.as_ref()
    }

    fn begin(&mut self, at: DateTime<Utc>) {
        self.last_cycle_start = Some(at);
        self.is_running = true;
    }

    fn finish(&mut self, result: CycleResult) {
        self.is_running = false;
        match result {
            Ok(report) => {
                self.succeeded += 1;
                self.last_report = Some(report);
            }
            Err(e) => {
                self.failed += 1;
                self.last_error = Some(e.to_string());
            }
        }
    }
}

/// Drives a [`SyncEngine`] on a fixed interval.
pub struct SyncScheduler<S, T> {
    engine: Option<SyncEngine<S, T>>,
    interval: Duration,
    state: SchedulerState,
}

impl<S, T> SyncScheduler<S, T>
where
    S: DocumentSource + Send + 'static,
    T: TrackingStore + Send + 'static,
{
    pub fn new(engine: SyncEngine<S, T>, interval: Duration) -> Self {
        Self {
            engine: Some(engine),
            interval,
            state: SchedulerState::default(),
        }
    }

    /// Run until `shutdown` resolves, then wait for any in-flight cycle.
    ///
    /// Returns the final state.
    pub async fn run<F>(mut self, shutdown: F) -> SchedulerState
    where
        F: Future<Output = ()>,
    {
        let (done_tx, mut done_rx) = mpsc::channel::<(SyncEngine<S, T>, CycleResult)>(1);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            interval_secs = self.interval.as_secs(),
            "sync scheduler started"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => self.on_tick(&done_tx),
                Some((engine, result)) = done_rx.recv() => {
                    self.engine = Some(engine);
                    complete(&mut self.state, result);
                }
            }
        }

        if self.state.is_running {
            info!("shutdown requested, waiting for the running cycle to finish");
            if let Some((engine, result)) = done_rx.recv().await {
                self.engine = Some(engine);
                complete(&mut self.state, result);
            }
        }
        info!(
            succeeded = self.state.succeeded,
            failed = self.state.failed,
            skipped_ticks = self.state.skipped_ticks,
            "sync scheduler stopped"
        );
        self.state
    }

    fn on_tick(&mut self, done: &mpsc::Sender<(SyncEngine<S, T>, CycleResult)>) {
        let engine = match self.engine.take() {
            Some(engine) if !self.state.is_running => engine,
            other => {
                self.engine = other;
                self.state.skipped_ticks += 1;
                warn!(
                    started_at = ?self.state.last_cycle_start,
                    "previous cycle still running, skipping this tick"
                );
                return;
            }
        };

        self.state.begin(Utc::now());
        let done = done.clone();
        tokio::task::spawn_blocking(move || {
            let mut engine = engine;
            let result = match panic::catch_unwind(AssertUnwindSafe(|| engine.run_cycle())) {
                Ok(outcome) => outcome.map_err(SyncError::from),
                Err(payload) => Err(SyncError::Panicked(panic_message(payload.as_ref()))),
            };
            // The receiver only goes away once the scheduler has stopped.
            let _ = done.blocking_send((engine, result));
        });
    }
}

fn complete(state: &mut SchedulerState, result: CycleResult) {
    if let Err(e) = &result {
        error!(error = %e, started_at = ?state.last_cycle_start, "sync cycle failed, retrying at next tick");
    }
    state.finish(result);
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
