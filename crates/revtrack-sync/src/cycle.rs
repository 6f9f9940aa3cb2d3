//! One reconciliation cycle: scan, read, merge, write.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use revtrack_core::reconcile::ReconcileStats;
use revtrack_core::{reconcile, DocumentSource, Result, TrackingStore};

/// What a successful cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Reference instant every score in this cycle was computed against.
    pub now: DateTime<Utc>,
    pub elapsed: Duration,
    /// Rows written to the store.
    pub written: usize,
    pub rejected: usize,
    pub overrides_applied: usize,
    pub stats: ReconcileStats,
}

/// Runs reconciliation cycles between one source and one store.
pub struct SyncEngine<S, T> {
    source: S,
    store: T,
}

impl<S: DocumentSource, T: TrackingStore> SyncEngine<S, T> {
    pub fn new(source: S, store: T) -> Self {
        Self { source, store }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    /// Run one cycle against the current wall clock.
    ///
    /// # Errors
    ///
    /// See [`SyncEngine::run_cycle_at`].
    pub fn run_cycle(&mut self) -> Result<CycleReport> {
        self.run_cycle_at(Utc::now())
    }

    /// Run one cycle, scoring every record against `now`.
    ///
    /// The store is only written once the scan and the read have both
    /// succeeded; a failure before that leaves it exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns `SourceUnavailable` if the scan fails and `StoreUnavailable`
    /// if reading or replacing the ledger fails.
    pub fn run_cycle_at(&mut self, now: DateTime<Utc>) -> Result<CycleReport> {
        let started = Instant::now();
        info!(%now, "reconciliation cycle started");

        let scan = self.source.list_documents()?;
        info!(documents = scan.len(), "scanned document source");

        let existing = self.store.read_all()?;
        let overrides = self.store.pending_overrides()?;

        let outcome = reconcile(&scan, &existing, &overrides, now);

        for rejection in &outcome.rejections {
            warn!(%rejection, "document skipped this cycle");
        }
        for identity in &outcome.repaired {
            info!(%identity, "rebuilt unreadable ledger row from the source");
        }
        if outcome.stats.unreadable > 0 {
            warn!(
                rows = outcome.stats.unreadable,
                "unreadable ledger rows left untouched until their documents are scanned again"
            );
        }
        for identity in &outcome.archived {
            let topic = existing.get(identity).map_or("", |r| r.topic.as_str());
            warn!(%identity, %topic, "document missing from source, marking as archived");
        }

        self.store.replace_all(&outcome.records)?;

        if !outcome.applied_overrides.is_empty() {
            // The rows are already written; a stale override is re-applied next cycle.
            if let Err(e) = self.store.acknowledge_overrides(&outcome.applied_overrides) {
                error!(error = %e, "could not clear applied status overrides");
            }
        }

        let report = CycleReport {
            now,
            elapsed: started.elapsed(),
            written: outcome.records.len(),
            rejected: outcome.rejections.len(),
            overrides_applied: outcome.applied_overrides.len(),
            stats: outcome.stats,
        };
        info!(
            written = report.written,
            created = report.stats.created,
            archived = report.stats.archived,
            reactivated = report.stats.reactivated,
            repaired = report.stats.repaired,
            rejected = report.rejected,
            overrides = report.overrides_applied,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "reconciliation cycle complete"
        );
        Ok(report)
    }
}
