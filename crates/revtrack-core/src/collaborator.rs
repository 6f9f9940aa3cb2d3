//! Contracts for the two external systems a reconciliation cycle talks to.

use crate::document::{Ledger, ScannedDocument, StatusOverride, TrackedRecord};
use crate::error::Result;

/// The system of record for which review documents currently exist.
pub trait DocumentSource {
    /// List every live, eligible document.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::SourceUnavailable`](crate::RevtrackError::SourceUnavailable)
    /// when the listing cannot be trusted as complete.
    fn list_documents(&self) -> Result<Vec<ScannedDocument>>;
}

/// The durable ledger of tracked records.
pub trait TrackingStore {
    /// Read the full current table, including human-entered status and notes.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::StoreUnavailable`](crate::RevtrackError::StoreUnavailable).
    fn read_all(&self) -> Result<Ledger>;

    /// Replace every data row with `records` in one logical operation.
    ///
    /// Unreadable rows reported by [`Ledger::damaged`](crate::Ledger::damaged)
    /// are kept unless `records` holds the same identity.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::StoreUnavailable`](crate::RevtrackError::StoreUnavailable);
    /// on failure the previous contents must remain.
    fn replace_all(&mut self, records: &[TrackedRecord]) -> Result<()>;

    /// Status changes submitted since the last cycle.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::StoreUnavailable`](crate::RevtrackError::StoreUnavailable).
    fn pending_overrides(&self) -> Result<Vec<StatusOverride>> {
        Ok(Vec::new())
    }

    /// Drop overrides that a successful cycle has applied. An override
    /// resubmitted with different content since it was read must survive.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::StoreUnavailable`](crate::RevtrackError::StoreUnavailable).
    fn acknowledge_overrides(&mut self, _applied: &[StatusOverride]) -> Result<()> {
        Ok(())
    }
}
