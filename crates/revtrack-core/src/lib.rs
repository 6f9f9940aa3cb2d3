//! # revtrack-core
//!
//! Core types and algorithms for revtrack, the review document tracker.
//!
//! - [`ScannedDocument`] / [`TrackedRecord`]: what a scan sees and what the ledger keeps
//! - [`filename`]: topic/owner extraction from `"Topic - [Owner]"` names
//! - [`Priority`] / [`UrgencyTier`]: staleness scoring
//! - [`reconcile()`]: the merge of a scan into the ledger
//! - [`DocumentSource`] / [`TrackingStore`]: collaborator contracts
//! - [`Config`]: `revtrack.toml`
//! - Error hierarchy ([`RevtrackError`], [`TimestampError`])

pub mod collaborator;
pub mod config;
pub mod document;
pub mod error;
pub mod filename;
pub mod priority;
pub mod reconcile;
pub mod summary;

pub use collaborator::{DocumentSource, TrackingStore};
pub use config::Config;
pub use document::{DamagedRecord, Ledger, ScannedDocument, Status, StatusOverride, TrackedRecord, UNKNOWN};
pub use error::{Result, RevtrackError, TimestampError};
pub use priority::{Priority, Timestamp, UrgencyTier};
pub use reconcile::{reconcile, resolve_status_and_notes, Reconciliation, Rejection};
pub use summary::{rank, Summary};
