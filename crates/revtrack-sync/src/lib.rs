//! Runs reconciliation between a document source and a tracking store.
//!
//! [`SyncEngine`] performs one cycle on demand; [`SyncScheduler`] repeats it
//! on a fixed interval until told to stop.

pub mod cycle;
pub mod error;
pub mod scheduler;

pub use cycle::{CycleReport, SyncEngine};
pub use error::SyncError;
pub use scheduler::{SchedulerState, SyncScheduler};
