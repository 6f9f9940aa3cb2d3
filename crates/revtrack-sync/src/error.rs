use thiserror::Error;

use revtrack_core::RevtrackError;

/// Why a scheduled cycle did not complete.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Cycle(#[from] RevtrackError),

    #[error("cycle panicked: {0}")]
    Panicked(String),
}
