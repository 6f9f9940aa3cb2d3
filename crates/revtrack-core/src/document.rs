//! Document types: what a scan sees and what the ledger keeps.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::RevtrackError;
use crate::filename::parse_display_name;
use crate::priority::{Priority, Timestamp};

/// Placeholder for an owner or editor that could not be determined.
pub const UNKNOWN: &str = "Unknown";

/// Review status. Owned by humans; the engine only sets `Pending` on first
/// sight and `Archived` when a document leaves the source.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Status {
    #[default]
    Pending,
    #[serde(rename = "In Review")]
    InReview,
    Approved,
    #[serde(rename = "Needs Changes")]
    NeedsChanges,
    Completed,
    Archived,
}

impl Status {
    /// Every status, in the order a picker should offer them.
    pub const ALL: [Status; 6] = [
        Status::Pending,
        Status::InReview,
        Status::Approved,
        Status::NeedsChanges,
        Status::Completed,
        Status::Archived,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InReview => "In Review",
            Self::Approved => "Approved",
            Self::NeedsChanges => "Needs Changes",
            Self::Completed => "Completed",
            Self::Archived => "Archived",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status '{0}': expected one of Pending, In Review, Approved, Needs Changes, Completed, Archived")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    /// Case-insensitive; `-` and `_` count as spaces (`needs-changes`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// One document as seen by the latest scan of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDocument {
    /// Stable source-assigned key (the document link). Must be non-empty.
    pub identity: String,
    pub display_name: String,
    pub topic: String,
    pub owner: String,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub last_editor: Option<String>,
}

impl ScannedDocument {
    /// Build a scanned document, deriving topic and owner from the name.
    pub fn new(
        identity: impl Into<String>,
        display_name: impl Into<String>,
        created_at: impl Into<Timestamp>,
        modified_at: impl Into<Timestamp>,
    ) -> Self {
        let display_name = display_name.into();
        let (topic, owner) = parse_display_name(&display_name);
        Self {
            identity: identity.into(),
            display_name,
            topic,
            owner,
            created_at: created_at.into(),
            modified_at: modified_at.into(),
            last_editor: None,
        }
    }

    #[must_use]
    pub fn with_last_editor(mut self, editor: impl Into<String>) -> Self {
        self.last_editor = Some(editor.into());
        self
    }
}

/// One ledger row. `priority` is derived and recomputed every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedRecord {
    pub identity: String,
    pub display_name: String,
    pub topic: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub last_editor: String,
    pub status: Status,
    pub notes: String,
    /// Set when the engine archived this record because its document left
    /// the source. Only such records return to `Pending` when the document
    /// reappears; an `Archived` status set by a person is kept.
    #[serde(default)]
    pub archived_by_absence: bool,
    pub priority: Priority,
}

impl TrackedRecord {
    /// Recompute the derived priority against `now`.
    pub fn rescore(&mut self, now: DateTime<Utc>) {
        self.priority = Priority::compute(self.created_at, self.modified_at, now);
    }
}

/// A status change submitted outside the engine (a UI, another process).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOverride {
    pub identity: String,
    pub status: Status,
    /// Replacement notes; `None` keeps whatever the record already has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A stored row whose machine-owned fields could not be read back (a bad
/// hand edit, usually). Only the human-owned fields are kept, so the next
/// scan of the same document can rebuild the row without losing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamagedRecord {
    pub identity: String,
    pub status: Status,
    pub notes: String,
    /// What could not be read.
    pub reason: String,
}

/// Tracked records keyed by identity.
///
/// Invariant: every key is non-empty and equals its record's `identity`,
/// so an identity appears at most once across readable and damaged rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    records: BTreeMap<String, TrackedRecord>,
    damaged: BTreeMap<String, DamagedRecord>,
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::MalformedIdentity`] if the identity is blank
    /// or already present.
    pub fn insert(&mut self, record: TrackedRecord) -> Result<(), RevtrackError> {
        if record.identity.trim().is_empty() {
            return Err(RevtrackError::MalformedIdentity(format!(
                "record '{}' has an empty identity",
                record.display_name
            )));
        }
        self.check_unique(&record.identity)?;
        self.records.insert(record.identity.clone(), record);
        Ok(())
    }

    /// Add a row that could only be partly read.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::MalformedIdentity`] if the identity is blank
    /// or already present.
    pub fn insert_damaged(&mut self, damaged: DamagedRecord) -> Result<(), RevtrackError> {
        if damaged.identity.trim().is_empty() {
            return Err(RevtrackError::MalformedIdentity(
                "damaged row has an empty identity".to_string(),
            ));
        }
        self.check_unique(&damaged.identity)?;
        self.damaged.insert(damaged.identity.clone(), damaged);
        Ok(())
    }

    fn check_unique(&self, identity: &str) -> Result<(), RevtrackError> {
        if self.records.contains_key(identity) || self.damaged.contains_key(identity) {
            return Err(RevtrackError::MalformedIdentity(format!(
                "duplicate identity '{identity}'"
            )));
        }
        Ok(())
    }

    /// Build a ledger from records, rejecting blank or repeated identities.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::MalformedIdentity`] on the first bad record.
    pub fn from_records(
        records: impl IntoIterator<Item = TrackedRecord>,
    ) -> Result<Self, RevtrackError> {
        let mut ledger = Self::new();
        for record in records {
            ledger.insert(record)?;
        }
        Ok(ledger)
    }

    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&TrackedRecord> {
        self.records.get(identity)
    }

    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.records.contains_key(identity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedRecord> {
        self.records.values()
    }

    #[must_use]
    pub fn damaged(&self, identity: &str) -> Option<&DamagedRecord> {
        self.damaged.get(identity)
    }

    /// Damaged rows in identity order.
    pub fn damaged_records(&self) -> impl Iterator<Item = &DamagedRecord> {
        self.damaged.values()
    }

    /// Readable records only; damaged rows are dropped.
    #[must_use]
    pub fn into_records(self) -> Vec<TrackedRecord> {
        self.records.into_values().collect()
    }
}
