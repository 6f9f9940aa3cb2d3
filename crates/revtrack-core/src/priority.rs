//! Priority scoring: how stale a review document is.
//!
//! `score = max(0, days(now - created) + days(now - modified))`, with whole
//! days floored. The reference instant `now` is always passed in; one cycle
//! reads the clock once and scores every record against that instant.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimestampError;

/// Scores at or above this are [`UrgencyTier::Critical`].
pub const CRITICAL_THRESHOLD: i64 = 10;

/// Scores at or above this (and below critical) are [`UrgencyTier::High`].
pub const HIGH_THRESHOLD: i64 = 5;

const SECONDS_PER_DAY: i64 = 86_400;

/// A date/time as delivered by a collaborator: already an instant, or text
/// that still has to be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    Instant(DateTime<Utc>),
    Text(String),
}

impl Timestamp {
    /// Resolve to a UTC instant. `field` names the value in the error.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError`] if text cannot be parsed.
    pub fn resolve(&self, field: &str) -> Result<DateTime<Utc>, TimestampError> {
        match self {
            Self::Instant(at) => Ok(*at),
            Self::Text(text) => parse_timestamp(field, text),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::Instant(at)
    }
}

impl From<&str> for Timestamp {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Parse date/time text into a UTC instant.
///
/// Accepts RFC 3339 with any offset, `YYYY-MM-DD HH:MM:SS[.frac][+HH:MM]`,
/// `YYYY-MM-DDTHH:MM:SS[.frac]` and a bare `YYYY-MM-DD` (midnight).
/// Values without an offset are taken as UTC.
///
/// # Errors
///
/// Returns [`TimestampError`] if no format matches.
pub fn parse_timestamp(field: &str, text: &str) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = text.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(at.with_timezone(&Utc));
    }
    if let Ok(at) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(TimestampError::new(field, text))
}

/// Three-level classification of a priority score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum UrgencyTier {
    Normal,
    High,
    Critical,
}

impl UrgencyTier {
    #[must_use]
    pub fn from_score(score: i64) -> Self {
        if score >= CRITICAL_THRESHOLD {
            Self::Critical
        } else if score >= HIGH_THRESHOLD {
            Self::High
        } else {
            Self::Normal
        }
    }

    /// Upper-case label used in listings.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Normal => "NORMAL",
        }
    }

    /// Background tint for rendering a row of this tier.
    #[must_use]
    pub fn tint(self) -> &'static str {
        match self {
            Self::Critical => "#ffcccc",
            Self::High => "#fff4cc",
            Self::Normal => "#ccffcc",
        }
    }
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived staleness figures for one document at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub days_since_created: i64,
    pub days_since_modified: i64,
    pub score: i64,
    pub tier: UrgencyTier,
}

impl Priority {
    #[must_use]
    pub fn compute(
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let days_since_created = floor_days(now, created_at);
        let days_since_modified = floor_days(now, modified_at);
        let score = (days_since_created + days_since_modified).max(0);

        Self {
            days_since_created,
            days_since_modified,
            score,
            tier: UrgencyTier::from_score(score),
        }
    }
}

/// Whole days between `then` and `now`, rounded toward negative infinity.
#[must_use]
pub fn floor_days(now: DateTime<Utc>, then: DateTime<Utc>) -> i64 {
    (now - then).num_seconds().div_euclid(SECONDS_PER_DAY)
}
