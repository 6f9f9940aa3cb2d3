//! Ranking and aggregate views over tracked records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::document::{Status, TrackedRecord};
use crate::priority::UrgencyTier;

/// Sort highest priority first; equal scores fall back to identity order.
#[must_use]
pub fn rank(mut records: Vec<TrackedRecord>) -> Vec<TrackedRecord> {
    records.sort_by(|a, b| {
        b.priority
            .score
            .cmp(&a.priority.score)
            .then_with(|| a.identity.cmp(&b.identity))
    });
    records
}

/// Per-status figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusFigures {
    pub count: usize,
    pub mean_days_old: f64,
}

/// Headless version of the review dashboard's distribution panels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub by_status: BTreeMap<Status, StatusFigures>,
    pub by_tier: BTreeMap<UrgencyTier, usize>,
}

impl Summary {
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a TrackedRecord>) -> Self {
        let mut summary = Self::default();
        let mut days_old: BTreeMap<Status, i64> = BTreeMap::new();

        for record in records {
            summary.total += 1;
            summary.by_status.entry(record.status).or_default().count += 1;
            *days_old.entry(record.status).or_default() += record.priority.days_since_created.max(0);
            *summary.by_tier.entry(record.priority.tier).or_default() += 1;
        }

        for (status, figures) in &mut summary.by_status {
            let total_days = days_old.get(status).copied().unwrap_or_default();
            figures.mean_days_old = total_days as f64 / figures.count as f64;
        }

        summary
    }

    /// Records that are still waiting on someone: not archived or completed.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.by_status
            .iter()
            .filter(|(status, _)| !matches!(status, Status::Archived | Status::Completed))
            .map(|(_, figures)| figures.count)
            .sum()
    }
}
