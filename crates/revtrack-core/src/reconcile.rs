//! Reconciliation: merge a fresh scan into the ledger.
//!
//! The output is the complete replacement set for the tracking store. Given
//! the same scan, ledger, overrides and `now`, the output is identical, so
//! re-running a cycle after a failed write converges on the same state.
//!
//! Rules:
//! - scanned documents take their metadata from the scan and their
//!   `status`/`notes` from the prior record ([`resolve_status_and_notes`]);
//! - tracked documents missing from the scan are archived, never dropped;
//! - documents the engine cannot trust (blank or repeated identity,
//!   unparseable dates) are reported as [`Rejection`]s and never merged;
//! - damaged ledger rows are rebuilt from the scan with their status and
//!   notes; those not in the scan are left out and stay in the store as is.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::document::{Ledger, ScannedDocument, Status, StatusOverride, TrackedRecord, UNKNOWN};
use crate::error::TimestampError;
use crate::priority::Priority;
use crate::summary::rank;

/// A scanned document left out of this cycle's merge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("document '{display_name}' has an empty identity")]
    EmptyIdentity { display_name: String },

    #[error("identity '{identity}' appears more than once in the scan (kept the first, skipped '{display_name}')")]
    DuplicateIdentity {
        identity: String,
        display_name: String,
    },

    #[error("document '{identity}': {source}")]
    MalformedTimestamp {
        identity: String,
        source: TimestampError,
    },
}

/// Per-cycle counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub scanned: usize,
    /// First time the identity was seen.
    pub created: usize,
    /// Already tracked and still present.
    pub updated: usize,
    /// Was archived, present again in the scan.
    pub reactivated: usize,
    /// Vanished from the scan this cycle.
    pub archived: usize,
    /// Written back unchanged apart from the score (already archived, or
    /// present with unreadable dates).
    pub retained: usize,
    /// Damaged ledger rows rebuilt from the scan.
    pub repaired: usize,
    /// Damaged ledger rows that could not be rebuilt this cycle.
    pub unreadable: usize,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Full replacement set, highest priority first.
    pub records: Vec<TrackedRecord>,
    /// Overrides consumed by this pass.
    pub applied_overrides: Vec<StatusOverride>,
    /// Identities archived this cycle because they left the source.
    pub archived: Vec<String>,
    /// Damaged ledger rows rebuilt from this scan.
    pub repaired: Vec<String>,
    pub rejections: Vec<Rejection>,
    pub stats: ReconcileStats,
}

/// Decide `status` and `notes` for a document present in the scan.
///
/// - an override always wins; its notes replace the prior notes only when given;
/// - otherwise prior state is preserved, except that a record the engine
///   archived because its document vanished returns to `Pending` when the
///   document is back; an archive set by a person stays;
/// - a never-seen document starts as `Pending` with empty notes.
#[must_use]
pub fn resolve_status_and_notes(
    prior: Option<&TrackedRecord>,
    status_override: Option<&StatusOverride>,
) -> (Status, String) {
    let prior_notes = prior.map(|p| p.notes.clone()).unwrap_or_default();

    match (prior, status_override) {
        (_, Some(o)) => (o.status, o.notes.clone().unwrap_or(prior_notes)),
        (Some(p), None) if p.status == Status::Archived && p.archived_by_absence => {
            (Status::Pending, prior_notes)
        }
        (Some(p), None) => (p.status, prior_notes),
        (None, None) => (Status::Pending, String::new()),
    }
}

/// Merge `scan` into `existing` and return the next full ledger contents.
///
/// `now` is the single reference instant for every score in the output.
/// Overrides for identities that are neither scanned nor tracked are left
/// out of `applied_overrides` so they stay queued until the document appears.
#[must_use]
pub fn reconcile(
    scan: &[ScannedDocument],
    existing: &Ledger,
    overrides: &[StatusOverride],
    now: DateTime<Utc>,
) -> Reconciliation {
    let overrides: HashMap<&str, &StatusOverride> = overrides
        .iter()
        .map(|o| (o.identity.as_str(), o))
        .collect();

    let mut next: BTreeMap<String, TrackedRecord> = BTreeMap::new();
    let mut present: HashSet<&str> = HashSet::new();
    let mut applied_overrides = Vec::new();
    let mut archived = Vec::new();
    let mut repaired = Vec::new();
    let mut rejections = Vec::new();
    let mut stats = ReconcileStats {
        scanned: scan.len(),
        ..ReconcileStats::default()
    };

    for doc in scan {
        let identity = doc.identity.as_str();
        if identity.trim().is_empty() {
            rejections.push(Rejection::EmptyIdentity {
                display_name: doc.display_name.clone(),
            });
            continue;
        }
        if !present.insert(identity) {
            rejections.push(Rejection::DuplicateIdentity {
                identity: identity.to_string(),
                display_name: doc.display_name.clone(),
            });
            continue;
        }

        let prior = existing.get(identity);

        let dates = doc.created_at.resolve("created_at").and_then(|created| {
            doc.modified_at
                .resolve("modified_at")
                .map(|modified| (created, modified))
        });
        let (created_at, modified_at) = match dates {
            Ok(dates) => dates,
            Err(source) => {
                rejections.push(Rejection::MalformedTimestamp {
                    identity: identity.to_string(),
                    source,
                });
                // Still in the source: keep the old row rather than archive it.
                if let Some(prior) = prior {
                    let mut kept = prior.clone();
                    kept.rescore(now);
                    next.insert(kept.identity.clone(), kept);
                    stats.retained += 1;
                }
                continue;
            }
        };

        let status_override = overrides.get(identity).copied();
        let damaged = prior.is_none().then(|| existing.damaged(identity)).flatten();
        let (status, notes) = match (damaged, status_override) {
            (Some(d), Some(o)) => (o.status, o.notes.clone().unwrap_or_else(|| d.notes.clone())),
            (Some(d), None) => (d.status, d.notes.clone()),
            (None, _) => resolve_status_and_notes(prior, status_override),
        };
        if let Some(o) = status_override {
            applied_overrides.push(o.clone());
        }

        match prior {
            None if damaged.is_some() => {
                repaired.push(identity.to_string());
                stats.repaired += 1;
            }
            None => stats.created += 1,
            Some(p) if p.status == Status::Archived && status != Status::Archived => {
                stats.reactivated += 1;
            }
            Some(_) => stats.updated += 1,
        }

        let last_editor = doc
            .last_editor
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string();

        next.insert(
            identity.to_string(),
            TrackedRecord {
                identity: identity.to_string(),
                display_name: doc.display_name.clone(),
                topic: doc.topic.clone(),
                owner: doc.owner.clone(),
                created_at,
                modified_at,
                last_editor,
                status,
                notes,
                archived_by_absence: false,
                priority: Priority::compute(created_at, modified_at, now),
            },
        );
    }

    for prior in existing.iter() {
        if present.contains(prior.identity.as_str()) {
            continue;
        }

        let mut record = prior.clone();
        record.rescore(now);
        if record.status == Status::Archived {
            stats.retained += 1;
        } else {
            record.status = Status::Archived;
            record.archived_by_absence = true;
            archived.push(record.identity.clone());
            stats.archived += 1;
        }

        if let Some(o) = overrides.get(prior.identity.as_str()) {
            if let Some(notes) = &o.notes {
                record.notes = notes.clone();
            }
            applied_overrides.push((*o).clone());
        }

        next.insert(record.identity.clone(), record);
    }

    stats.unreadable = existing
        .damaged_records()
        .filter(|d| !next.contains_key(&d.identity))
        .count();

    Reconciliation {
        records: rank(next.into_values().collect()),
        applied_overrides,
        archived,
        repaired,
        rejections,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DamagedRecord;
    use crate::priority::UrgencyTier;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days)
    }

    fn scanned(id: &str, name: &str, age: i64, idle: i64) -> ScannedDocument {
        ScannedDocument::new(id, name, days_ago(age), days_ago(idle))
    }

    fn tracked(id: &str, status: Status, notes: &str) -> TrackedRecord {
        TrackedRecord {
            identity: id.to_string(),
            display_name: format!("Doc {id} - [Owner {id}]"),
            topic: format!("Doc {id}"),
            owner: format!("Owner {id}"),
            created_at: days_ago(3),
            modified_at: days_ago(1),
            last_editor: "Priya".to_string(),
            status,
            notes: notes.to_string(),
            archived_by_absence: false,
            priority: Priority::compute(days_ago(3), days_ago(1), days_ago(7)),
        }
    }

    /// A record the engine archived on an earlier cycle.
    fn vanished(id: &str, notes: &str) -> TrackedRecord {
        TrackedRecord {
            archived_by_absence: true,
            ..tracked(id, Status::Archived, notes)
        }
    }

    fn ledger(records: Vec<TrackedRecord>) -> Ledger {
        Ledger::from_records(records).unwrap()
    }

    fn find<'a>(result: &'a Reconciliation, id: &str) -> &'a TrackedRecord {
        result
            .records
            .iter()
            .find(|r| r.identity == id)
            .unwrap_or_else(|| panic!("no record for {id}"))
    }

    fn applied(result: &Reconciliation) -> Vec<&str> {
        result
            .applied_overrides
            .iter()
            .map(|o| o.identity.as_str())
            .collect()
    }

    fn set(id: &str, status: Status, notes: Option<&str>) -> StatusOverride {
        StatusOverride {
            identity: id.to_string(),
            status,
            notes: notes.map(str::to_string),
        }
    }

    // === resolve_status_and_notes ===

    #[test]
    fn new_document_defaults_to_pending_with_empty_notes() {
        assert_eq!(
            resolve_status_and_notes(None, None),
            (Status::Pending, String::new())
        );
    }

    #[test]
    fn prior_status_and_notes_are_preserved() {
        let prior = tracked("a", Status::Approved, "looks good");
        assert_eq!(
            resolve_status_and_notes(Some(&prior), None),
            (Status::Approved, "looks good".to_string())
        );
    }

    #[test]
    fn archived_prior_without_override_returns_to_pending() {
        let prior = vanished("a", "was gone");
        assert_eq!(
            resolve_status_and_notes(Some(&prior), None),
            (Status::Pending, "was gone".to_string())
        );
    }

    #[test]
    fn archive_set_by_a_person_is_preserved() {
        let prior = tracked("a", Status::Archived, "superseded");
        assert_eq!(
            resolve_status_and_notes(Some(&prior), None),
            (Status::Archived, "superseded".to_string())
        );
    }

    #[test]
    fn override_wins_and_keeps_notes_unless_replaced() {
        let prior = tracked("a", Status::Pending, "first pass");

        let keep = set("a", Status::InReview, None);
        assert_eq!(
            resolve_status_and_notes(Some(&prior), Some(&keep)),
            (Status::InReview, "first pass".to_string())
        );

        let replace = set("a", Status::NeedsChanges, Some("fix section 3"));
        assert_eq!(
            resolve_status_and_notes(Some(&prior), Some(&replace)),
            (Status::NeedsChanges, "fix section 3".to_string())
        );
    }

    #[test]
    fn override_seeds_a_new_document() {
        let seed = set("a", Status::Approved, Some("pre-approved"));
        assert_eq!(
            resolve_status_and_notes(None, Some(&seed)),
            (Status::Approved, "pre-approved".to_string())
        );
    }

    // === reconcile ===

    #[test]
    fn first_scan_creates_pending_records() {
        let scan = vec![scanned("a", "System Design - [Jane Doe]", 2, 1)];
        let result = reconcile(&scan, &Ledger::new(), &[], now());

        assert_eq!(result.records.len(), 1);
        let rec = find(&result, "a");
        assert_eq!(rec.topic, "System Design");
        assert_eq!(rec.owner, "Jane Doe");
        assert_eq!(rec.status, Status::Pending);
        assert_eq!(rec.notes, "");
        assert_eq!(rec.last_editor, "Unknown");
        assert_eq!(rec.priority.score, 3);
        assert_eq!(result.stats.created, 1);
    }

    #[test]
    fn human_edits_survive_reconciliation() {
        let existing = ledger(vec![tracked("a", Status::Approved, "looks good")]);
        let scan = vec![scanned("a", "Doc a - [Owner a]", 3, 0)];

        let result = reconcile(&scan, &existing, &[], now());
        let rec = find(&result, "a");
        assert_eq!(rec.status, Status::Approved);
        assert_eq!(rec.notes, "looks good");
        assert_eq!(result.stats.updated, 1);
    }

    #[test]
    fn metadata_follows_the_source() {
        let existing = ledger(vec![tracked("a", Status::InReview, "")]);
        let scan = vec![
            scanned("a", "Renamed Topic - [New Owner]", 3, 0).with_last_editor("Rahul"),
        ];

        let result = reconcile(&scan, &existing, &[], now());
        let rec = find(&result, "a");
        assert_eq!(rec.topic, "Renamed Topic");
        assert_eq!(rec.owner, "New Owner");
        assert_eq!(rec.last_editor, "Rahul");
        assert_eq!(rec.modified_at, days_ago(0));
        assert_eq!(rec.status, Status::InReview);
    }

    #[test]
    fn missing_document_is_archived_with_fields_preserved() {
        let prior = tracked("gone", Status::NeedsChanges, "waiting on author");
        let existing = ledger(vec![prior.clone(), tracked("kept", Status::Pending, "")]);
        let scan = vec![scanned("kept", "Doc kept - [Owner kept]", 3, 1)];

        let result = reconcile(&scan, &existing, &[], now());
        let rec = find(&result, "gone");

        assert_eq!(rec.status, Status::Archived);
        assert_eq!(rec.notes, prior.notes);
        assert_eq!(rec.display_name, prior.display_name);
        assert_eq!(rec.topic, prior.topic);
        assert_eq!(rec.owner, prior.owner);
        assert_eq!(rec.created_at, prior.created_at);
        assert_eq!(rec.modified_at, prior.modified_at);
        assert_eq!(rec.last_editor, prior.last_editor);
        assert!(rec.archived_by_absence);
        assert!(!find(&result, "kept").archived_by_absence);
        assert_eq!(result.archived, vec!["gone".to_string()]);
        assert_eq!(result.stats.archived, 1);
    }

    #[test]
    fn already_archived_records_are_kept_not_dropped() {
        let existing = ledger(vec![vanished("old", "history")]);

        let result = reconcile(&[], &existing, &[], now());
        assert_eq!(result.records.len(), 1);
        assert_eq!(find(&result, "old").status, Status::Archived);
        assert!(result.archived.is_empty());
        assert_eq!(result.stats.retained, 1);
    }

    #[test]
    fn reappearance_with_override_reverses_archival() {
        let existing = ledger(vec![tracked("a", Status::Archived, "")]);
        let scan = vec![scanned("a", "Doc a - [Owner a]", 3, 0)];
        let overrides = [set("a", Status::Pending, None)];

        let result = reconcile(&scan, &existing, &overrides, now());
        assert_eq!(find(&result, "a").status, Status::Pending);
        assert_eq!(result.stats.reactivated, 1);
        assert_eq!(applied(&result), ["a"]);
    }

    #[test]
    fn reappearance_without_override_reverses_archival() {
        let existing = ledger(vec![vanished("a", "note")]);
        let scan = vec![scanned("a", "Doc a - [Owner a]", 3, 0)];

        let result = reconcile(&scan, &existing, &[], now());
        let rec = find(&result, "a");
        assert_eq!(rec.status, Status::Pending);
        assert_eq!(rec.notes, "note");
        assert!(!rec.archived_by_absence);
        assert_eq!(result.stats.reactivated, 1);
    }

    #[test]
    fn present_document_archived_by_a_person_stays_archived() {
        let existing = ledger(vec![tracked("a", Status::Archived, "dropped from roadmap")]);
        let scan = vec![scanned("a", "Doc a - [Owner a]", 3, 0)];

        let result = reconcile(&scan, &existing, &[], now());
        let rec = find(&result, "a");
        assert_eq!(rec.status, Status::Archived);
        assert_eq!(rec.notes, "dropped from roadmap");
        assert_eq!(result.stats.reactivated, 0);
    }

    #[test]
    fn explicit_archive_request_applies_to_present_document() {
        let existing = ledger(vec![tracked("a", Status::InReview, "")]);
        let scan = vec![scanned("a", "Doc a - [Owner a]", 3, 0)];
        let overrides = [set("a", Status::Archived, Some("superseded"))];

        let result = reconcile(&scan, &existing, &overrides, now());
        let rec = find(&result, "a");
        assert_eq!(rec.status, Status::Archived);
        assert_eq!(rec.notes, "superseded");
        assert!(!rec.archived_by_absence);
    }

    #[test]
    fn explicit_archive_survives_the_next_cycle() {
        let scan = vec![scanned("a", "Doc a - [Owner a]", 3, 0)];
        let overrides = [set("a", Status::Archived, None)];

        let first = reconcile(&scan, &Ledger::new(), &overrides, now());
        assert_eq!(find(&first, "a").status, Status::Archived);

        let second = reconcile(&scan, &ledger(first.records.clone()), &[], now());
        assert_eq!(first.records, second.records);
        assert_eq!(find(&second, "a").status, Status::Archived);
    }

    #[test]
    fn override_for_absent_document_only_updates_notes() {
        let existing = ledger(vec![tracked("a", Status::Approved, "old")]);
        let overrides = [set("a", Status::Completed, Some("moved to archive drive"))];

        let result = reconcile(&[], &existing, &overrides, now());
        let rec = find(&result, "a");
        assert_eq!(rec.status, Status::Archived);
        assert_eq!(rec.notes, "moved to archive drive");
        assert_eq!(applied(&result), ["a"]);
    }

    #[test]
    fn override_for_unknown_identity_stays_queued() {
        let overrides = [set("future", Status::Approved, None)];
        let result = reconcile(&[], &Ledger::new(), &overrides, now());

        assert!(result.records.is_empty());
        assert!(applied(&result).is_empty());
    }

    #[test]
    fn empty_identity_is_rejected() {
        let scan = vec![scanned("  ", "Orphan - [Anu]", 1, 0)];
        let result = reconcile(&scan, &Ledger::new(), &[], now());

        assert!(result.records.is_empty());
        assert!(matches!(
            result.rejections.as_slice(),
            [Rejection::EmptyIdentity { .. }]
        ));
    }

    #[test]
    fn duplicate_identity_keeps_first_occurrence() {
        let scan = vec![
            scanned("dup", "First - [Anu]", 1, 0),
            scanned("dup", "Second - [Lasya]", 9, 9),
        ];
        let result = reconcile(&scan, &Ledger::new(), &[], now());

        assert_eq!(result.records.len(), 1);
        assert_eq!(find(&result, "dup").topic, "First");
        assert!(matches!(
            result.rejections.as_slice(),
            [Rejection::DuplicateIdentity { identity, .. }] if identity == "dup"
        ));
    }

    #[test]
    fn malformed_timestamp_skips_new_document() {
        let scan = vec![
            ScannedDocument::new("bad", "Broken - [Rahul]", "not a date", days_ago(1)),
            scanned("good", "Fine - [Priya]", 1, 0),
        ];
        let result = reconcile(&scan, &Ledger::new(), &[], now());

        assert_eq!(result.records.len(), 1);
        assert_eq!(find(&result, "good").priority.score, 1);
        assert!(matches!(
            result.rejections.as_slice(),
            [Rejection::MalformedTimestamp { identity, source }]
                if identity == "bad" && source.field == "created_at"
        ));
    }

    #[test]
    fn malformed_timestamp_keeps_tracked_record_unarchived() {
        let prior = tracked("a", Status::InReview, "mid-review");
        let existing = ledger(vec![prior.clone()]);
        let scan = vec![ScannedDocument::new(
            "a",
            "Doc a - [Owner a]",
            days_ago(3),
            "31/02/2025",
        )];

        let result = reconcile(&scan, &existing, &[], now());
        let rec = find(&result, "a");
        assert_eq!(rec.status, Status::InReview);
        assert_eq!(rec.notes, "mid-review");
        assert_eq!(rec.modified_at, prior.modified_at);
        assert!(result.archived.is_empty());
        assert_eq!(result.stats.retained, 1);
    }

    fn damaged(id: &str, status: Status, notes: &str) -> Ledger {
        let mut ledger = Ledger::new();
        ledger
            .insert_damaged(DamagedRecord {
                identity: id.to_string(),
                status,
                notes: notes.to_string(),
                reason: "cannot parse modified_at '14/03/2025'".to_string(),
            })
            .unwrap();
        ledger
    }

    #[test]
    fn damaged_row_is_rebuilt_from_scan_with_its_status_and_notes() {
        let existing = damaged("a", Status::Approved, "signed off");
        let scan = vec![scanned("a", "Doc a - [Owner a]", 3, 1)];

        let result = reconcile(&scan, &existing, &[], now());
        let rec = find(&result, "a");
        assert_eq!(rec.status, Status::Approved);
        assert_eq!(rec.notes, "signed off");
        assert_eq!(rec.modified_at, days_ago(1));
        assert_eq!(result.repaired, ["a"]);
        assert_eq!(result.stats.repaired, 1);
        assert_eq!(result.stats.created, 0);
        assert_eq!(result.stats.unreadable, 0);
    }

    #[test]
    fn override_on_damaged_row_keeps_notes_unless_replaced() {
        let existing = damaged("a", Status::Pending, "first pass");
        let scan = vec![scanned("a", "Doc a - [Owner a]", 3, 1)];
        let overrides = [set("a", Status::InReview, None)];

        let result = reconcile(&scan, &existing, &overrides, now());
        let rec = find(&result, "a");
        assert_eq!(rec.status, Status::InReview);
        assert_eq!(rec.notes, "first pass");
    }

    #[test]
    fn damaged_row_missing_from_scan_is_left_out() {
        let existing = damaged("a", Status::Approved, "signed off");

        let result = reconcile(&[], &existing, &[], now());
        assert!(result.records.is_empty());
        assert!(result.archived.is_empty());
        assert_eq!(result.stats.unreadable, 1);
    }

    #[test]
    fn text_timestamps_are_accepted() {
        let scan = vec![ScannedDocument::new(
            "a",
            "Spec - [Anu]",
            "2025-03-04 12:00:00",
            "2025-03-14T12:00:00Z",
        )];
        let result = reconcile(&scan, &Ledger::new(), &[], now());
        assert_eq!(find(&result, "a").priority.score, 10);
    }

    #[test]
    fn scores_are_recomputed_for_every_record() {
        let stale = tracked("gone", Status::Archived, "");
        assert_ne!(stale.priority, Priority::compute(stale.created_at, stale.modified_at, now()));

        let result = reconcile(&[], &ledger(vec![stale.clone()]), &[], now());
        let rec = find(&result, "gone");
        assert_eq!(
            rec.priority,
            Priority::compute(stale.created_at, stale.modified_at, now())
        );
    }

    #[test]
    fn reconciliation_is_idempotent() {
        let existing = ledger(vec![
            tracked("a", Status::Approved, "looks good"),
            tracked("b", Status::Pending, ""),
            vanished("c", "old"),
            tracked("e", Status::Archived, "by hand"),
        ]);
        let scan = vec![
            scanned("a", "Doc a - [Owner a]", 3, 1),
            scanned("d", "New Doc - [Lasya]", 0, 0),
        ];

        let first = reconcile(&scan, &existing, &[], now());
        let replayed = ledger(first.records.clone());
        let second = reconcile(&scan, &replayed, &[], now());

        assert_eq!(first.records, second.records);
        assert!(second.archived.is_empty());
    }

    #[test]
    fn each_identity_appears_once() {
        let existing = ledger(vec![tracked("a", Status::Pending, ""), tracked("b", Status::Pending, "")]);
        let scan = vec![scanned("a", "Doc a", 1, 0), scanned("c", "Doc c", 1, 0)];

        let result = reconcile(&scan, &existing, &[], now());
        let mut ids: Vec<&str> = result.records.iter().map(|r| r.identity.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn output_is_ranked_by_priority() {
        let scan = vec![
            scanned("fresh", "Fresh Doc - [Anu]", 1, 0),
            scanned("stale", "Stale Doc - [Rahul]", 4, 2),
            scanned("forgotten", "Forgotten Doc - [Priya]", 10, 5),
            scanned("legacy", "Legacy Spec - [Arnab]", 30, 1),
        ];
        let result = reconcile(&scan, &Ledger::new(), &[], now());

        let ranked: Vec<(&str, i64, UrgencyTier)> = result
            .records
            .iter()
            .map(|r| (r.identity.as_str(), r.priority.score, r.priority.tier))
            .collect();
        assert_eq!(
            ranked,
            [
                ("legacy", 31, UrgencyTier::Critical),
                ("forgotten", 15, UrgencyTier::Critical),
                ("stale", 6, UrgencyTier::High),
                ("fresh", 1, UrgencyTier::Normal),
            ]
        );
    }
}
