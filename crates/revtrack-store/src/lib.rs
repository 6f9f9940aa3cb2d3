//! # revtrack-store
//!
//! SQLite tracking ledger for revtrack.
//!
//! One `reviews` row per tracked document, laid out the way the review
//! board shows it: document name, owner, created, last modified, status,
//! days old, days since update, priority score, document link (the identity)
//! and notes. The derived day counts and score are written as computed at
//! write time and are never read back as authoritative.
//!
//! A row whose dates or status no longer parse (usually a hand edit) is
//! skipped on read with a warning. Its status and notes are handed to the
//! reconciler so the next cycle can rebuild it from the scan.
//!
//! A second table, `status_overrides`, queues status changes submitted by
//! people between reconciliation cycles.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use revtrack_core::priority::parse_timestamp;
use revtrack_core::{
    DamagedRecord, Ledger, Priority, Result, RevtrackError, Status, StatusOverride, TrackedRecord, TrackingStore,
    UrgencyTier,
};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS reviews (
        link TEXT PRIMARY KEY CHECK (length(trim(link)) > 0),
        document_name TEXT NOT NULL,
        owner TEXT NOT NULL,
        created_at TEXT NOT NULL,
        modified_at TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'Pending'
            CHECK (status IN ('Pending', 'In Review', 'Approved', 'Needs Changes', 'Completed', 'Archived')),
        days_old INTEGER NOT NULL,
        days_since_update INTEGER NOT NULL,
        priority_score INTEGER NOT NULL,
        notes TEXT NOT NULL DEFAULT '',
        display_name TEXT NOT NULL,
        last_editor TEXT NOT NULL DEFAULT 'Unknown',
        archived_by_absence INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_reviews_priority ON reviews(priority_score DESC);
    CREATE INDEX IF NOT EXISTS idx_reviews_status ON reviews(status);

    CREATE TABLE IF NOT EXISTS status_overrides (
        link TEXT PRIMARY KEY CHECK (length(trim(link)) > 0),
        status TEXT NOT NULL
            CHECK (status IN ('Pending', 'In Review', 'Approved', 'Needs Changes', 'Completed', 'Archived')),
        notes TEXT,
        submitted_at TEXT NOT NULL
    );
";

/// How long a writer waits for another process holding the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn store_err(e: rusqlite::Error) -> RevtrackError {
    RevtrackError::StoreUnavailable(e.to_string())
}

fn to_text(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// A [`TrackingStore`] backed by a SQLite database file.
///
/// Tables are created lazily on the first write, so opening or reading a
/// database never changes it.
pub struct SqliteLedger {
    conn: Connection,
    schema_ready: bool,
}

impl SqliteLedger {
    /// Open or create a ledger at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::StoreUnavailable`] if the database cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                RevtrackError::StoreUnavailable(format!("{}: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(path).map_err(store_err)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(store_err)?;
        Ok(Self {
            conn,
            schema_ready: false,
        })
    }

    /// Create an in-memory ledger (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::StoreUnavailable`] if SQLite cannot allocate it.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Ok(Self {
            conn,
            schema_ready: false,
        })
    }

    /// Create tables, constraints and indexes if they do not exist yet.
    fn ensure_schema(&mut self) -> Result<()> {
        if !self.schema_ready {
            self.conn.execute_batch(SCHEMA).map_err(store_err)?;
            self.schema_ready = true;
        }
        Ok(())
    }

    fn has_table(&self, name: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()
            .map_err(store_err)?;
        Ok(found.is_some())
    }

    /// Queue a status change for the next cycle, replacing any earlier
    /// pending change for the same document.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::MalformedIdentity`] for a blank identity or
    /// [`RevtrackError::StoreUnavailable`] if the write fails.
    pub fn submit_override(
        &mut self,
        status_override: &StatusOverride,
        submitted_at: DateTime<Utc>,
    ) -> Result<()> {
        if status_override.identity.trim().is_empty() {
            return Err(RevtrackError::MalformedIdentity(
                "status override without a document link".to_string(),
            ));
        }
        self.ensure_schema()?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO status_overrides (link, status, notes, submitted_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    status_override.identity,
                    status_override.status.as_str(),
                    status_override.notes,
                    to_text(submitted_at),
                ],
            )
            .map_err(store_err)?;
        Ok(())
    }

    /// Number of tracked rows.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::StoreUnavailable`] if the query fails.
    pub fn count(&self) -> Result<u64> {
        if !self.has_table("reviews")? {
            return Ok(0);
        }
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))
            .map_err(store_err)?;
        Ok(count as u64)
    }
}

/// A `reviews` row before its text columns are interpreted.
struct RawRow {
    link: String,
    document_name: String,
    owner: String,
    created_at: String,
    modified_at: String,
    status: String,
    days_old: i64,
    days_since_update: i64,
    priority_score: i64,
    notes: String,
    display_name: String,
    last_editor: String,
    archived_by_absence: bool,
}

const SELECT_ROWS: &str = "
    SELECT link, document_name, owner, created_at, modified_at, status,
           days_old, days_since_update, priority_score, notes,
           display_name, last_editor, archived_by_absence
    FROM reviews";

fn load_rows(conn: &Connection) -> Result<Vec<RawRow>> {
    let mut stmt = conn.prepare(SELECT_ROWS).map_err(store_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RawRow {
                link: row.get(0)?,
                document_name: row.get(1)?,
                owner: row.get(2)?,
                created_at: row.get(3)?,
                modified_at: row.get(4)?,
                status: row.get(5)?,
                days_old: row.get(6)?,
                days_since_update: row.get(7)?,
                priority_score: row.get(8)?,
                notes: row.get(9)?,
                display_name: row.get(10)?,
                last_editor: row.get(11)?,
                archived_by_absence: row.get(12)?,
            })
        })
        .map_err(store_err)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

impl RawRow {
    /// Interpret the text columns. A row that fails keeps only its
    /// human-owned fields.
    fn into_record(self) -> std::result::Result<TrackedRecord, DamagedRecord> {
        let parsed = parse_timestamp("created_at", &self.created_at)
            .map_err(|e| e.to_string())
            .and_then(|created| {
                parse_timestamp("modified_at", &self.modified_at)
                    .map(|modified| (created, modified))
                    .map_err(|e| e.to_string())
            })
            .and_then(|(created, modified)| {
                self.status
                    .parse::<Status>()
                    .map(|status| (created, modified, status))
                    .map_err(|e| e.to_string())
            });

        let (created_at, modified_at, status) = match parsed {
            Ok(fields) => fields,
            Err(reason) => {
                return Err(DamagedRecord {
                    status: self.status.parse().unwrap_or_default(),
                    identity: self.link,
                    notes: self.notes,
                    reason,
                })
            }
        };

        Ok(TrackedRecord {
            identity: self.link,
            display_name: self.display_name,
            topic: self.document_name,
            owner: self.owner,
            created_at,
            modified_at,
            last_editor: self.last_editor,
            status,
            notes: self.notes,
            archived_by_absence: self.archived_by_absence,
            priority: Priority {
                days_since_created: self.days_old,
                days_since_modified: self.days_since_update,
                score: self.priority_score,
                tier: UrgencyTier::from_score(self.priority_score),
            },
        })
    }
}

impl TrackingStore for SqliteLedger {
    fn read_all(&self) -> Result<Ledger> {
        if !self.has_table("reviews")? {
            return Ok(Ledger::new());
        }

        let mut ledger = Ledger::new();
        for row in load_rows(&self.conn)? {
            match row.into_record() {
                Ok(record) => ledger.insert(record)?,
                Err(damaged) => {
                    warn!(
                        link = %damaged.identity,
                        reason = %damaged.reason,
                        "unreadable ledger row, keeping its status and notes until the document is scanned again"
                    );
                    ledger.insert_damaged(damaged)?;
                }
            }
        }
        Ok(ledger)
    }

    fn replace_all(&mut self, records: &[TrackedRecord]) -> Result<()> {
        self.ensure_schema()?;

        let incoming: HashSet<&str> = records.iter().map(|r| r.identity.as_str()).collect();

        let tx = self.conn.transaction().map_err(store_err)?;
        {
            // Unreadable rows nobody rebuilt stay as they are, so a bad hand
            // edit never costs the row its status and notes.
            let mut delete = tx
                .prepare("DELETE FROM reviews WHERE link = ?1")
                .map_err(store_err)?;
            for row in load_rows(&tx)? {
                let link = row.link.clone();
                let keep = !incoming.contains(link.as_str()) && row.into_record().is_err();
                if !keep {
                    delete.execute(params![link]).map_err(store_err)?;
                }
            }

            let mut insert = tx
                .prepare(
                    "INSERT INTO reviews
                    (link, document_name, owner, created_at, modified_at, status,
                     days_old, days_since_update, priority_score, notes,
                     display_name, last_editor, archived_by_absence)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                )
                .map_err(store_err)?;

            for record in records {
                insert
                    .execute(params![
                        record.identity,
                        record.topic,
                        record.owner,
                        to_text(record.created_at),
                        to_text(record.modified_at),
                        record.status.as_str(),
                        record.priority.days_since_created,
                        record.priority.days_since_modified,
                        record.priority.score,
                        record.notes,
                        record.display_name,
                        record.last_editor,
                        record.archived_by_absence,
                    ])
                    .map_err(store_err)?;
            }
        }
        // Dropping an uncommitted transaction rolls it back.
        tx.commit().map_err(store_err)?;

        debug!(rows = records.len(), "ledger replaced");
        Ok(())
    }

    fn pending_overrides(&self) -> Result<Vec<StatusOverride>> {
        if !self.has_table("status_overrides")? {
            return Ok(Vec::new());
        }

        let mut stmt = self
            .conn
            .prepare(
                "SELECT link, status, notes FROM status_overrides
                 ORDER BY submitted_at, link",
            )
            .map_err(store_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })
            .map_err(store_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(store_err)?;

        rows.into_iter()
            .map(|(identity, status, notes)| {
                let status = status.parse::<Status>().map_err(|e| {
                    RevtrackError::StoreUnavailable(format!("override '{identity}': {e}"))
                })?;
                Ok(StatusOverride {
                    identity,
                    status,
                    notes,
                })
            })
            .collect()
    }

    fn acknowledge_overrides(&mut self, applied: &[StatusOverride]) -> Result<()> {
        if applied.is_empty() || !self.has_table("status_overrides")? {
            return Ok(());
        }

        let tx = self.conn.transaction().map_err(store_err)?;
        {
            let mut delete = tx
                .prepare(
                    "DELETE FROM status_overrides
                     WHERE link = ?1 AND status = ?2 AND notes IS ?3",
                )
                .map_err(store_err)?;
            for o in applied {
                delete
                    .execute(params![o.identity, o.status.as_str(), o.notes])
                    .map_err(store_err)?;
            }
        }
        tx.commit().map_err(store_err)?;
        Ok(())
    }
}
