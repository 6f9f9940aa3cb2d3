//! Rendering of ledger rows and summaries: JSON or an aligned text table.

use chrono::SecondsFormat;
use serde::Serialize;

use revtrack_core::{Summary, TrackedRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// One line of `revtrack list`, in board column order.
#[derive(Debug, Clone, Serialize)]
pub struct ListRow {
    pub document_name: String,
    pub owner: String,
    pub created_at: String,
    pub modified_at: String,
    pub status: String,
    pub days_old: i64,
    pub days_since_update: i64,
    pub priority_score: i64,
    pub tier: String,
    pub tint: String,
    pub link: String,
    pub notes: String,
    pub last_editor: String,
}

impl From<&TrackedRecord> for ListRow {
    fn from(record: &TrackedRecord) -> Self {
        Self {
            document_name: record.topic.clone(),
            owner: record.owner.clone(),
            created_at: record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            modified_at: record.modified_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            status: record.status.to_string(),
            days_old: record.priority.days_since_created,
            days_since_update: record.priority.days_since_modified,
            priority_score: record.priority.score,
            tier: record.priority.tier.label().to_string(),
            tint: record.priority.tier.tint().to_string(),
            link: record.identity.clone(),
            notes: record.notes.clone(),
            last_editor: record.last_editor.clone(),
        }
    }
}

#[must_use]
pub fn format_rows(rows: &[ListRow], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(rows),
        OutputFormat::Table => {
            let header = [
                "Priority", "Score", "Document", "Owner", "Status", "Days Old", "Idle", "Link",
            ];
            let cells: Vec<Vec<String>> = rows
                .iter()
                .map(|r| {
                    vec![
                        r.tier.clone(),
                        r.priority_score.to_string(),
                        r.document_name.clone(),
                        r.owner.clone(),
                        r.status.clone(),
                        r.days_old.to_string(),
                        r.days_since_update.to_string(),
                        r.link.clone(),
                    ]
                })
                .collect();
            table(&header, &cells)
        }
    }
}

#[must_use]
pub fn format_summary(summary: &Summary, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(summary),
        OutputFormat::Table => {
            let mut out = format!(
                "{} tracked, {} open\n\n",
                summary.total,
                summary.open_count()
            );

            let by_status: Vec<Vec<String>> = summary
                .by_status
                .iter()
                .map(|(status, figures)| {
                    vec![
                        status.to_string(),
                        figures.count.to_string(),
                        format!("{:.1}", figures.mean_days_old),
                    ]
                })
                .collect();
            out.push_str(&table(&["Status", "Count", "Mean Days Old"], &by_status));
            out.push('\n');

            let by_tier: Vec<Vec<String>> = summary
                .by_tier
                .iter()
                .rev()
                .map(|(tier, count)| vec![tier.label().to_string(), count.to_string()])
                .collect();
            out.push_str(&table(&["Priority", "Count"], &by_tier));
            out
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "(no results)\n".to_string();
    }

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = line(header.iter().copied(), &widths);
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

fn line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:width$}"))
        .collect();
    padded.join(" | ").trim_end().to_string()
}
