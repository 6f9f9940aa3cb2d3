//! Folder-backed [`DocumentSource`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use revtrack_core::{DocumentSource, Result, RevtrackError, ScannedDocument, Timestamp};

use crate::frontmatter::{parse_meta, DocumentMeta};

/// Lists the review documents in one folder.
///
/// Every regular, non-hidden file directly inside the folder whose extension
/// is in the allow-list is a document. Its identity is the `file://` URL of
/// its canonical path, its display name is the file name without extension
/// and its dates come from the file system, unless a markdown file pins
/// them in frontmatter.
#[derive(Debug, Clone)]
pub struct FolderSource {
    root: PathBuf,
    extensions: Vec<String>,
}

impl FolderSource {
    /// `extensions` are matched case-insensitively, without the dot.
    /// An empty list accepts every file.
    pub fn new(root: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_eligible(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_ascii_lowercase()))
    }

    fn scan_file(&self, path: &Path) -> Result<ScannedDocument> {
        let unavailable =
            |e: std::io::Error| RevtrackError::SourceUnavailable(format!("{}: {e}", path.display()));

        let metadata = fs::metadata(path).map_err(unavailable)?;
        let modified: DateTime<Utc> = metadata.modified().map_err(unavailable)?.into();
        // Birth time is not recorded on every file system.
        let created: DateTime<Utc> = metadata.created().map(Into::into).unwrap_or(modified);

        let identity = identity_of(path).map_err(unavailable)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let meta = if is_markdown(path) {
            read_meta(path)
        } else {
            DocumentMeta::default()
        };

        let created_at = meta
            .created_at
            .map_or(Timestamp::Instant(created), Timestamp::Text);
        let modified_at = meta
            .modified_at
            .map_or(Timestamp::Instant(modified), Timestamp::Text);
        let display_name = meta.title.unwrap_or(stem);

        let mut doc = ScannedDocument::new(identity, display_name, created_at, modified_at);
        doc.last_editor = meta.last_editor;
        Ok(doc)
    }
}

impl DocumentSource for FolderSource {
    fn list_documents(&self) -> Result<Vec<ScannedDocument>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            RevtrackError::SourceUnavailable(format!("cannot list {}: {e}", self.root.display()))
        })?;

        let mut documents = Vec::new();
        for entry in entries {
            // A listing with holes would archive documents that still exist.
            let entry = entry.map_err(|e| {
                RevtrackError::SourceUnavailable(format!(
                    "error while listing {}: {e}",
                    self.root.display()
                ))
            })?;
            let path = entry.path();

            let is_hidden = entry.file_name().to_string_lossy().starts_with('.');
            if is_hidden || !path.is_file() || !self.is_eligible(&path) {
                debug!(path = %path.display(), "skipping non-document entry");
                continue;
            }

            documents.push(self.scan_file(&path)?);
        }

        documents.sort_by(|a, b| a.identity.cmp(&b.identity));
        debug!(root = %self.root.display(), count = documents.len(), "listed documents");
        Ok(documents)
    }
}

/// The identity a document at `path` is tracked under.
///
/// # Errors
///
/// Returns the I/O error if `path` cannot be canonicalized.
pub fn identity_of(path: &Path) -> std::io::Result<String> {
    let canonical = fs::canonicalize(path)?;
    Ok(format!("file://{}", canonical.display()))
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"))
}

/// Frontmatter of a markdown file, or defaults if it is absent or unreadable.
fn read_meta(path: &Path) -> DocumentMeta {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read document, using file metadata");
            return DocumentMeta::default();
        }
    };
    match parse_meta(&content) {
        Ok(meta) => meta.unwrap_or_default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "invalid frontmatter, using file metadata");
            DocumentMeta::default()
        }
    }
}
