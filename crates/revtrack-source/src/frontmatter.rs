//! YAML frontmatter on markdown review documents.
//!
//! A markdown document may pin its own metadata instead of relying on the
//! file system:
//! ```markdown
//! ---
//! title: "System Design - [Jane Doe]"
//! created_at: 2025-02-10T09:15:00Z
//! modified_at: 2025-02-12 16:00:00
//! last_editor: Jane Doe
//! ---
//!
//! ## Body
//! ```

use serde::Deserialize;

/// Metadata keys recognised in frontmatter. Other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentMeta {
    pub title: Option<String>,
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
    pub last_editor: Option<String>,
}

/// Split `content` into the raw YAML between `---` delimiters and the body.
///
/// Returns `None` when the content has no complete frontmatter block.
#[must_use]
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let content = content.trim_start_matches('\u{feff}').trim_start();
    let after_open = content.strip_prefix("---")?;
    let after_open = after_open.trim_start_matches(['\r', '\n']);

    let close = after_open.find("\n---")?;
    let yaml = &after_open[..close];
    let rest = &after_open[close + 4..];
    let body = rest.strip_prefix('\r').unwrap_or(rest);
    let body = body.strip_prefix('\n').unwrap_or(body);

    Some((yaml, body))
}

/// Parse the frontmatter block of `content`.
///
/// `Ok(None)` means there is no frontmatter; `Err` means there is one but it
/// is not valid YAML.
///
/// # Errors
///
/// Returns the YAML error message.
pub fn parse_meta(content: &str) -> Result<Option<DocumentMeta>, String> {
    let Some((yaml, _)) = split_frontmatter(content) else {
        return Ok(None);
    };
    if yaml.trim().is_empty() {
        return Ok(Some(DocumentMeta::default()));
    }
    serde_yaml::from_str(yaml).map(Some).map_err(|e| e.to_string())
}
