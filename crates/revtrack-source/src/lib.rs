//! # revtrack-source
//!
//! Document source for revtrack: a folder of review documents.
//!
//! The folder is the source of truth for which documents exist. Nothing in
//! this crate writes to it; the ledger is derived from what is listed here.

pub mod folder;
pub mod frontmatter;

pub use folder::{identity_of, FolderSource};
