//! Digest file serialization.
//!
//! A run's records are rendered into a flat text file of Title/Category/Summary
//! blocks separated by a fixed rule of `=` characters. The whole digest is
//! staged next to the target file and renamed over it, so readers never observe
//! a partially written digest and an interrupted run leaves the previous file
//! intact.

use crate::pipeline::{Category, DigestRecord};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Separator line terminating each digest block.
pub const SEPARATOR: &str = "==================================================";

/// Errors raised while persisting the digest file.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Filesystem failure while staging or publishing the digest.
    #[error("Failed to write digest file {path}: {source}")]
    Write {
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying filesystem error.
        source: std::io::Error,
    },
}

fn render(records: &[DigestRecord]) -> String {
    let mut buffer = String::new();
    for record in records {
        let _ = writeln!(buffer, "Title: {}", record.title);
        let _ = writeln!(buffer, "Category: {}", record.category);
        let _ = writeln!(buffer, "Summary: {}", record.summary);
        let _ = writeln!(buffer, "{SEPARATOR}");
        buffer.push('\n');
    }
    buffer
}

/// Write all records of a run to the digest file, replacing any previous digest.
///
/// An empty run produces an empty file.
pub async fn write_records(records: &[DigestRecord], path: &Path) -> Result<(), SinkError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| SinkError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let staged = path.with_extension("tmp");
    tokio::fs::write(&staged, render(records).as_bytes())
        .await
        .map_err(|source| SinkError::Write {
            path: staged.clone(),
            source,
        })?;
    tokio::fs::rename(&staged, path)
        .await
        .map_err(|source| SinkError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(records = records.len(), path = %path.display(), "Digest file written");
    Ok(())
}

/// Parse a digest file back into records.
///
/// Lines outside Title/Category/Summary blocks are ignored, and category
/// labels that fail to parse map to [`Category::Uncategorized`].
pub fn parse_records(contents: &str) -> Vec<DigestRecord> {
    let mut records = Vec::new();
    let mut lines = contents.lines();
    while let Some(line) = lines.next() {
        let Some(title) = line.strip_prefix("Title: ") else {
            continue;
        };
        let (Some(category_line), Some(summary_line)) = (lines.next(), lines.next()) else {
            break;
        };
        let (Some(category), Some(summary)) = (
            category_line.strip_prefix("Category: "),
            summary_line.strip_prefix("Summary: "),
        ) else {
            continue;
        };
        records.push(DigestRecord {
            title: title.to_string(),
            category: category.parse().unwrap_or(Category::Uncategorized),
            summary: summary.to_string(),
        });
    }
    records
}
