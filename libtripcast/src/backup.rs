//! Post history backup
//!
//! Writes the fetched post history to a CSV file at a fixed path under
//! the static directory, overwriting any prior backup.

use std::path::Path;

use tracing::info;

use crate::error::{BackupError, Result};
use crate::types::Post;

/// Filename of the backup CSV under the static directory.
pub const BACKUP_FILENAME: &str = "tweets_backup.csv";

/// Write `posts` as CSV records of (text, created_at).
///
/// Timestamps are RFC 3339. Returns the number of data rows written.
pub fn write_backup(posts: &[Post], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(BackupError::Io)?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(BackupError::Csv)?;
    writer
        .write_record(["text", "created_at"])
        .map_err(BackupError::Csv)?;

    for post in posts {
        let created_at = post.created_at.to_rfc3339();
        writer
            .write_record([post.text.as_str(), created_at.as_str()])
            .map_err(BackupError::Csv)?;
    }

    writer.flush().map_err(BackupError::Io)?;

    info!(path = %path.display(), rows = posts.len(), "Post history backed up");
    Ok(posts.len())
}
