//! Core types for Tripcast

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single status update fetched from the social platform.
///
/// Immutable once fetched; posts are never stored beyond the current
/// request except when written to the backup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Platform-issued status id
    pub id: String,
    /// Text body (as returned by the platform)
    pub text: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Reshare (boost/retweet) count
    pub reshares: u32,
    /// Like (favourite) count
    pub likes: u32,
}

/// Platform-issued identifier for an uploaded media file.
///
/// Exists only for the duration of the posting request that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    pub id: String,
}

impl MediaReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Outcome of a direct-message attempt.
///
/// A platform rejection is the one error in the system that is converted
/// into a structured result instead of propagated: callers render it as a
/// normal response with an error description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmOutcome {
    Sent,
    Rejected(String),
}

/// A file persisted under the public static directory.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Absolute path of the stored file
    pub path: std::path::PathBuf,
    /// Sanitized filename the file was stored under
    pub filename: String,
    /// File size in bytes
    pub size: u64,
    /// SHA-256 digest of the content (hex encoded)
    pub sha256: String,
}
