//! Mock platform implementation for testing
//!
//! A configurable stand-in for the social platform that records every
//! call and can be told to succeed, reject, or fail. Used by the server
//! integration tests to exercise the HTTP surface without credentials or
//! network access.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{DmOutcome, MediaReference, Post};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Whether posting should succeed
    pub post_succeeds: bool,

    /// Error to return on posting failure
    pub post_error: Option<String>,

    /// DM outcome to return (None means transport failure)
    pub dm_outcome: Option<DmOutcome>,

    /// Whether media upload should succeed
    pub upload_succeeds: bool,

    /// Number of posts to fabricate for `recent_posts`
    pub history_len: usize,

    /// Character limit for validation
    pub character_limit: Option<usize>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            post_succeeds: true,
            post_error: None,
            dm_outcome: Some(DmOutcome::Sent),
            upload_succeeds: true,
            history_len: 3,
            character_limit: Some(500),
        }
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,

    /// Statuses that have been posted, with the media id attached (if any)
    pub posted: Arc<Mutex<Vec<(String, Option<String>)>>>,

    /// Direct messages that have been attempted as (user, message)
    pub dms: Arc<Mutex<Vec<(String, String)>>>,

    /// Paths passed to `upload_media`
    pub uploads: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            posted: Arc::new(Mutex::new(Vec::new())),
            dms: Arc::new(Mutex::new(Vec::new())),
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A mock where every operation succeeds
    pub fn success() -> Self {
        Self::new(MockConfig::default())
    }

    /// A mock whose post operation fails
    pub fn post_failure(error: &str) -> Self {
        Self::new(MockConfig {
            post_succeeds: false,
            post_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A mock whose DM attempts are rejected by the platform
    pub fn dm_rejection(description: &str) -> Self {
        Self::new(MockConfig {
            dm_outcome: Some(DmOutcome::Rejected(description.to_string())),
            ..Default::default()
        })
    }

    /// A mock with a fabricated history of `len` posts
    pub fn with_history(len: usize) -> Self {
        Self::new(MockConfig {
            history_len: len,
            ..Default::default()
        })
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn name(&self) -> &str {
        "mock"
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }

    fn validate_content(&self, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
        }
        if let Some(limit) = self.config.character_limit {
            if content.chars().count() > limit {
                return Err(PlatformError::Validation(format!(
                    "Content exceeds the {} character limit",
                    limit
                ))
                .into());
            }
        }
        Ok(())
    }

    async fn verify(&self) -> Result<String> {
        Ok("mock@example.social".to_string())
    }

    async fn post_status(&self, text: &str, media: Option<&MediaReference>) -> Result<String> {
        self.validate_content(text)?;

        if !self.config.post_succeeds {
            let message = self
                .config
                .post_error
                .clone()
                .unwrap_or_else(|| "Mock posting failure".to_string());
            return Err(PlatformError::Posting(message).into());
        }

        let mut posted = self.posted.lock().unwrap();
        posted.push((text.to_string(), media.map(|m| m.id.clone())));
        Ok(format!("mock-post-{}", posted.len()))
    }

    async fn send_direct_message(&self, user: &str, message: &str) -> Result<DmOutcome> {
        self.dms
            .lock()
            .unwrap()
            .push((user.to_string(), message.to_string()));

        match &self.config.dm_outcome {
            Some(outcome) => Ok(outcome.clone()),
            None => Err(PlatformError::Network("Mock transport failure".to_string()).into()),
        }
    }

    async fn upload_media(&self, path: &Path) -> Result<MediaReference> {
        if !self.config.upload_succeeds {
            return Err(PlatformError::Posting("Mock upload failure".to_string()).into());
        }

        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(path.to_path_buf());
        Ok(MediaReference::new(format!("mock-media-{}", uploads.len())))
    }

    async fn recent_posts(&self, count: u32) -> Result<Vec<Post>> {
        let len = self.config.history_len.min(count as usize);
        let now = Utc::now();
        Ok((0..len)
            .map(|i| Post {
                id: format!("mock-{}", i),
                text: format!("Travel log entry {}", i),
                created_at: now - Duration::minutes(i as i64),
                reshares: (i as u32) * 2,
                likes: (i as u32) * 5 + 1,
            })
            .collect())
    }
}
