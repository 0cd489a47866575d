//! Social platform abstraction and implementations
//!
//! A single trait covers everything the HTTP surface needs from the
//! social platform: posting a status (optionally with uploaded media),
//! sending a direct message, uploading a media file, and fetching the
//! authenticated account's recent post history. The production
//! implementation speaks the Mastodon API through megalodon; a mock
//! implementation backs the integration tests.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DmOutcome, MediaReference, Post};

pub mod mastodon;

// Mock platform is available for all builds (not just tests) to support
// integration tests in dependent crates.
pub mod mock;

/// Unified interface to the social platform.
///
/// Every method issues at most one platform API call and maps failures
/// into the [`crate::error::PlatformError`] taxonomy, so callers always
/// receive a structured outcome.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Lowercase platform identifier (e.g., "mastodon")
    fn name(&self) -> &str;

    /// Maximum characters allowed in a post, or `None` if unbounded
    fn character_limit(&self) -> Option<usize>;

    /// Check content against platform requirements before posting.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Validation` when the content is empty or
    /// exceeds the character limit.
    fn validate_content(&self, content: &str) -> Result<()>;

    /// Verify the stored credentials against the platform.
    ///
    /// Returns the authenticated account handle. Called once at startup;
    /// a failure is logged, not fatal.
    async fn verify(&self) -> Result<String>;

    /// Create a post, optionally attaching previously uploaded media.
    ///
    /// Returns the platform-issued post id.
    async fn post_status(&self, text: &str, media: Option<&MediaReference>) -> Result<String>;

    /// Send a direct message to a user.
    ///
    /// A rejection from the platform is converted into
    /// [`DmOutcome::Rejected`] with a description rather than an error;
    /// only transport failures surface as `Err`.
    async fn send_direct_message(&self, user: &str, message: &str) -> Result<DmOutcome>;

    /// Upload a local file to the platform's media storage.
    async fn upload_media(&self, path: &Path) -> Result<MediaReference>;

    /// Fetch the authenticated account's most recent posts, newest first.
    async fn recent_posts(&self, count: u32) -> Result<Vec<Post>>;
}
