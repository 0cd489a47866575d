//! Mastodon platform implementation
//!
//! Speaks the Mastodon API through the megalodon library. The megalodon
//! client is rebuilt from the credential store immediately before each
//! call, so a credential updated through `/api_keys` is observed by the
//! next outbound request without restarting the process.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use megalodon::megalodon::{
    GetAccountStatusesInputOptions, PostStatusInputOptions, PostStatusOutput,
};
use megalodon::{entities, Megalodon, SNS};
use secrecy::ExposeSecret;
use tracing::debug;

use crate::credentials::{CredentialKey, CredentialStore};
use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{DmOutcome, MediaReference, Post};

/// Default character limit for Mastodon instances.
const DEFAULT_CHARACTER_LIMIT: usize = 500;

/// Mastodon client
pub struct MastodonPlatform {
    /// The instance URL (e.g., "https://mastodon.social")
    instance_url: String,

    /// Shared credential store; the access token is read per call
    credentials: Arc<CredentialStore>,

    /// Character limit for posts
    character_limit: usize,
}

impl MastodonPlatform {
    /// Create a new Mastodon platform client.
    ///
    /// The instance URL is normalized to carry an `https://` prefix. No
    /// network traffic happens here; credentials are only read when an
    /// operation runs.
    pub fn new(instance: &str, credentials: Arc<CredentialStore>) -> Self {
        let instance_url = if instance.starts_with("http://") || instance.starts_with("https://") {
            instance.to_string()
        } else {
            format!("https://{}", instance)
        };

        Self {
            instance_url,
            credentials,
            character_limit: DEFAULT_CHARACTER_LIMIT,
        }
    }

    /// Build a megalodon client from the current access token.
    fn client(&self) -> Result<Box<dyn Megalodon + Send + Sync>> {
        let token = self
            .credentials
            .get(CredentialKey::AccessToken)
            .ok_or_else(|| {
                PlatformError::Authentication("access token is not configured".to_string())
            })?;

        megalodon::generator(
            SNS::Mastodon,
            self.instance_url.clone(),
            Some(token.expose_secret().to_string()),
            None,
        )
        .map_err(|e| {
            PlatformError::Authentication(format!("Failed to create Mastodon client: {:?}", e))
                .into()
        })
    }

    /// Resolve the authenticated account id.
    async fn account_id(&self, client: &(dyn Megalodon + Send + Sync)) -> Result<String> {
        let response = client
            .verify_account_credentials()
            .await
            .map_err(|e| map_megalodon_error(e, "verify credentials"))?;
        Ok(response.json.id)
    }
}

#[async_trait]
impl Platform for MastodonPlatform {
    fn name(&self) -> &str {
        "mastodon"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(self.character_limit)
    }

    fn validate_content(&self, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
        }

        let char_count = content.chars().count();
        if char_count > self.character_limit {
            return Err(PlatformError::Validation(format!(
                "Content exceeds the {} character limit (current: {} characters)",
                self.character_limit, char_count
            ))
            .into());
        }

        Ok(())
    }

    async fn verify(&self) -> Result<String> {
        let client = self.client()?;
        let response = client
            .verify_account_credentials()
            .await
            .map_err(|e| map_megalodon_error(e, "verify credentials"))?;
        Ok(response.json.acct)
    }

    async fn post_status(&self, text: &str, media: Option<&MediaReference>) -> Result<String> {
        self.validate_content(text)?;

        let client = self.client()?;
        let options = media.map(|m| PostStatusInputOptions {
            media_ids: Some(vec![m.id.clone()]),
            ..Default::default()
        });

        let response = client
            .post_status(text.to_string(), options.as_ref())
            .await
            .map_err(|e| map_megalodon_error(e, "post status"))?;

        let post_id = match response.json {
            PostStatusOutput::Status(status) => status.id,
            PostStatusOutput::ScheduledStatus(scheduled) => scheduled.id,
        };

        debug!(post_id = %post_id, "Status posted");
        Ok(post_id)
    }

    async fn send_direct_message(&self, user: &str, message: &str) -> Result<DmOutcome> {
        let client = self.client()?;

        // Mastodon models a DM as a direct-visibility status mentioning
        // the recipient.
        let handle = user.trim_start_matches('@');
        let content = format!("@{} {}", handle, message);
        let options = PostStatusInputOptions {
            visibility: Some(entities::StatusVisibility::Direct),
            ..Default::default()
        };

        match client.post_status(content, Some(&options)).await {
            Ok(_) => Ok(DmOutcome::Sent),
            Err(e) => {
                let mapped = map_megalodon_error(e, "send direct message");
                if let crate::error::TripcastError::Platform(ref platform_error) = mapped {
                    if platform_error.is_rejection() {
                        return Ok(DmOutcome::Rejected(platform_error.to_string()));
                    }
                }
                Err(mapped)
            }
        }
    }

    async fn upload_media(&self, path: &Path) -> Result<MediaReference> {
        let client = self.client()?;
        let file_path = path.to_string_lossy().into_owned();

        let response = client
            .upload_media(file_path, None)
            .await
            .map_err(|e| map_megalodon_error(e, "upload media"))?;

        let media_id = match response.json {
            entities::UploadMedia::Attachment(attachment) => attachment.id,
            entities::UploadMedia::AsyncAttachment(attachment) => attachment.id,
        };

        debug!(media_id = %media_id, "Media uploaded");
        Ok(MediaReference::new(media_id))
    }

    async fn recent_posts(&self, count: u32) -> Result<Vec<Post>> {
        let client = self.client()?;
        let account_id = self.account_id(client.as_ref()).await?;

        let options = GetAccountStatusesInputOptions {
            limit: Some(count),
            ..Default::default()
        };

        let response = client
            .get_account_statuses(account_id, Some(&options))
            .await
            .map_err(|e| map_megalodon_error(e, "fetch post history"))?;

        let posts = response
            .json
            .into_iter()
            .map(|status| Post {
                id: status.id,
                text: status.content,
                created_at: status.created_at,
                reshares: status.reblogs_count,
                likes: status.favourites_count,
            })
            .collect();

        Ok(posts)
    }
}

/// Map megalodon errors to the platform error taxonomy.
///
/// HTTP 401/403 → `Authentication`, 422 → `Validation`, 429 → `RateLimit`,
/// 5xx and everything without a recognizable status → `Network`, other
/// 4xx → `Posting`.
fn map_megalodon_error(error: megalodon::error::Error, context: &str) -> crate::error::TripcastError {
    let error_str = error.to_string();

    let platform_error = match extract_http_status(&error_str) {
        Some(401) | Some(403) => PlatformError::Authentication(format!(
            "Mastodon authentication failed ({}): {}",
            context, error_str
        )),
        Some(422) => PlatformError::Validation(format!(
            "Mastodon rejected the content ({}): {}",
            context, error_str
        )),
        Some(429) => PlatformError::RateLimit(format!(
            "Mastodon rate limit exceeded ({}): {}",
            context, error_str
        )),
        Some(500..=599) => PlatformError::Network(format!(
            "Mastodon server error ({}): {}",
            context, error_str
        )),
        Some(_) => PlatformError::Posting(format!("Mastodon error ({}): {}", context, error_str)),
        None => {
            let lower = error_str.to_lowercase();
            if lower.contains("unauthorized") || lower.contains("token") {
                PlatformError::Authentication(format!(
                    "Mastodon authentication failed ({}): {}",
                    context, error_str
                ))
            } else {
                PlatformError::Network(format!("Mastodon error ({}): {}", context, error_str))
            }
        }
    };

    platform_error.into()
}

/// Extract an HTTP status code from an error message string.
fn extract_http_status(error_str: &str) -> Option<u16> {
    for prefix in ["HTTP ", "status ", "code: ", "status_code: "] {
        if let Some(pos) = error_str.find(prefix) {
            if let Some(code_str) = error_str[pos + prefix.len()..].get(0..3) {
                if let Ok(code) = code_str.parse::<u16>() {
                    if (100..=599).contains(&code) {
                        return Some(code);
                    }
                }
            }
        }
    }
    None
}
