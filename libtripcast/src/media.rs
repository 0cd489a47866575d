//! Image search and media file handling
//!
//! [`ImageFetcher`] queries the image-search service for a photo matching
//! a keyword and can download the result to a local path. The free
//! functions persist uploaded files under the public static directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::credentials::{CredentialKey, CredentialStore};
use crate::error::{MediaError, Result};
use crate::types::StoredUpload;

/// Filename used for images downloaded on behalf of a post.
pub const SCHEDULED_IMAGE_FILENAME: &str = "scheduled_travel_image.jpg";

/// Response shape of the random-photo endpoint; only the URL map is read.
#[derive(Debug, Deserialize)]
struct RandomPhotoResponse {
    #[serde(default)]
    urls: Option<PhotoUrls>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
}

/// Client for the image-search service.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
}

impl ImageFetcher {
    pub fn new(base_url: &str, credentials: Arc<CredentialStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MediaError::Search(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Search for a random photo matching `query`.
    ///
    /// Returns the regular-size image URL, or `Ok(None)` when the service
    /// answers successfully but without one. Transport errors, error
    /// statuses and unparseable bodies are errors; never retried.
    pub async fn fetch_image(&self, query: &str) -> Result<Option<String>> {
        let key = self
            .credentials
            .get(CredentialKey::ImageSearchKey)
            .ok_or(MediaError::MissingKey)?;

        let url = format!("{}/photos/random", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .header(
                "Authorization",
                format!("Client-ID {}", key.expose_secret()),
            )
            .send()
            .await
            .map_err(|e| MediaError::Search(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                MediaError::Search(format!("Service returned {}: {}", status, body)).into(),
            );
        }

        let photo: RandomPhotoResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Search(format!("Invalid response body: {}", e)))?;

        let image_url = photo.urls.and_then(|u| u.regular);
        if image_url.is_none() {
            warn!(query = %query, "Image search returned no usable URL");
        }
        Ok(image_url)
    }

    /// Download an image to a local path, overwriting any prior file.
    pub async fn download_to(&self, image_url: &str, path: &Path) -> Result<()> {
        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(|e| MediaError::Download(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(MediaError::Download(format!(
                "Image host returned {}",
                response.status()
            ))
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::Download(format!("Failed to read body: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(MediaError::Io)?;
        }
        std::fs::write(path, &bytes).map_err(MediaError::Io)?;

        debug!(path = %path.display(), bytes = bytes.len(), "Image downloaded");
        Ok(())
    }
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Path separators and parent components are stripped; an empty result
/// falls back to a generated name so an upload can never escape the
/// static directory.
pub fn sanitize_filename(raw: &str) -> String {
    let candidate = Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .trim()
        .to_string();

    if candidate.is_empty() || candidate == "." || candidate == ".." {
        format!("upload-{}", uuid::Uuid::new_v4())
    } else {
        candidate
    }
}

/// Persist an uploaded file under the static directory.
///
/// Returns the stored path together with the file's size and SHA-256
/// digest.
pub fn store_upload(static_dir: &Path, filename: &str, bytes: &[u8]) -> Result<StoredUpload> {
    std::fs::create_dir_all(static_dir).map_err(MediaError::Io)?;

    let safe_name = sanitize_filename(filename);
    let path: PathBuf = static_dir.join(&safe_name);
    std::fs::write(&path, bytes).map_err(MediaError::Io)?;

    let digest = Sha256::digest(bytes);
    let stored = StoredUpload {
        path,
        filename: safe_name,
        size: bytes.len() as u64,
        sha256: hex::encode(digest),
    };

    debug!(
        filename = %stored.filename,
        size = stored.size,
        sha256 = %stored.sha256,
        "Upload stored"
    );
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(base_url: &str) -> ImageFetcher {
        let credentials = Arc::new(CredentialStore::new());
        credentials.set(CredentialKey::ImageSearchKey, "test-image-key");
        ImageFetcher::new(base_url, credentials).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_image_returns_regular_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .and(query_param("query", "lisbon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "urls": {
                    "regular": "https://images.example/lisbon.jpg",
                    "small": "https://images.example/lisbon-small.jpg"
                }
            })))
            .mount(&server)
            .await;

        let url = fetcher(&server.uri()).fetch_image("lisbon").await.unwrap();
        assert_eq!(url.as_deref(), Some("https://images.example/lisbon.jpg"));
    }

    #[tokio::test]
    async fn test_fetch_image_absent_url_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "abc123"
            })))
            .mount(&server)
            .await;

        let url = fetcher(&server.uri()).fetch_image("nowhere").await.unwrap();
        assert!(url.is_none());
    }

    #[tokio::test]
    async fn test_fetch_image_error_status_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = fetcher(&server.uri()).fetch_image("anywhere").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_image_non_json_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let result = fetcher(&server.uri()).fetch_image("anywhere").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_image_without_key_is_error() {
        let credentials = Arc::new(CredentialStore::new());
        let fetcher = ImageFetcher::new("http://127.0.0.1:1", credentials).unwrap();
        let result = fetcher.fetch_image("anywhere").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_download_to_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photo.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(SCHEDULED_IMAGE_FILENAME);
        fetcher(&server.uri())
            .download_to(&format!("{}/photo.jpg", server.uri()), &target)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"jpeg-bytes");
    }

    #[test]
    fn test_sanitize_filename_strips_paths() {
        assert_eq!(sanitize_filename("beach.png"), "beach.png");
        assert_eq!(sanitize_filename("photos/beach.png"), "beach.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
    }

    #[test]
    fn test_sanitize_filename_empty_falls_back_to_generated() {
        let name = sanitize_filename("");
        assert!(name.starts_with("upload-"));

        let name = sanitize_filename("..");
        assert!(name.starts_with("upload-"));
    }

    #[test]
    fn test_store_upload_records_digest() {
        let dir = tempfile::tempdir().unwrap();
        let stored = store_upload(dir.path(), "beach.png", b"pixels").unwrap();

        assert_eq!(stored.filename, "beach.png");
        assert_eq!(stored.size, 6);
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"pixels");
        // SHA-256 of "pixels"
        assert_eq!(stored.sha256.len(), 64);
    }

    #[test]
    fn test_store_upload_cannot_escape_static_dir() {
        let dir = tempfile::tempdir().unwrap();
        let stored = store_upload(dir.path(), "../escape.txt", b"data").unwrap();
        assert!(stored.path.starts_with(dir.path()));
    }
}
