//! Posting pipeline
//!
//! The fetch-image → download → upload → post chain behind
//! `/schedule_tweet`, modeled as an explicit short pipeline whose failure
//! carries the stage it happened in. If the image search answers without
//! a usable URL the pipeline degrades to a text-only post; if any HTTP
//! call fails the whole request fails with its stage tag, and side
//! effects already performed (a downloaded file, an uploaded media) are
//! not rolled back.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::error::TripcastError;
use crate::media::{ImageFetcher, SCHEDULED_IMAGE_FILENAME};
use crate::platforms::Platform;

/// Image-search keyword used when the request supplies none.
pub const DEFAULT_IMAGE_QUERY: &str = "travel";

/// The stage a pipeline failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStage {
    ImageSearch,
    ImageDownload,
    MediaUpload,
    StatusPost,
}

impl std::fmt::Display for PostStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostStage::ImageSearch => write!(f, "image search"),
            PostStage::ImageDownload => write!(f, "image download"),
            PostStage::MediaUpload => write!(f, "media upload"),
            PostStage::StatusPost => write!(f, "status post"),
        }
    }
}

/// A pipeline failure, tagged with the stage that produced it.
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: PostStage,
    #[source]
    pub source: TripcastError,
}

/// Successful pipeline result.
#[derive(Debug, Clone)]
pub struct PostOutcome {
    /// Platform-issued post id
    pub post_id: String,
    /// Whether a fetched image was attached
    pub media_attached: bool,
}

/// The fetch-image → upload → post pipeline.
pub struct PostPipeline {
    platform: Arc<dyn Platform>,
    fetcher: ImageFetcher,
    static_dir: PathBuf,
}

impl PostPipeline {
    pub fn new(platform: Arc<dyn Platform>, fetcher: ImageFetcher, static_dir: PathBuf) -> Self {
        Self {
            platform,
            fetcher,
            static_dir,
        }
    }

    /// Post `text`, attaching an image found for `image_query` when the
    /// image service yields one.
    pub async fn run(
        &self,
        text: &str,
        image_query: Option<&str>,
    ) -> std::result::Result<PostOutcome, PipelineError> {
        let query = match image_query {
            Some(q) if !q.trim().is_empty() => q,
            _ => DEFAULT_IMAGE_QUERY,
        };

        let image_url = self
            .fetcher
            .fetch_image(query)
            .await
            .map_err(|source| PipelineError {
                stage: PostStage::ImageSearch,
                source,
            })?;

        let media = match image_url {
            Some(url) => {
                let image_path = self.static_dir.join(SCHEDULED_IMAGE_FILENAME);
                self.fetcher
                    .download_to(&url, &image_path)
                    .await
                    .map_err(|source| PipelineError {
                        stage: PostStage::ImageDownload,
                        source,
                    })?;

                let media = self
                    .platform
                    .upload_media(&image_path)
                    .await
                    .map_err(|source| PipelineError {
                        stage: PostStage::MediaUpload,
                        source,
                    })?;
                Some(media)
            }
            None => {
                warn!(query = %query, "No image found; posting text-only");
                None
            }
        };

        let post_id = self
            .platform
            .post_status(text, media.as_ref())
            .await
            .map_err(|source| PipelineError {
                stage: PostStage::StatusPost,
                source,
            })?;

        info!(
            post_id = %post_id,
            media_attached = media.is_some(),
            "Scheduled post published"
        );

        Ok(PostOutcome {
            post_id,
            media_attached: media.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{CredentialKey, CredentialStore};
    use crate::platforms::mock::MockPlatform;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn image_service(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    fn fetcher(base_url: &str) -> ImageFetcher {
        let credentials = Arc::new(CredentialStore::new());
        credentials.set(CredentialKey::ImageSearchKey, "img-key");
        ImageFetcher::new(base_url, credentials).unwrap()
    }

    #[tokio::test]
    async fn test_pipeline_attaches_fetched_image() {
        let server = MockServer::start().await;
        // Serve the photo itself from the same mock server
        Mock::given(method("GET"))
            .and(path("/lisbon.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .and(query_param("query", "lisbon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "urls": { "regular": format!("{}/lisbon.jpg", server.uri()) }
            })))
            .mount(&server)
            .await;

        let platform = Arc::new(MockPlatform::success());
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PostPipeline::new(
            platform.clone(),
            fetcher(&server.uri()),
            dir.path().to_path_buf(),
        );

        let outcome = pipeline.run("Hello Lisbon", Some("lisbon")).await.unwrap();

        assert!(outcome.media_attached);
        let posted = platform.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, "Hello Lisbon");
        assert!(posted[0].1.is_some());
        assert!(dir.path().join(SCHEDULED_IMAGE_FILENAME).exists());
    }

    #[tokio::test]
    async fn test_pipeline_posts_text_only_when_no_url() {
        let server = image_service(serde_json::json!({ "id": "no-urls" })).await;
        let platform = Arc::new(MockPlatform::success());
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PostPipeline::new(
            platform.clone(),
            fetcher(&server.uri()),
            dir.path().to_path_buf(),
        );

        let outcome = pipeline.run("Just words", None).await.unwrap();

        assert!(!outcome.media_attached);
        let posted = platform.posted.lock().unwrap();
        assert_eq!(posted[0].1, None);
    }

    #[tokio::test]
    async fn test_pipeline_defaults_image_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .and(query_param("query", DEFAULT_IMAGE_QUERY))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let platform = Arc::new(MockPlatform::success());
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PostPipeline::new(
            platform,
            fetcher(&server.uri()),
            dir.path().to_path_buf(),
        );

        pipeline.run("Wanderlust", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_pipeline_image_service_failure_fails_whole_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let platform = Arc::new(MockPlatform::success());
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PostPipeline::new(
            platform.clone(),
            fetcher(&server.uri()),
            dir.path().to_path_buf(),
        );

        let error = pipeline.run("Doomed", None).await.unwrap_err();

        assert_eq!(error.stage, PostStage::ImageSearch);
        // No silent fallback to a text-only post
        assert!(platform.posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pipeline_post_failure_is_stage_tagged() {
        let server = image_service(serde_json::json!({})).await;
        let platform = Arc::new(MockPlatform::post_failure("instance down"));
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PostPipeline::new(
            platform,
            fetcher(&server.uri()),
            dir.path().to_path_buf(),
        );

        let error = pipeline.run("Doomed", None).await.unwrap_err();
        assert_eq!(error.stage, PostStage::StatusPost);
        assert!(error.to_string().contains("status post"));
    }
}
