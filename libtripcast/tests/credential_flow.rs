//! Credential store integration tests
//!
//! Verifies the read-after-write invariant: a credential updated at
//! runtime is used by the very next outbound call of a component that was
//! constructed earlier.

use std::sync::Arc;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use libtripcast::credentials::{CredentialKey, CredentialStore};
use libtripcast::media::ImageFetcher;
use libtripcast::textgen::TextGenerator;

#[tokio::test]
async fn test_image_fetcher_sees_updated_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photos/random"))
        .and(header("Authorization", "Client-ID rotated-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "urls": { "regular": "https://images.example/x.jpg" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Arc::new(CredentialStore::new());
    credentials.set(CredentialKey::ImageSearchKey, "initial-key");

    // Component is constructed before the rotation
    let fetcher = ImageFetcher::new(&server.uri(), credentials.clone()).unwrap();
    credentials.set(CredentialKey::ImageSearchKey, "rotated-key");

    let url = fetcher.fetch_image("alps").await.unwrap();
    assert!(url.is_some());
}

#[tokio::test]
async fn test_text_generator_sees_key_set_after_construction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(header("Authorization", "Bearer late-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "index": 0, "text": "Adventure awaits." }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Arc::new(CredentialStore::new());
    let generator = TextGenerator::new(&server.uri(), "test-model", credentials.clone()).unwrap();

    // Key arrives only after the component exists, as it does when
    // supplied through /api_keys
    credentials.set(CredentialKey::TextGenKey, "late-key");

    let text = generator.generate(None).await.unwrap();
    assert_eq!(text, "Adventure awaits.");
}
