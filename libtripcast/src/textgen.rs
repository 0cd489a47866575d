//! Text-generation client
//!
//! Sends a prompt to the text-generation service's completions endpoint
//! and returns the trimmed completion. Single request/response; no retry,
//! no streaming.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credentials::{CredentialKey, CredentialStore};
use crate::error::{GeneratorError, Result};

/// Prompt used when the caller supplies none.
pub const DEFAULT_PROMPT: &str = "Write an engaging travel tweet:";

/// Fixed cap on completion length.
pub const MAX_COMPLETION_TOKENS: u32 = 50;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

/// Client for the text-generation service.
#[derive(Debug, Clone)]
pub struct TextGenerator {
    client: Client,
    base_url: String,
    model: String,
    credentials: Arc<CredentialStore>,
}

impl TextGenerator {
    pub fn new(base_url: &str, model: &str, credentials: Arc<CredentialStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| GeneratorError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            credentials,
        })
    }

    /// Generate completion text for `prompt`, falling back to
    /// [`DEFAULT_PROMPT`] when none is given.
    pub async fn generate(&self, prompt: Option<&str>) -> Result<String> {
        let key = self
            .credentials
            .get(CredentialKey::TextGenKey)
            .ok_or(GeneratorError::MissingKey)?;

        let prompt = match prompt {
            Some(p) if !p.trim().is_empty() => p,
            _ => DEFAULT_PROMPT,
        };

        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let url = format!("{}/v1/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| GeneratorError::Request(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                GeneratorError::Request(format!("Service returned {}: {}", status, body)).into(),
            );
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::Request(format!("Invalid response body: {}", e)))?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(GeneratorError::EmptyCompletion)?;

        debug!(chars = text.len(), "Completion received");
        Ok(text)
    }
}
