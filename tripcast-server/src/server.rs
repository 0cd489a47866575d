//! HTTP surface
//!
//! Every handler deserializes its input, calls zero, one, or two library
//! components synchronously, and serializes a response. Outbound failures
//! are logged and answered with a generic 500. The one exception is a
//! direct-message rejection, which renders as a normal response with an
//! error description.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use handlebars::Handlebars;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use libtripcast::analytics::{self, EngagementTable, CHART_FILENAME};
use libtripcast::backup::{self, BACKUP_FILENAME};
use libtripcast::config::Config;
use libtripcast::credentials::CredentialStore;
use libtripcast::media::{self, ImageFetcher};
use libtripcast::platforms::Platform;
use libtripcast::service::posting::PostPipeline;
use libtripcast::textgen::TextGenerator;
use libtripcast::types::DmOutcome;

/// Number of posts fetched for analytics and backup.
const HISTORY_COUNT: u32 = 100;

/// Default direct-message newsletter text.
const DEFAULT_DM_MESSAGE: &str =
    "Hey! 🌍 Here’s your daily travel inspiration. Stay adventurous! #TravelMore";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub credentials: Arc<CredentialStore>,
    pub platform: Arc<dyn Platform>,
    pub fetcher: ImageFetcher,
    pub textgen: TextGenerator,
    pub pages: Arc<Handlebars<'static>>,
}

impl AppState {
    /// Wire the library components to the given platform client.
    pub fn new(
        config: Arc<Config>,
        credentials: Arc<CredentialStore>,
        platform: Arc<dyn Platform>,
    ) -> anyhow::Result<Self> {
        let fetcher = ImageFetcher::new(&config.image_search.base_url, credentials.clone())?;
        let textgen = TextGenerator::new(
            &config.textgen.base_url,
            &config.textgen.model,
            credentials.clone(),
        )?;
        let pages = Arc::new(crate::pages::registry().map_err(|e| anyhow::anyhow!("{}", e))?);

        Ok(Self {
            config,
            credentials,
            platform,
            fetcher,
            textgen,
            pages,
        })
    }
}

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir();

    Router::new()
        .route("/", get(dashboard))
        .route("/analytics", get(analytics_page))
        .route("/schedule_tweet", post(schedule_tweet))
        .route("/upload_media", post(upload_media))
        .route("/generate_ai_tweet", post(generate_ai_tweet))
        .route("/manage_auto_replies", post(manage_auto_replies))
        .route("/manage_dm_newsletter", post(manage_dm_newsletter))
        .route("/api_keys", post(update_api_keys))
        .route("/backup_tweets", get(backup_tweets))
        .route("/health", get(health_check))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn internal_error<E: std::fmt::Display>(error: E) -> StatusCode {
    error!(error = %error, "Request failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let html = state
        .pages
        .render("dashboard", &json!({}))
        .map_err(internal_error)?;
    Ok(Html(html))
}

/// Regenerate the engagement chart from the latest post history and
/// render the page embedding it.
async fn analytics_page(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let posts = state
        .platform
        .recent_posts(HISTORY_COUNT)
        .await
        .map_err(internal_error)?;

    let table = EngagementTable::from_posts(&posts);
    let chart_path = state.config.static_dir().join(CHART_FILENAME);
    analytics::render_chart(&table, &chart_path).map_err(internal_error)?;

    let image_url = format!("/static/{}", CHART_FILENAME);
    let html = state
        .pages
        .render("analytics", &json!({ "image_url": image_url }))
        .map_err(internal_error)?;
    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
struct ScheduleTweetRequest {
    #[serde(default)]
    text: String,
    #[serde(default)]
    image_query: Option<String>,
}

async fn schedule_tweet(
    State(state): State<AppState>,
    Json(request): Json<ScheduleTweetRequest>,
) -> Result<Json<Value>, StatusCode> {
    let pipeline = PostPipeline::new(
        state.platform.clone(),
        state.fetcher.clone(),
        state.config.static_dir(),
    );

    let outcome = pipeline
        .run(&request.text, request.image_query.as_deref())
        .await
        .map_err(internal_error)?;

    info!(
        post_id = %outcome.post_id,
        media_attached = outcome.media_attached,
        "Scheduled tweet posted"
    );
    Ok(Json(json!({ "message": "Scheduled Tweet posted successfully!" })))
}

async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(str::to_string).unwrap_or_default();
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;

        let stored = media::store_upload(&state.config.static_dir(), &filename, &bytes)
            .map_err(internal_error)?;
        let media = state
            .platform
            .upload_media(&stored.path)
            .await
            .map_err(internal_error)?;

        return Ok(Json(json!({ "media_id": media.id })));
    }

    // No `file` field in the request
    Err(StatusCode::BAD_REQUEST)
}

#[derive(Debug, Deserialize)]
struct GenerateTweetRequest {
    #[serde(default)]
    prompt: Option<String>,
}

async fn generate_ai_tweet(
    State(state): State<AppState>,
    Json(request): Json<GenerateTweetRequest>,
) -> Result<Json<Value>, StatusCode> {
    let tweet = state
        .textgen
        .generate(request.prompt.as_deref())
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({ "tweet": tweet })))
}

#[derive(Debug, Deserialize)]
struct AutoRepliesRequest {
    #[serde(default)]
    enabled: Option<bool>,
}

async fn manage_auto_replies(
    Json(request): Json<AutoRepliesRequest>,
) -> Result<Json<Value>, StatusCode> {
    let enabled = request.enabled.unwrap_or(true);
    Ok(Json(json!({
        "message": "Auto-replies updated!",
        "enabled": enabled
    })))
}

#[derive(Debug, Deserialize)]
struct DmNewsletterRequest {
    user_id: String,
}

async fn manage_dm_newsletter(
    State(state): State<AppState>,
    Json(request): Json<DmNewsletterRequest>,
) -> Result<Json<Value>, StatusCode> {
    let outcome = state
        .platform
        .send_direct_message(&request.user_id, DEFAULT_DM_MESSAGE)
        .await
        .map_err(internal_error)?;

    match outcome {
        DmOutcome::Sent => Ok(Json(json!({ "message": "DM sent successfully!" }))),
        DmOutcome::Rejected(description) => Ok(Json(json!({ "error": description }))),
    }
}

async fn update_api_keys(
    State(state): State<AppState>,
    Json(updates): Json<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let applied = state.credentials.apply(&updates);
    info!(applied, "API keys updated");
    Ok(Json(json!({ "message": "API keys updated successfully!" })))
}

async fn backup_tweets(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let posts = state
        .platform
        .recent_posts(HISTORY_COUNT)
        .await
        .map_err(internal_error)?;

    let backup_path = state.config.static_dir().join(BACKUP_FILENAME);
    backup::write_backup(&posts, &backup_path).map_err(internal_error)?;

    Ok(Json(json!({
        "message": "Tweets backed up successfully!",
        "backup_url": format!("/static/{}", BACKUP_FILENAME)
    })))
}
