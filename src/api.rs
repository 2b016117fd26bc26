// src/api.rs
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;

use crate::analytics::{AnalyticsProvider, AnalyticsReport, MockAnalytics};
use crate::config::StudioConfig;
use crate::content::{pick_platforms, ContentItem, ContentStore, NewContent};
use crate::error::ApiError;
use crate::generate::{
    build_image_generator, build_text_generator, DynImageGenerator, DynTextGenerator, Tone,
};
use crate::scheduler::{MockPublisher, PostStatus, PostStore, Publisher, ScheduledPost};
use crate::settings::Settings;
use crate::trends::{
    sources::default_sources, Approval, TrendPipeline, TrendQuery, TrendRecord, TrendSource,
    TrendStore,
};

/// Everything the handlers share. Each store is owned here and nowhere else.
#[derive(Clone)]
pub struct AppState {
    pub trends: Arc<Mutex<TrendStore>>,
    pub pipeline: Arc<TrendPipeline>,
    pub content: Arc<Mutex<ContentStore>>,
    pub posts: Arc<Mutex<PostStore>>,
    pub settings: Arc<RwLock<Settings>>,
    pub text: DynTextGenerator,
    pub images: DynImageGenerator,
    pub publisher: Arc<dyn Publisher>,
    pub analytics: Arc<dyn AnalyticsProvider>,
}

impl AppState {
    pub fn from_config(cfg: &StudioConfig) -> anyhow::Result<Self> {
        let text = build_text_generator(&cfg.generation)?;
        let images = build_image_generator(&cfg.generation);
        let analytics: Arc<dyn AnalyticsProvider> = Arc::new(MockAnalytics);
        tracing::info!(
            text = text.name(),
            images = images.name(),
            analytics = analytics.name(),
            page_size = cfg.trends.page_size,
            "app state built"
        );
        Ok(Self {
            trends: Arc::new(Mutex::new(TrendStore::new())),
            pipeline: Arc::new(TrendPipeline::new(default_sources(), cfg.trends.page_size)),
            content: Arc::new(Mutex::new(ContentStore::new())),
            posts: Arc::new(Mutex::new(PostStore::new())),
            settings: Arc::new(RwLock::new(Settings::default())),
            text,
            images,
            publisher: Arc::new(MockPublisher),
            analytics,
        })
    }

    /// Swap the candidate feeds, keeping the page size.
    pub fn with_sources(mut self, sources: Vec<Box<dyn TrendSource>>) -> Self {
        let page_size = self.pipeline.page_size();
        self.pipeline = Arc::new(TrendPipeline::new(sources, page_size));
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn with_text_generator(mut self, text: DynTextGenerator) -> Self {
        self.text = text;
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/trends", get(get_trends))
        .route("/api/trends/approve", post(approve_trend))
        .route("/api/content", get(list_content))
        .route("/api/content/generate", post(generate_content))
        .route("/api/content/{id}", delete(delete_content))
        .route("/api/scheduler", get(list_posts))
        .route("/api/scheduler/schedule", post(schedule_post))
        .route("/api/scheduler/{id}/post", post(publish_post))
        .route("/api/scheduler/{id}", delete(delete_post))
        .route("/api/settings", get(get_settings).post(save_settings))
        .route("/api/settings/autopost", post(set_autopost))
        .route("/api/analytics", get(get_analytics))
        .route("/api/stats", get(get_stats))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn lock<'a, T>(m: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, ApiError> {
    m.lock().map_err(|_| ApiError::poisoned(what))
}

fn read<'a, T>(m: &'a RwLock<T>, what: &str) -> Result<RwLockReadGuard<'a, T>, ApiError> {
    m.read().map_err(|_| ApiError::poisoned(what))
}

fn write<'a, T>(m: &'a RwLock<T>, what: &str) -> Result<RwLockWriteGuard<'a, T>, ApiError> {
    m.write().map_err(|_| ApiError::poisoned(what))
}

#[derive(Serialize)]
struct Success {
    success: bool,
}

// ---------------- trends ----------------

#[derive(Serialize)]
struct TrendsResp {
    trends: Vec<TrendRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

fn trends_error(status: StatusCode, error: &'static str) -> Response {
    (
        status,
        Json(TrendsResp {
            trends: Vec::new(),
            error: Some(error),
        }),
    )
        .into_response()
}

/// Query pairs are read leniently: a repeated key keeps its first value.
async fn get_trends(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let q = match params {
        Ok(Query(pairs)) => TrendQuery::from_pairs(pairs),
        Err(rej) => {
            tracing::warn!(target: "trends", error = %rej.body_text(), "bad trend query");
            return trends_error(StatusCode::BAD_REQUEST, "Invalid query string");
        }
    };
    match state.pipeline.refresh(&state.trends, &q).await {
        Ok(trends) => Json(TrendsResp {
            trends,
            error: None,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(target: "trends", error = ?e, "error fetching trends");
            trends_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch trends")
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApproveReq {
    #[serde(default)]
    trend_id: Option<String>,
    #[serde(default)]
    approved: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApproveResp {
    success: bool,
    trend_id: String,
    approved: bool,
}

/// Always reports success once the input is well-formed, even when the id
/// is unknown or the trend was already decided.
async fn approve_trend(
    State(state): State<AppState>,
    payload: Result<Json<ApproveReq>, JsonRejection>,
) -> Result<Json<ApproveResp>, ApiError> {
    let Json(body) = payload?;
    let trend_id = body
        .trend_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Trend ID is required".to_string()))?;
    let approved = body
        .approved
        .ok_or_else(|| ApiError::BadRequest("approved flag is required".to_string()))?;

    let outcome = lock(&state.trends, "trend store")?.approve(&trend_id, approved);
    let label = match outcome {
        Approval::Applied => "applied",
        Approval::AlreadyDecided => "already_decided",
        Approval::Unknown => "unknown",
    };
    counter!("trend_approvals_total", "outcome" => label).increment(1);
    if outcome != Approval::Applied {
        tracing::warn!(target: "trends", %trend_id, outcome = label, "approval had no effect");
    }

    Ok(Json(ApproveResp {
        success: true,
        trend_id,
        approved,
    }))
}

// ---------------- content ----------------

#[derive(Serialize)]
struct ContentListResp {
    content: Vec<ContentItem>,
}

async fn list_content(State(state): State<AppState>) -> Result<Json<ContentListResp>, ApiError> {
    let content = lock(&state.content, "content store")?.list();
    Ok(Json(ContentListResp { content }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateReq {
    #[serde(default)]
    trend_id: Option<String>,
    #[serde(default)]
    tone: Option<String>,
}

#[derive(Serialize)]
struct ContentResp {
    success: bool,
    content: ContentItem,
}

async fn generate_content(
    State(state): State<AppState>,
    payload: Result<Json<GenerateReq>, JsonRejection>,
) -> Result<Json<ContentResp>, ApiError> {
    let Json(body) = payload?;
    let trend_id = body
        .trend_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Trend ID is required".to_string()))?;

    let found = lock(&state.trends, "trend store")?
        .get(&trend_id)
        .map(|t| (t.title.clone(), t.language.clone()));
    let (trend_title, language) = match found {
        Some(pair) => pair,
        None => {
            let lang = read(&state.settings, "settings")?.default_language.clone();
            (trend_id.clone(), lang)
        }
    };
    let tone = body
        .tone
        .as_deref()
        .map(Tone::parse_lenient)
        .unwrap_or_else(Tone::random);

    let failed = |stage: &'static str| {
        move |e: anyhow::Error| {
            tracing::error!(target: "content", error = ?e, stage, "generation failed");
            ApiError::Internal("Failed to generate content".to_string())
        }
    };
    let text = state
        .text
        .generate_text(&trend_title, tone)
        .await
        .map_err(failed("text"))?;
    let image_url = state
        .images
        .generate_image(&trend_title)
        .await
        .map_err(failed("image"))?;
    let platforms = pick_platforms(&mut rand::rng());

    let content = lock(&state.content, "content store")?.add(NewContent {
        trend_id,
        trend_title,
        text,
        image_url,
        platforms,
        tone,
        language,
    });
    counter!("content_generated_total").increment(1);
    tracing::info!(
        target: "content",
        id = %content.id,
        trend_id = %content.trend_id,
        tone = tone.as_str(),
        "content generated"
    );

    Ok(Json(ContentResp {
        success: true,
        content,
    }))
}

async fn delete_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Success>, ApiError> {
    lock(&state.content, "content store")?
        .remove(&id)
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))?;
    tracing::info!(target: "content", %id, "content deleted");
    Ok(Json(Success { success: true }))
}

// ---------------- scheduler ----------------

#[derive(Serialize)]
struct PostsResp {
    posts: Vec<ScheduledPost>,
}

async fn list_posts(State(state): State<AppState>) -> Result<Json<PostsResp>, ApiError> {
    let posts = lock(&state.posts, "post store")?.list();
    Ok(Json(PostsResp { posts }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleReq {
    #[serde(default)]
    content_id: Option<String>,
}

#[derive(Serialize)]
struct PostResp {
    success: bool,
    post: ScheduledPost,
}

async fn schedule_post(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleReq>, JsonRejection>,
) -> Result<Json<PostResp>, ApiError> {
    let Json(body) = payload?;
    let content_id = body
        .content_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Content ID is required".to_string()))?;

    let content = lock(&state.content, "content store")?
        .get(&content_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))?;
    let delay = read(&state.settings, "settings")?.posting_interval;

    let post = lock(&state.posts, "post store")?.schedule(&content, Utc::now(), delay);
    counter!("posts_scheduled_total").increment(1);
    tracing::info!(
        target: "scheduler",
        id = %post.id,
        content_id = %post.content_id,
        at = %post.scheduled_time,
        "post scheduled"
    );
    Ok(Json(PostResp {
        success: true,
        post,
    }))
}

async fn publish_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResp>, ApiError> {
    let post = lock(&state.posts, "post store")?
        .get(&id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if let Err(e) = state.publisher.publish(&post).await {
        tracing::error!(
            target: "scheduler",
            %id,
            publisher = state.publisher.name(),
            error = ?e,
            "posting failed"
        );
        lock(&state.posts, "post store")?.mark_failed(&id);
        counter!("posts_failed_total").increment(1);
        return Err(ApiError::Internal("Failed to post content".to_string()));
    }

    let post = lock(&state.posts, "post store")?
        .mark_posted(&id, Utc::now())
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;
    counter!("posts_published_total").increment(1);
    tracing::info!(target: "scheduler", %id, "post published");
    Ok(Json(PostResp {
        success: true,
        post,
    }))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Success>, ApiError> {
    lock(&state.posts, "post store")?
        .remove(&id)
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;
    tracing::info!(target: "scheduler", %id, "post deleted");
    Ok(Json(Success { success: true }))
}

// ---------------- settings ----------------

#[derive(Serialize)]
struct SettingsResp {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    settings: Settings,
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<SettingsResp>, ApiError> {
    let settings = read(&state.settings, "settings")?.clone();
    Ok(Json(SettingsResp {
        success: None,
        settings,
    }))
}

async fn save_settings(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SettingsResp>, ApiError> {
    let Json(patch) = payload?;
    let mut guard = write(&state.settings, "settings")?;
    let merged = guard.merged_with(patch)?;
    *guard = merged.clone();
    drop(guard);

    tracing::info!(target: "settings", auto_post = merged.auto_post, "settings saved");
    Ok(Json(SettingsResp {
        success: Some(true),
        settings: merged,
    }))
}

#[derive(Deserialize)]
struct AutopostReq {
    enabled: bool,
}

#[derive(Serialize)]
struct AutopostResp {
    success: bool,
    enabled: bool,
}

async fn set_autopost(
    State(state): State<AppState>,
    payload: Result<Json<AutopostReq>, JsonRejection>,
) -> Result<Json<AutopostResp>, ApiError> {
    let Json(AutopostReq { enabled }) = payload?;
    write(&state.settings, "settings")?.auto_post = enabled;
    tracing::info!(
        target: "settings",
        "auto-post {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(Json(AutopostResp {
        success: true,
        enabled,
    }))
}

// ---------------- dashboard numbers ----------------

async fn get_analytics(State(state): State<AppState>) -> Result<Json<AnalyticsReport>, ApiError> {
    let posted = lock(&state.posts, "post store")?.count_with_status(PostStatus::Posted);
    Ok(Json(state.analytics.report(posted)))
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct StatsResp {
    total_posts: usize,
    scheduled_posts: usize,
    active_trends: usize,
    platforms: usize,
}

const PLATFORM_COUNT: usize = 7;

fn collect_stats(state: &AppState) -> Result<StatsResp, ApiError> {
    let (total_posts, scheduled_posts) = {
        let posts = lock(&state.posts, "post store")?;
        (
            posts.count_with_status(PostStatus::Posted),
            posts.count_with_status(PostStatus::Scheduled),
        )
    };
    // Counts generated content, which is what the dashboard card shows.
    let active_trends = lock(&state.content, "content store")?.len();
    Ok(StatsResp {
        total_posts,
        scheduled_posts,
        active_trends,
        platforms: PLATFORM_COUNT,
    })
}

/// Never fails: zeros on error.
async fn get_stats(State(state): State<AppState>) -> Json<StatsResp> {
    let stats = collect_stats(&state).unwrap_or_else(|_| StatsResp {
        platforms: PLATFORM_COUNT,
        ..StatsResp::default()
    });
    Json(stats)
}
