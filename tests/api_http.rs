// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use trend_studio::config::StudioConfig;
use trend_studio::scheduler::{Publisher, ScheduledPost};
use trend_studio::trends::sources::{TrendCandidate, TrendSource};
use trend_studio::{create_router, AppState};

const BODY_LIMIT: usize = 1024 * 1024;

fn test_state() -> AppState {
    AppState::from_config(&StudioConfig::default()).expect("state from default config")
}

fn test_router() -> Router {
    create_router(test_state())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Json>) -> (StatusCode, Json) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

struct BrokenSource;

#[async_trait]
impl TrendSource for BrokenSource {
    async fn fetch(&self, _language: &str) -> Result<Vec<TrendCandidate>> {
        bail!("upstream down")
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

struct FailingPublisher;

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(&self, _post: &ScheduledPost) -> Result<()> {
        bail!("platform rejected post")
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[tokio::test]
async fn health_returns_ok() {
    let app = test_router();
    let req = Request::get("/health").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn trends_default_query_is_ranked_and_pending() {
    let app = test_router();
    let (status, v) = send(&app, "GET", "/api/trends", None).await;
    assert_eq!(status, StatusCode::OK);

    let trends = v["trends"].as_array().expect("trends array");
    assert_eq!(trends.len(), 12);
    assert!(trends.iter().all(|t| t["approved"].is_null()));
    let scores: Vec<f64> = trends.iter().map(|t| t["score"].as_f64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert!(v.get("error").is_none());
}

#[tokio::test]
async fn trends_filters_and_ignores_region() {
    let app = test_router();
    let (status, v) = send(
        &app,
        "GET",
        "/api/trends?language=en&category=sports&region=pk",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = v["trends"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec!["Olympic Games Highlights", "Sports Championship Final"]
    );

    // Empty parameters mean "all".
    let (_, v) = send(&app, "GET", "/api/trends?language=&category=", None).await;
    assert_eq!(v["trends"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn repeated_query_params_use_first_value() {
    let app = test_router();
    let (status, v) = send(&app, "GET", "/api/trends?language=en&language=ur", None).await;
    assert_eq!(status, StatusCode::OK);
    let trends = v["trends"].as_array().unwrap();
    assert_eq!(trends.len(), 10);
    assert!(trends.iter().all(|t| t["language"] == "en"));
    assert!(v.get("error").is_none());
}

#[tokio::test]
async fn trends_failure_returns_empty_list_and_error() {
    let app = create_router(test_state().with_sources(vec![Box::new(BrokenSource)]));
    let (status, v) = send(&app, "GET", "/api/trends", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["trends"], json!([]));
    assert_eq!(v["error"], "Failed to fetch trends");
}

#[tokio::test]
async fn approve_flow_and_terminality() {
    let app = test_router();
    let (_, v) = send(&app, "GET", "/api/trends?language=ur", None).await;
    let id = v["trends"][0]["id"].as_str().unwrap().to_string();

    let (status, v) = send(
        &app,
        "POST",
        "/api/trends/approve",
        Some(json!({ "trendId": id, "approved": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, json!({ "success": true, "trendId": id, "approved": true }));

    // A later rejection is reported as success but does not flip the state.
    let (status, _) = send(
        &app,
        "POST",
        "/api/trends/approve",
        Some(json!({ "trendId": id, "approved": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, v) = send(&app, "GET", "/api/trends?language=ur", None).await;
    let rec = v["trends"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == id.as_str())
        .unwrap();
    assert_eq!(rec["approved"], true);
}

// Current contract: an unknown id is acknowledged as a success and nothing changes.
#[tokio::test]
async fn approve_unknown_id_reports_success() {
    let app = test_router();
    let (_, before) = send(&app, "GET", "/api/trends", None).await;

    let (status, v) = send(
        &app,
        "POST",
        "/api/trends/approve",
        Some(json!({ "trendId": "trend_unknown", "approved": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["success"], true);

    let (_, after) = send(&app, "GET", "/api/trends", None).await;
    assert_eq!(before["trends"], after["trends"]);
}

#[tokio::test]
async fn approve_requires_trend_id() {
    let app = test_router();
    for body in [json!({ "approved": true }), json!({ "trendId": "", "approved": true })] {
        let (status, v) = send(&app, "POST", "/api/trends/approve", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(v["error"], "Trend ID is required");
    }

    let req = Request::post("/api/trends/approve")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn approve_requires_explicit_decision() {
    let app = test_router();
    let (_, v) = send(&app, "GET", "/api/trends?language=en", None).await;
    let id = v["trends"][0]["id"].as_str().unwrap().to_string();

    let (status, v) = send(&app, "POST", "/api/trends/approve", Some(json!({ "trendId": id }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "approved flag is required");

    let (_, v) = send(&app, "GET", "/api/trends?language=en", None).await;
    assert!(v["trends"][0]["approved"].is_null());
}

#[tokio::test]
async fn content_schedule_post_lifecycle() {
    let app = test_router();
    let (_, v) = send(&app, "GET", "/api/trends?language=en", None).await;
    let trend = v["trends"][0].clone();

    let (status, v) = send(
        &app,
        "POST",
        "/api/content/generate",
        Some(json!({ "trendId": trend["id"], "tone": "funny" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let content = v["content"].clone();
    assert_eq!(content["trendTitle"], trend["title"]);
    assert_eq!(content["tone"], "funny");
    assert_eq!(content["language"], "en");
    assert!(content["text"].as_str().unwrap().contains("#TechHumor"));
    let n_platforms = content["platforms"].as_array().unwrap().len();
    assert!((3..=5).contains(&n_platforms));

    let (_, v) = send(&app, "GET", "/api/content", None).await;
    assert_eq!(v["content"].as_array().unwrap().len(), 1);

    let (status, v) = send(
        &app,
        "POST",
        "/api/scheduler/schedule",
        Some(json!({ "contentId": content["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let post = v["post"].clone();
    assert_eq!(post["status"], "scheduled");
    assert_eq!(post["contentId"], content["id"]);
    assert_eq!(post["text"], content["text"]);

    let (_, stats) = send(&app, "GET", "/api/stats", None).await;
    assert_eq!(
        stats,
        json!({ "totalPosts": 0, "scheduledPosts": 1, "activeTrends": 1, "platforms": 7 })
    );

    let id = post["id"].as_str().unwrap();
    let (status, v) = send(&app, "POST", &format!("/api/scheduler/{id}/post"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["post"]["status"], "posted");
    assert!(v["post"]["postedAt"].is_string());

    let (_, analytics) = send(&app, "GET", "/api/analytics", None).await;
    assert_eq!(analytics["stats"]["totalPosts"], 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/scheduler/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, v) = send(&app, "GET", "/api/scheduler", None).await;
    assert_eq!(v["posts"], json!([]));

    let cid = content["id"].as_str().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/api/content/{cid}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, v) = send(&app, "DELETE", &format!("/api/content/{cid}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"], "Content not found");
}

#[tokio::test]
async fn generate_for_unknown_trend_falls_back_to_id_and_default_language() {
    let app = test_router();
    let (status, v) = send(
        &app,
        "POST",
        "/api/content/generate",
        Some(json!({ "trendId": "trend_manual" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["content"]["trendTitle"], "trend_manual");
    assert_eq!(v["content"]["language"], "en");
    let tone = v["content"]["tone"].as_str().unwrap();
    assert!(["professional", "funny", "informative"].contains(&tone));

    let (status, v) = send(&app, "POST", "/api/content/generate", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "Trend ID is required");
}

#[tokio::test]
async fn scheduling_rejects_missing_and_unknown_content() {
    let app = test_router();
    let (status, v) = send(&app, "POST", "/api/scheduler/schedule", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "Content ID is required");

    let (status, v) = send(
        &app,
        "POST",
        "/api/scheduler/schedule",
        Some(json!({ "contentId": "content_missing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"], "Content not found");

    let (status, v) = send(&app, "POST", "/api/scheduler/post_missing/post", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"], "Post not found");

    let (status, _) = send(&app, "DELETE", "/api/scheduler/post_missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn publisher_failure_marks_post_failed() {
    let app = create_router(test_state().with_publisher(Arc::new(FailingPublisher)));
    let (_, v) = send(
        &app,
        "POST",
        "/api/content/generate",
        Some(json!({ "trendId": "trend_x" })),
    )
    .await;
    let cid = v["content"]["id"].clone();
    let (_, v) = send(
        &app,
        "POST",
        "/api/scheduler/schedule",
        Some(json!({ "contentId": cid })),
    )
    .await;
    let id = v["post"]["id"].as_str().unwrap().to_string();

    let (status, v) = send(&app, "POST", &format!("/api/scheduler/{id}/post"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["error"], "Failed to post content");

    let (_, v) = send(&app, "GET", "/api/scheduler", None).await;
    assert_eq!(v["posts"][0]["status"], "failed");
    assert!(v["posts"][0].get("postedAt").is_none());
}

#[tokio::test]
async fn settings_merge_and_autopost() {
    let app = test_router();
    let (status, v) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["settings"]["postingInterval"], 120);

    let (status, v) = send(
        &app,
        "POST",
        "/api/settings",
        Some(json!({ "postingInterval": 15, "defaultTone": "funny" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["success"], true);
    assert_eq!(v["settings"]["postingInterval"], 15);
    assert_eq!(v["settings"]["defaultTone"], "funny");
    assert_eq!(v["settings"]["autoPost"], true);

    let (status, v) = send(
        &app,
        "POST",
        "/api/settings/autopost",
        Some(json!({ "enabled": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, json!({ "success": true, "enabled": false }));

    let (_, v) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(v["settings"]["autoPost"], false);
    assert_eq!(v["settings"]["postingInterval"], 15);

    let (status, _) = send(
        &app,
        "POST",
        "/api/settings",
        Some(json!({ "postingInterval": "soon" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, v) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(v["settings"]["postingInterval"], 15);
}

#[tokio::test]
async fn posting_interval_drives_scheduled_time() {
    let app = test_router();
    send(&app, "POST", "/api/settings", Some(json!({ "postingInterval": 60 }))).await;

    let (_, v) = send(
        &app,
        "POST",
        "/api/content/generate",
        Some(json!({ "trendId": "trend_x" })),
    )
    .await;
    let (_, v) = send(
        &app,
        "POST",
        "/api/scheduler/schedule",
        Some(json!({ "contentId": v["content"]["id"] })),
    )
    .await;

    let at = v["post"]["scheduledTime"].as_str().unwrap();
    let at = chrono::DateTime::parse_from_rfc3339(at).unwrap();
    let delta = at.with_timezone(&chrono::Utc) - chrono::Utc::now();
    assert!(delta > chrono::Duration::minutes(58));
    assert!(delta <= chrono::Duration::minutes(60));
}
