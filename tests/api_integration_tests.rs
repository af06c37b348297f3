//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycles through the router, with a call-counting
//! stand-in for the recommendation service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use recommender_cache::{
    api::create_router, AppState, CachingRecommender, HttpRecommenderApi, RecommenderApi,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Types ==

#[derive(Debug, Clone, Copy)]
enum Mode {
    Recommend,
    Empty,
    Fail,
}

/// Counts calls; recommends `{"cpu": "<n>m"}` for a descriptor with `"replicas": n`.
struct StubApi {
    calls: AtomicUsize,
    mode: Mutex<Mode>,
}

impl StubApi {
    fn new(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            mode: Mutex::new(mode),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }
}

#[async_trait]
impl RecommenderApi for StubApi {
    type Descriptor = Value;
    type Recommendation = Value;

    async fn get_recommendation(&self, descriptor: &Value) -> anyhow::Result<Option<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mode = *self.mode.lock().unwrap();
        match mode {
            Mode::Recommend => {
                let replicas = descriptor["replicas"].as_u64().unwrap_or(1);
                Ok(Some(json!({ "cpu": format!("{}m", replicas * 100) })))
            }
            Mode::Empty => Ok(None),
            Mode::Fail => bail!("upstream timed out"),
        }
    }
}

// == Helper Functions ==

fn create_test_app(api: Arc<StubApi>, ttl: Duration) -> Router {
    let recommender = CachingRecommender::new(ttl, api);
    create_router(AppState::new(recommender))
}

fn recommendation_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/recommendation")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn stats(app: &Router) -> Value {
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_to_json(response.into_body()).await
}

// == Recommendation Endpoint Tests ==

#[tokio::test]
async fn test_recommendation_success() {
    let api = StubApi::new(Mode::Recommend);
    let app = create_test_app(api.clone(), Duration::from_secs(60));

    let response = app
        .oneshot(recommendation_request(r#"{"name":"web","replicas":3}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, json!({ "cpu": "300m" }));
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn test_repeated_request_served_from_cache() {
    let api = StubApi::new(Mode::Recommend);
    let app = create_test_app(api.clone(), Duration::from_secs(60));

    // Same content, different key order
    for body in [
        r#"{"name":"web","replicas":2}"#,
        r#"{"replicas":2,"name":"web"}"#,
    ] {
        let response = app.clone().oneshot(recommendation_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_to_json(response.into_body()).await["cpu"], "200m");
    }

    assert_eq!(api.calls(), 1);
    let stats = stats(&app).await;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["total_entries"], 1);
}

#[tokio::test(start_paused = true)]
async fn test_expired_recommendation_refetched() {
    let api = StubApi::new(Mode::Recommend);
    let app = create_test_app(api.clone(), Duration::from_secs(1));

    app.clone()
        .oneshot(recommendation_request(r#"{"replicas":1}"#))
        .await
        .unwrap();

    // Past the TTL and one sweep tick
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(stats(&app).await["evictions"], 1);

    let response = app
        .clone()
        .oneshot(recommendation_request(r#"{"replicas":1}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn test_upstream_failure_returns_bad_gateway_and_is_not_cached() {
    let api = StubApi::new(Mode::Fail);
    let app = create_test_app(api.clone(), Duration::from_secs(60));

    let response = app
        .clone()
        .oneshot(recommendation_request(r#"{"replicas":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(
        json["error"],
        "error fetching recommendation: upstream timed out"
    );

    api.set_mode(Mode::Recommend);
    let response = app
        .clone()
        .oneshot(recommendation_request(r#"{"replicas":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn test_empty_recommendation_returns_no_content_and_is_not_cached() {
    let api = StubApi::new(Mode::Empty);
    let app = create_test_app(api.clone(), Duration::from_secs(60));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(recommendation_request(r#"{"replicas":1}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    assert_eq!(api.calls(), 2);
    assert_eq!(stats(&app).await["stores"], 0);
}

#[tokio::test]
async fn test_null_descriptor_rejected() {
    let api = StubApi::new(Mode::Recommend);
    let app = create_test_app(api.clone(), Duration::from_secs(60));

    let response = app.oneshot(recommendation_request("null")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let api = StubApi::new(Mode::Recommend);
    let app = create_test_app(api.clone(), Duration::from_secs(60));

    let response = app
        .oneshot(recommendation_request(r#"{"replicas":"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(api.calls(), 0);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(StubApi::new(Mode::Recommend), Duration::from_secs(60));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

// == End-to-End Over HTTP ==

#[tokio::test]
async fn test_end_to_end_with_http_upstream() {
    let upstream_calls = Arc::new(AtomicUsize::new(0));
    let counter = upstream_calls.clone();
    let upstream = Router::new().route(
        "/recommend",
        post(move |Json(descriptor): Json<Value>| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "for": descriptor["name"], "memory": "256Mi" }))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });

    let api = HttpRecommenderApi::new(
        format!("http://{}/recommend", addr),
        Duration::from_secs(5),
    )
    .unwrap();
    let app = create_router(AppState::new(CachingRecommender::new(
        Duration::from_secs(60),
        api,
    )));

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(recommendation_request(r#"{"name":"db"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json, json!({ "for": "db", "memory": "256Mi" }));
    }

    assert_eq!(upstream_calls.load(Ordering::SeqCst), 1);
}
