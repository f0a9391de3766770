//! Integration tests for the link shortener API
//!
//! These drive the full router: routing, request/response handling,
//! the store and its persistence backend.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use snaplink::generator::{CodeGenerator, RandomCodeGenerator};
use snaplink::persistence::{JsonFile, LinkMap, Persistence};
use snaplink::route::{create_app, AppState};
use snaplink::service::Shortener;
use snaplink::store::LinkStore;
use snaplink::{Link, PersistenceError};

const BASE_URL: &str = "http://localhost:8080";

/// Builds an app on an in-memory store.
fn setup_test_app() -> Router {
    app_on(LinkStore::in_memory())
}

fn app_on(store: LinkStore) -> Router {
    let shortener = Shortener::new(
        Arc::new(store),
        Arc::new(RandomCodeGenerator::new()),
        BASE_URL,
    );
    create_app(AppState { shortener })
}

/// Backend whose writes fail while `failing` is set.
#[derive(Clone, Default)]
struct FailingDisk {
    failing: Arc<AtomicBool>,
}

impl FailingDisk {
    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Persistence for FailingDisk {
    fn load(&self) -> Result<Vec<Link>, PersistenceError> {
        Ok(Vec::new())
    }

    fn commit(&self, _changed: &Link, _links: &LinkMap) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Corrupt("disk unavailable".to_owned()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "failing-disk"
    }
}

/// Always hands out the same code.
struct FixedCode(&'static str);

impl CodeGenerator for FixedCode {
    fn generate(&self) -> String {
        self.0.to_owned()
    }
}

/// Helper function to parse response body as JSON
async fn response_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

fn shorten_request(payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/shorten")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Creates a short URL and returns its code.
async fn create(app: &Router, url: &str) -> String {
    let response = app
        .clone()
        .oneshot(shorten_request(&json!({ "url": url })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response.into_body()).await;
    body["short_code"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_shorten_success() {
    let app = setup_test_app();

    let response = app
        .oneshot(shorten_request(&json!({ "url": "https://example.com/test" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response.into_body()).await;
    let code = body["short_code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(body["long_url"], "https://example.com/test");
    assert_eq!(body["short_url"], format!("{BASE_URL}/{code}"));
}

#[tokio::test]
async fn test_shorten_empty_url() {
    let app = setup_test_app();

    let response = app
        .oneshot(shorten_request(&json!({ "url": "" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["error"], "URL is required");
}

#[tokio::test]
async fn test_shorten_invalid_body() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/shorten")
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_redirect_counts_clicks() {
    let app = setup_test_app();
    let code = create(&app, "https://example.com/target").await;

    let response = app.clone().oneshot(get(&format!("/{code}"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/target"
    );

    app.clone().oneshot(get(&format!("/{code}"))).await.unwrap();

    let response = app
        .oneshot(get(&format!("/api/stats/{code}")))
        .await
        .unwrap();
    let body = response_json(response.into_body()).await;
    assert_eq!(body["clicks"], 2);
    assert!(body["last_accessed"].is_string());
}

#[tokio::test]
async fn test_redirect_not_found() {
    let app = setup_test_app();

    let response = app.oneshot(get("/nope00")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_returns_full_record() {
    let app = setup_test_app();
    let code = create(&app, "https://example.com/stats").await;

    let response = app
        .oneshot(get(&format!("/api/stats/{code}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["short_code"], code);
    assert_eq!(body["original_url"], "https://example.com/stats");
    assert_eq!(body["clicks"], 0);
    assert!(body["id"].is_string());
    assert!(body["created_at"].is_string());
    assert!(body.get("last_accessed").is_none());
}

#[tokio::test]
async fn test_stats_not_found() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/stats/nope00")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["error"], "Short URL not found");
}

#[tokio::test]
async fn test_list_links() {
    let app = setup_test_app();
    for i in 0..3 {
        create(&app, &format!("https://example.com/list{i}")).await;
    }

    let response = app.oneshot(get("/api/links")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_links_survive_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("links.json");

    let code = {
        let app = app_on(LinkStore::open(JsonFile::new(&path)).unwrap());
        let code = create(&app, "https://example.com/durable").await;
        app.oneshot(get(&format!("/{code}"))).await.unwrap();
        code
    };

    let app = app_on(LinkStore::open(JsonFile::new(&path)).unwrap());
    let response = app
        .oneshot(get(&format!("/api/stats/{code}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["original_url"], "https://example.com/durable");
    assert_eq!(body["clicks"], 1);
}

#[tokio::test]
async fn test_concurrent_redirects() {
    let app = setup_test_app();
    let code = create(&app, "https://example.com/busy").await;

    let mut handles = vec![];
    for _ in 0..50 {
        let app = app.clone();
        let uri = format!("/{code}");
        handles.push(tokio::spawn(async move {
            app.oneshot(get(&uri)).await.unwrap().status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::FOUND);
    }

    let response = app
        .oneshot(get(&format!("/api/stats/{code}")))
        .await
        .unwrap();
    let body = response_json(response.into_body()).await;
    assert_eq!(body["clicks"], 50);
}

#[tokio::test]
async fn test_shorten_persistence_failure() {
    let backend = FailingDisk::default();
    backend.set_failing(true);
    let app = app_on(LinkStore::open(backend).unwrap());

    let response = app
        .clone()
        .oneshot(shorten_request(&json!({ "url": "https://example.com/lost" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["error"], "Failed to save link");

    let response = app.oneshot(get("/api/links")).await.unwrap();
    let body = response_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_redirect_survives_click_persistence_failure() {
    let backend = FailingDisk::default();
    let app = app_on(LinkStore::open(backend.clone()).unwrap());
    let code = create(&app, "https://example.com/still-works").await;

    backend.set_failing(true);
    let response = app.clone().oneshot(get(&format!("/{code}"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/still-works"
    );

    let response = app
        .oneshot(get(&format!("/api/stats/{code}")))
        .await
        .unwrap();
    let body = response_json(response.into_body()).await;
    assert_eq!(body["clicks"], 0);
}

#[tokio::test]
async fn test_shorten_exhausted_codes() {
    let shortener = Shortener::new(
        Arc::new(LinkStore::in_memory()),
        Arc::new(FixedCode("same01")),
        BASE_URL,
    )
    .with_max_attempts(3);
    let app = create_app(AppState { shortener });

    assert_eq!(create(&app, "https://example.com/first").await, "same01");

    let response = app
        .oneshot(shorten_request(&json!({ "url": "https://example.com/second" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["error"], "Could not allocate a short code, try again");
}
