//! End-to-end integration tests for the StickerMatch service.
//!
//! These tests wire the real gateway from configuration: an
//! OpenAI-compatible embedder pointed at a local mock server, an
//! in-memory catalog loaded from disk, and the full HTTP router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{Json, Router, routing::post};
use http_body_util::BodyExt;
use stickermatch_config::AppConfig;
use tower::ServiceExt;

// ── Mock embedding server ────────────────────────────────────────────────

/// Embeds by topic: birthday/cake prompts, greetings, everything else.
fn embed_text(text: &str) -> Vec<f32> {
    let text = text.to_lowercase();
    if text.contains("birthday") || text.contains("cake") {
        vec![1.0, 0.0, 0.0]
    } else if text.contains("morning") || text.contains("hello") {
        vec![0.0, 1.0, 0.0]
    } else {
        vec![0.0, 0.0, 1.0]
    }
}

async fn start_embedding_server() -> String {
    let app = Router::new().route(
        "/v1/embeddings",
        post(|Json(body): Json<serde_json::Value>| async move {
            let text = body["input"][0].as_str().unwrap_or_default().to_string();
            Json(serde_json::json!({
                "object": "list",
                "data": [{"object": "embedding", "index": 0, "embedding": embed_text(&text)}],
                "model": body["model"],
            }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1")
}

// ── Catalog fixture ──────────────────────────────────────────────────────

/// Eight birthday stickers fanning away from the birthday axis, plus two
/// greetings. `stamp0100` is the closest birthday sticker.
fn write_catalog(dir: &std::path::Path) -> std::path::PathBuf {
    let mut records = Vec::new();
    for i in 0..8 {
        let drift = i as f32 * 0.1;
        records.push(serde_json::json!({
            "assetbundleName": format!("stamp{:04}", 100 + i),
            "name": format!("Birthday {i}"),
            "embedding": [1.0, 0.0, drift],
            "character": "miku",
        }));
    }
    records.push(serde_json::json!({
        "assetbundleName": "stamp0200",
        "name": "Good morning",
        "embedding": [0.0, 1.0, 0.0],
    }));
    records.push(serde_json::json!({
        "assetbundleName": "stamp0201",
        "name": "Hello!",
        "embedding": [0.1, 0.9, 0.0],
    }));

    let path = dir.join("stickers.json");
    std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();
    path
}

async fn app(dir: &tempfile::TempDir) -> Router {
    let mut config = AppConfig::default();
    config.embedder.provider = "mock".into();
    config.embedder.api_url = Some(start_embedding_server().await);
    config.embedder.model = Some("mock-embed".into());
    config.vector_store.backend = "in_memory".into();
    config.vector_store.catalog_path = Some(write_catalog(dir.path()).display().to_string());
    config.validate().unwrap();

    let state = stickermatch_gateway::build_state(&config).unwrap();
    stickermatch_gateway::build_router(state, &config.gateway)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn ids(json: &serde_json::Value) -> Vec<&str> {
    json["stickers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["assetbundleName"].as_str().unwrap())
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_birthday_cake_over_get() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = send(app(&dir).await, get("/recommend?prompt=birthday+cake")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["query"], "birthday cake");
    assert_eq!(
        ids(&json),
        vec!["stamp0100", "stamp0101", "stamp0102", "stamp0103", "stamp0104"]
    );
    assert_eq!(json["stickers"][0]["name"], "Birthday 0");

    let scores: Vec<f64> = json["stickers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["score"].as_f64().unwrap())
        .collect();
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn e2e_greeting_over_post() {
    let dir = tempfile::tempdir().unwrap();
    let body = serde_json::json!({"prompt": "Good morning!", "topK": 2});
    let (status, json) = send(app(&dir).await, post_json("/api/recommend", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["query"], "Good morning!");
    assert_eq!(ids(&json), vec!["stamp0200", "stamp0201"]);
}

#[tokio::test]
async fn e2e_recent_messages_are_not_recommended_again() {
    let dir = tempfile::tempdir().unwrap();
    let body = serde_json::json!({
        "prompt": "happy birthday",
        "topK": 3,
        "excludeRecent": [
            "[sticker:stamp0100]",
            "see https://assets.example.com/stamp/stamp0101/stamp0101.png",
            "stamp0103",
            "thanks!"
        ]
    });
    let (status, json) = send(app(&dir).await, post_json("/recommend", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec!["stamp0102", "stamp0104", "stamp0105"]);
}

#[tokio::test]
async fn e2e_query_exclusions() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = send(
        app(&dir).await,
        get("/recommend?prompt=cake&topK=2&excludeRecent=stamp0100,stamp0100,stamp0101"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec!["stamp0102", "stamp0103"]);
}

#[tokio::test]
async fn e2e_short_catalog_returns_everything_left() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = send(app(&dir).await, get("/recommend?prompt=cake&topK=20")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stickers"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn e2e_invalid_requests() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let (status, json) = send(
        app.clone(),
        post_json("/recommend", serde_json::json!({"prompt": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "INVALID_REQUEST");

    let malformed = Request::builder()
        .method("POST")
        .uri("/recommend")
        .header("content-type", "application/json")
        .body(Body::from("{\"prompt\": "))
        .unwrap();
    let (status, json) = send(app.clone(), malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "INVALID_JSON");

    let delete = Request::builder()
        .method("DELETE")
        .uri("/recommend")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(app, delete).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json["error"]["code"], "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn e2e_unconfigured_store_is_unavailable() {
    let mut config = AppConfig::default();
    config.vector_store.backend = "none".into();
    let state = stickermatch_gateway::build_state(&config).unwrap();
    let app = stickermatch_gateway::build_router(state, &config.gateway);

    let (status, json) = send(app, get("/recommend?prompt=cake")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "VECTORIZE_UNAVAILABLE");
}

#[tokio::test]
async fn e2e_unreachable_embedder_is_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.embedder.provider = "mock".into();
    // Nothing listens on port 9 locally.
    config.embedder.api_url = Some("http://127.0.0.1:9/v1".into());
    config.embedder.timeout_secs = 2;
    config.vector_store.backend = "in_memory".into();
    config.vector_store.catalog_path = Some(write_catalog(dir.path()).display().to_string());

    let state = stickermatch_gateway::build_state(&config).unwrap();
    let app = stickermatch_gateway::build_router(state, &config.gateway);

    let (status, json) = send(app, get("/recommend?prompt=cake")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
}
