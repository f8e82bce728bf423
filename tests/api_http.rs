// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /analyze (narratives + ideas, validation failure -> 400)
// - POST /signals/process
// - POST /signals/anomalies

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt as _; // for `oneshot`

use narrative_radar::api::{create_router, AppState};
use narrative_radar::engine::NarrativeEngine;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Build the same Router the binary uses.
fn test_router() -> Router {
    create_router(AppState::new(NarrativeEngine::default()))
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn signal_json(id: &str, source: &str, age_days: i64, weight: f32, kws: &[&str]) -> Value {
    json!({
        "id": id,
        "source": source,
        "timestamp_ms": now_ms() - age_days * 86_400_000,
        "content": format!("content {id}"),
        "keywords": kws,
        "weight": weight,
    })
}

fn post(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build request")
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn api_analyze_returns_narratives_with_ideas() {
    let app = test_router();

    let payload = json!([
        signal_json("a", "repository-activity", 1, 1.0, &["jupiter", "dex", "swap", "defi"]),
        signal_json("b", "social-post", 1, 2.5, &["jupiter", "dex", "aggregator", "defi"]),
        signal_json("c", "on-chain-activity", 2, 1.5, &["jupiter", "swap", "trading", "defi"]),
    ]);
    let resp = app.oneshot(post("/analyze", &payload)).await.expect("oneshot /analyze");
    assert!(
        resp.status().is_success(),
        "POST /analyze should be 2xx, got {}",
        resp.status()
    );

    let v = json_body(resp).await;
    let narratives = v.as_array().expect("array of narratives");
    assert_eq!(narratives.len(), 1);

    let n = &narratives[0];
    assert!(n.get("title").is_some(), "missing 'title'");
    assert!(n.get("description").is_some(), "missing 'description'");
    assert!(n.get("score").is_some(), "missing 'score'");
    assert_eq!(n["metrics"]["cross_source_count"], json!(3));
    assert_eq!(n["signals"].as_array().unwrap().len(), 3);
    assert!(
        !n["ideas"].as_array().unwrap().is_empty(),
        "analyze must attach generated ideas"
    );
}

#[tokio::test]
async fn api_analyze_rejects_malformed_weight() {
    let app = test_router();

    let payload = json!([signal_json("bad", "article", 1, -2.0, &["dex"])]);
    let resp = app.oneshot(post("/analyze", &payload)).await.expect("oneshot");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let text = String::from_utf8(bytes).expect("utf8");
    assert!(text.contains("weight"), "error should name the bad field: {text}");
}

#[tokio::test]
async fn api_process_scores_every_signal() {
    let app = test_router();

    let payload = json!([
        signal_json("a", "article", 1, 1.0, &["jupiter", "dex"]),
        signal_json("b", "social-post", 3, 2.0, &["jupiter"]),
    ]);
    let resp = app
        .oneshot(post("/signals/process", &payload))
        .await
        .expect("oneshot /signals/process");
    assert!(resp.status().is_success());

    let v = json_body(resp).await;
    let arr = v.as_array().expect("array of processed signals");
    assert_eq!(arr.len(), 2);
    for p in arr {
        assert!(p.get("normalized_weight").is_some());
        assert!(p.get("recency_score").is_some());
        assert!(p.get("cross_source_score").is_some());
        // flattened signal fields ride along
        assert!(p.get("id").is_some());
        assert!(p.get("keywords").is_some());
    }
}

#[tokio::test]
async fn api_anomalies_flags_spiking_keywords() {
    let app = test_router();

    let mut items: Vec<Value> = (0..8)
        .map(|i| signal_json(&format!("s{i}"), "social-post", 1, 1.0, &["airdrop"]))
        .collect();
    for i in 0..10 {
        let kw = format!("quiet{i}");
        items.push(signal_json(&format!("q{i}"), "article", 1, 1.0, &[kw.as_str()]));
    }
    let payload = Value::Array(items);

    let resp = app
        .oneshot(post("/signals/anomalies", &payload))
        .await
        .expect("oneshot /signals/anomalies");
    assert!(resp.status().is_success());

    let v = json_body(resp).await;
    let arr = v.as_array().expect("array of signals");
    assert!(!arr.is_empty(), "the airdrop spike should be flagged");
    for s in arr {
        assert!(s["keywords"]
            .as_array()
            .unwrap()
            .contains(&json!("airdrop")));
    }
}
