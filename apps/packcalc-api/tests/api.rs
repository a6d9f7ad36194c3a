//! Router tests: requests go through the full axum stack via `oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use packcalc_api::{build_router, AppState, PackService};
use packcalc_core::DEFAULT_PACK_SIZES;
use packcalc_db::{CalculationLog, MemoryStore, PackStore, SqliteStore};

fn app_with(store: Arc<dyn PackStore>) -> Router {
    build_router(AppState::new(PackService::new(store)))
}

fn app() -> Router {
    app_with(Arc::new(MemoryStore::with_catalog(&DEFAULT_PACK_SIZES).unwrap()))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let ts = body["ts"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
}

#[tokio::test]
async fn test_health_reports_closed_database() {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    let app = app_with(store.clone());

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    store.database().close().await;

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}

// =============================================================================
// Packs
// =============================================================================

#[tokio::test]
async fn test_get_and_set_packs() {
    let app = app();

    let (status, body) = send(&app, get("/packs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "packs": [250, 500, 1000, 2000, 5000] }));

    let (status, body) = send(&app, post_json("/packs", json!({ "packs": [53, 23, 31, 23] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (_, body) = send(&app, get("/packs")).await;
    assert_eq!(body["packs"], json!([23, 31, 53]));
}

#[tokio::test]
async fn test_set_packs_rejects_invalid_catalog() {
    let app = app();

    for packs in [json!([]), json!([250, 0]), json!([-5])] {
        let (status, body) = send(&app, post_json("/packs", json!({ "packs": packs }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    // Previous catalog survives
    let (_, body) = send(&app, get("/packs")).await;
    assert_eq!(body["packs"], json!([250, 500, 1000, 2000, 5000]));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/packs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"packs\": [250,"))
        .unwrap();

    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(&app(), post_json("/packs", json!({ "packs": "250" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Calculate
// =============================================================================

#[tokio::test]
async fn test_calculate_default_catalog() {
    let app = app();

    let (status, body) = send(&app, post_json("/calculate", json!({ "items": 12001 }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"], json!({ "250": 1, "2000": 1, "5000": 2 }));
    assert_eq!(body["total_items"], 12250);
    assert_eq!(body["pack_count"], 4);
    assert_eq!(body["waste"], 249);
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_calculate_with_request_catalog() {
    let app = app();

    let body = json!({ "items": 500000, "packs": [23, 31, 53] });
    let (status, body) = send(&app, post_json("/calculate", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"], json!({ "23": 2, "31": 7, "53": 9429 }));
    assert_eq!(body["waste"], 0);

    // Stored catalog untouched
    let (_, body) = send(&app, get("/packs")).await;
    assert_eq!(body["packs"], json!([250, 500, 1000, 2000, 5000]));
}

#[tokio::test]
async fn test_calculate_rejects_non_positive_items() {
    let store = Arc::new(MemoryStore::with_catalog(&DEFAULT_PACK_SIZES).unwrap());
    let app = app_with(store.clone());

    for items in [0, -1] {
        let (status, body) = send(&app, post_json("/calculate", json!({ "items": items }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_calculate_empty_catalog() {
    let app = app_with(Arc::new(MemoryStore::new()));

    let (status, body) = send(&app, post_json("/calculate", json!({ "items": 100 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_calculate_over_search_ceiling() {
    let store = Arc::new(MemoryStore::with_catalog(&[250]).unwrap());
    let service = PackService::new(store).with_max_search_limit(1_000);
    let app = build_router(AppState::new(service));

    let (status, body) = send(&app, post_json("/calculate", json!({ "items": 10000 }))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "RESOURCE_EXCEEDED");
}

// =============================================================================
// Calculations
// =============================================================================

#[tokio::test]
async fn test_history_newest_first() {
    let app = app();

    for items in [1, 251, 501] {
        send(&app, post_json("/calculate", json!({ "items": items }))).await;
    }

    let (status, body) = send(&app, get("/calculations")).await;
    assert_eq!(status, StatusCode::OK);
    let items: Vec<i64> = body["calculations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["items"].as_i64().unwrap())
        .collect();
    assert_eq!(items, vec![501, 251, 1]);

    let (_, body) = send(&app, get("/calculations?limit=2")).await;
    assert_eq!(body["calculations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_history_limit_bounds() {
    let app = app();

    for uri in ["/calculations?limit=0", "/calculations?limit=101", "/calculations?limit=abc"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    let (status, _) = send(&app, get("/calculations?limit=100")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_calculation_by_id() {
    let app = app();

    let (_, created) = send(&app, post_json("/calculate", json!({ "items": 501 }))).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, get(&format!("/calculations/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["items"], 501);
    assert_eq!(body["breakdown"], json!({ "250": 1, "500": 1 }));

    let (status, body) = send(&app, get("/calculations/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

// =============================================================================
// Routing & Middleware
// =============================================================================

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = send(&app(), get("/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "No route for /nope");
}

#[tokio::test]
async fn test_cors_preflight() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/calculate")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let allow_methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(allow_methods.contains("POST"));
}

#[tokio::test]
async fn test_sqlite_backed_router() {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    let app = app_with(store.clone());

    let (status, _) = send(&app, post_json("/packs", json!({ "packs": [4, 6] }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, post_json("/calculate", json!({ "items": 7 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"], json!({ "4": 2 }));
    assert_eq!(body["total_items"], 8);

    let (_, body) = send(&app, get("/calculations")).await;
    assert_eq!(body["calculations"][0]["total_items"], 8);
    assert_eq!(store.count().await.unwrap(), 1);
}
