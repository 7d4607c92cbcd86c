use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use rankpulse_core::config::Config;
use rankpulse_duckdb::DuckDbBackend;
use rankpulse_server::app::build_app;
use rankpulse_server::state::AppState;

fn setup() -> (Arc<AppState>, axum::Router) {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let state = Arc::new(AppState::new(db, Config::default()));
    let app = build_app(Arc::clone(&state));
    (state, app)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json")
}

async fn create_site(app: &axum::Router, name: &str, property_url: &str) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/sites",
            json!({"name": name, "property_url": property_url}),
        ))
        .await
        .expect("response")
}

#[tokio::test]
async fn test_create_get_list_site() {
    let (_state, app) = setup();

    let response = create_site(&app, "Acme Widgets", "sc-domain:acme-widgets.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let site_id = created["data"]["id"].as_str().expect("id").to_string();
    assert!(site_id.starts_with("site_"));
    assert_eq!(
        created["data"]["brand_variations"],
        json!(["acme", "acme widgets", "acme-widgets", "acmewidgets", "widgets"])
    );

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/api/sites/{site_id}")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = json_body(response).await;
    assert_eq!(fetched["data"]["name"], "Acme Widgets");

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/sites"))
        .await
        .expect("response");
    let listed = json_body(response).await;
    assert_eq!(listed["data"].as_array().expect("array").len(), 1);
}

#[tokio::test]
async fn test_create_site_validation_and_conflict() {
    let (_state, app) = setup();

    let response = create_site(&app, "", "https://acme.com/").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["field"], Value::Null);

    let response = create_site(&app, "Acme", "https://acme.com/").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = create_site(&app, "Acme again", "HTTPS://ACME.COM/").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_site_is_404() {
    let (_state, app) = setup();
    for uri in [
        "/api/sites/site_missing",
        "/api/sites/site_missing/keywords",
        "/api/sites/site_missing/dashboard",
    ] {
        let response = app
            .clone()
            .oneshot(empty_request("GET", uri))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "not_found");
    }
}

#[tokio::test]
async fn test_delete_site_evicts_cache() {
    let (state, app) = setup();
    let created = json_body(create_site(&app, "Acme", "https://acme.com/").await).await;
    let site_id = created["data"]["id"].as_str().expect("id").to_string();
    assert!(state.is_valid_site(&site_id).await);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/api/sites/{site_id}")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!state.site_cache.read().await.contains(&site_id));
    assert!(!state.is_valid_site(&site_id).await);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/api/sites/{site_id}")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
