//! Common test utilities for integration tests.
//!
//! Tests run against a real PostgreSQL database named by `TEST_DATABASE_URL`.
//! When the variable is unset every integration test returns early.
//!
//! Tests share one database and run concurrently, so each test only asserts on
//! the properties it created itself.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use fake::{
    faker::address::en::{CountryName, PostCode, StreetName},
    faker::lorem::en::Sentence,
    faker::name::en::{FirstName, LastName},
    Fake,
};
use property_owner_api::{app::create_app, config::Config};
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tower::ServiceExt;

/// Connect to the test database and bring its schema up to date.
///
/// Returns `None` when `TEST_DATABASE_URL` is not set.
pub async fn create_test_pool() -> Option<PgPool> {
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set, skipping integration test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    persistence::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

pub fn test_config() -> Config {
    let database_url = std::env::var("TEST_DATABASE_URL").unwrap_or_default();
    Config::load_for_test(&[
        ("database.url", database_url.as_str()),
        ("logging.level", "debug"),
        ("logging.format", "pretty"),
    ])
    .expect("Failed to build test config")
}

/// Create a test application router.
pub fn create_test_app(pool: PgPool) -> Router {
    create_app(test_config(), pool)
}

/// A valid property creation body with generated address data.
pub fn property_body(market_value: u32, tenants: Vec<Value>) -> Value {
    let street: String = StreetName().fake();
    let post_code: String = PostCode().fake();
    let country: String = CountryName().fake();
    let description: String = Sentence(3..8).fake();

    json!({
        "description": description,
        "marketValue": market_value,
        "rent": 450,
        "costs": 160,
        "houseNumber": (1..=500).fake::<i32>(),
        "street": street,
        "postCode": post_code,
        "country": country,
        "tenants": tenants
    })
}

/// A valid tenant creation body with generated names.
pub fn tenant_body() -> Value {
    let first: String = FirstName().fake();
    let last: String = LastName().fake();
    json!({ "firstName": first, "lastName": last })
}

/// Build a JSON request.
pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    raw_request(method, uri, serde_json::to_string(&body).unwrap())
}

/// Build a request with a literal body, for malformed and `null` payloads.
pub fn raw_request(method: Method, uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

/// Build a bodyless request.
pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a patch request from `(op, path, value)` triples.
pub fn patch_request(uri: &str, operations: &[(&str, &str, Value)]) -> Request<Body> {
    let document: Vec<Value> = operations
        .iter()
        .map(|(op, path, value)| json!({ "op": op, "path": path, "value": value }))
        .collect();
    json_request(Method::PATCH, uri, Value::Array(document))
}

/// Helper to read a response body as raw bytes.
pub async fn response_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: Response) -> Value {
    let body = response_bytes(response).await;
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Send a request through the router.
pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

/// Create a property via the API and return its JSON representation.
pub async fn create_property(app: &Router, body: Value) -> Value {
    let response = send(app, json_request(Method::POST, "/api/properties", body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    parse_response_body(response).await
}

/// Create a tenant via the API and return its JSON representation.
pub async fn create_tenant(app: &Router, property_id: &str, body: Value) -> Value {
    let uri = format!("/api/properties/{}/tenants", property_id);
    let response = send(app, json_request(Method::POST, &uri, body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    parse_response_body(response).await
}

/// Fetch a property via the API.
pub async fn get_property(app: &Router, property_id: &str) -> (StatusCode, Value) {
    let uri = format!("/api/properties/{}", property_id);
    let response = send(app, empty_request(Method::GET, &uri)).await;
    let status = response.status();
    (status, parse_response_body(response).await)
}
