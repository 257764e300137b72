//! JSON request body extractor.
//!
//! Unlike `axum::Json`, a missing body, a literal `null` and malformed JSON
//! are all rejected through [`ApiError::Validation`], so every bad request
//! shares one response shape. Bodies over the size limit are 413.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Deserialized request body that is required to be present.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(rejection.body_text()),
                status if status.is_server_error() => ApiError::Internal(rejection.body_text()),
                _ => ApiError::Validation(rejection.body_text()),
            })?;

        parse_body(&bytes).map(JsonBody)
    }
}

/// Parses a required JSON body.
pub fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::Validation("Request body is required".into()));
    }

    let value: Option<T> = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::Validation(format!("Malformed request body: {}", e)))?;

    value.ok_or_else(|| ApiError::Validation("Request body is required".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest};
    use domain::models::PatchDocument;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Named {
        first_name: String,
    }

    fn is_validation(result: Result<Named, ApiError>) -> bool {
        matches!(result, Err(ApiError::Validation(_)))
    }

    #[test]
    fn test_parse_body_ok() {
        let parsed: Named = parse_body(br#"{"firstName": "Marta"}"#).unwrap();
        assert_eq!(parsed.first_name, "Marta");
    }

    #[test]
    fn test_parse_body_empty() {
        assert!(is_validation(parse_body(b"")));
        assert!(is_validation(parse_body(b"  \n")));
    }

    #[test]
    fn test_parse_body_null() {
        assert!(is_validation(parse_body(b"null")));
    }

    #[test]
    fn test_parse_body_malformed() {
        assert!(is_validation(parse_body(b"{\"firstName\": ")));
        assert!(is_validation(parse_body(b"[1, 2]")));
    }

    #[test]
    fn test_parse_body_null_patch_document() {
        let result: Result<PatchDocument, ApiError> = parse_body(b"null");
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_extractor_reads_request_body() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"firstName": "Adam"}"#))
            .unwrap();

        let JsonBody(named) = JsonBody::<Named>::from_request(request, &()).await.unwrap();
        assert_eq!(named.first_name, "Adam");
    }

    #[tokio::test]
    async fn test_oversized_body_is_payload_too_large() {
        use axum::{extract::DefaultBodyLimit, routing::post, Json, Router};
        use tower::ServiceExt;

        async fn echo(JsonBody(value): JsonBody<serde_json::Value>) -> Json<serde_json::Value> {
            Json(value)
        }

        let app = Router::new()
            .route("/", post(echo))
            .layer(DefaultBodyLimit::max(8));

        let request = HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"firstName": "Justyna"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let request = HttpRequest::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("[1]"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_extractor_rejects_missing_body() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/")
            .body(Body::empty())
            .unwrap();

        let result = JsonBody::<Named>::from_request(request, &()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
