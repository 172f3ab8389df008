//! Response middleware for the registry router.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ApiError;

/// Give router and layer errors the same `ApiError` body as handler errors
///
/// Handler errors already carry a JSON payload and pass through untouched.
/// Rejections produced outside the handlers (405 from method routing, 413 from
/// the body limit, 400 from path extraction) are replaced, keeping the `Allow`
/// header.
pub async fn json_error_body(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut rewritten =
        (status, Json(ApiError::new(status, message_for(status)))).into_response();
    if let Some(allow) = allow {
        rewritten.headers_mut().insert(header::ALLOW, allow);
    }

    tracing::debug!(status = %status.as_u16(), "Replaced non-JSON error body");
    rewritten
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/json"))
}

fn message_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => "Request body exceeds the configured size limit",
        StatusCode::METHOD_NOT_ALLOWED => "Method not allowed for this path",
        StatusCode::BAD_REQUEST => "Malformed request",
        _ => status.canonical_reason().unwrap_or("Request failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::status_label;
    use axum::{body::Body, http::HeaderValue, middleware, routing::get, Router};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/json", get(|| async {
                (StatusCode::CONFLICT, Json(ApiError::new(StatusCode::CONFLICT, "taken")))
            }))
            .route("/plain", get(|| async { (StatusCode::PAYLOAD_TOO_LARGE, "too big") }))
            .route("/ok", get(|| async { "fine" }))
            .layer(middleware::from_fn(json_error_body))
    }

    async fn call(method: &str, uri: &str) -> (StatusCode, Option<HeaderValue>, Vec<u8>) {
        let response = app()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let allow = response.headers().get(header::ALLOW).cloned();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, allow, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_plain_error_is_rewritten() {
        let (status, _, body) = call("GET", "/plain").await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.status_code, status_label(StatusCode::PAYLOAD_TOO_LARGE));
    }

    #[tokio::test]
    async fn test_method_not_allowed_keeps_allow_header() {
        let (status, allow, body) = call("POST", "/ok").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(allow.is_some());
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.status_code, "405 METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn test_json_errors_and_success_untouched() {
        let (status, _, body) = call("GET", "/json").await;
        assert_eq!(status, StatusCode::CONFLICT);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.message, "taken");

        let (status, _, body) = call("GET", "/ok").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"fine");
    }
}
