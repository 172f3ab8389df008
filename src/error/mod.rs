use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::template::TemplateError;

/// Error payload returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub message: String,
    /// The HTTP status repeated in the body, e.g. `"404 NOT_FOUND"`
    pub status_code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: status_label(status),
        }
    }
}

/// Render a status as `"<code> <REASON>"`, e.g. `"409 CONFLICT"`
pub fn status_label(status: StatusCode) -> String {
    let reason = status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_ascii_uppercase()
        .replace([' ', '-'], "_");
    format!("{} {}", status.as_u16(), reason)
}

/// HTTP status for each template error kind
pub fn status_for(err: &TemplateError) -> StatusCode {
    match err {
        TemplateError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TemplateError::NotFound(_) => StatusCode::NOT_FOUND,
        TemplateError::Duplicate(_) => StatusCode::CONFLICT,
        TemplateError::InvalidContent(_) | TemplateError::InvalidTemplate { .. } => {
            StatusCode::NOT_ACCEPTABLE
        }
        TemplateError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        TemplateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

impl IntoResponse for TemplateError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let log_message = self.to_string();

        let client_message = if status.is_server_error() {
            // Always log the detailed error server-side
            tracing::error!(
                kind = %self.kind(),
                status = %status.as_u16(),
                message = %log_message,
                "Template request failed"
            );
            if is_production() {
                status.canonical_reason().unwrap_or("Internal error").to_string()
            } else {
                log_message
            }
        } else {
            tracing::debug!(
                kind = %self.kind(),
                status = %status.as_u16(),
                message = %log_message,
                "Template request rejected"
            );
            log_message
        };

        (status, Json(ApiError::new(status, client_message))).into_response()
    }
}
