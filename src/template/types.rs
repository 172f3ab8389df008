//! Template data model and error types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Request body missing, malformed, or failing structural validation
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Template not found: {0}")]
    NotFound(TemplateKey),

    #[error("Template already exists: {0}")]
    Duplicate(TemplateKey),

    /// Content rejected by the store
    #[error("Invalid template content: {0}")]
    InvalidContent(String),

    /// Content rejected by the renderer
    #[error("Invalid template {part}: {reason}")]
    InvalidTemplate { part: TemplatePart, reason: String },

    #[error("Persistence service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TemplateError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            TemplateError::InvalidRequest(_) => "invalid_request",
            TemplateError::NotFound(_) => "not_found",
            TemplateError::Duplicate(_) => "duplicate",
            TemplateError::InvalidContent(_) => "invalid_content",
            TemplateError::InvalidTemplate { .. } => "invalid_template",
            TemplateError::ServiceUnavailable(_) => "service_unavailable",
            TemplateError::Internal(_) => "internal",
        }
    }
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Unique identity of a template: name plus version
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateKey {
    pub name: String,
    pub version: String,
}

impl TemplateKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// Part of the content a renderer failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplatePart {
    Html,
    Text,
    Subject,
}

impl fmt::Display for TemplatePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TemplatePart::Html => "html content",
            TemplatePart::Text => "text content",
            TemplatePart::Subject => "subject",
        };
        f.write_str(label)
    }
}

/// A stored template's identity and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplate {
    pub template_name: String,

    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl MessageTemplate {
    pub fn key(&self) -> TemplateKey {
        TemplateKey::new(&self.template_name, &self.version)
    }
}

/// Content associated with a template version
///
/// Missing html/text fields deserialize as empty strings so that validation
/// reports them the same way as explicitly empty ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplateContent {
    #[serde(default)]
    pub html_content: String,

    #[serde(default)]
    pub text_content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl MessageTemplateContent {
    pub fn new(html: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            html_content: html.into(),
            text_content: text.into(),
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Combined size of all parts in bytes
    pub fn byte_len(&self) -> usize {
        self.html_content.len()
            + self.text_content.len()
            + self.subject.as_ref().map_or(0, String::len)
    }
}

/// Template identity as supplied by a client on create
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
    pub template_name: Option<String>,

    pub version: Option<String>,

    pub owner: Option<String>,
}

/// Request body for `POST /template/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMessageTemplateRequest {
    pub template: Option<TemplateDefinition>,

    pub content: Option<MessageTemplateContent>,
}

/// A create request that passed validation
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub key: TemplateKey,
    pub owner: Option<String>,
    pub content: MessageTemplateContent,
}

/// Confirmation of a completed delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTemplateResponse {
    pub template_name: String,

    pub version: String,

    pub status: String,
}

impl DeleteTemplateResponse {
    pub fn deleted(key: TemplateKey) -> Self {
        Self {
            template_name: key.name,
            version: key.version,
            status: "DELETED".to_string(),
        }
    }
}

/// Backing store health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Degraded,
    Down,
}

/// Snapshot of the persistence service health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceServiceHealthResponse {
    pub status: HealthStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_count: Option<usize>,
}

impl PersistenceServiceHealthResponse {
    pub fn down(detail: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Down,
            detail: Some(detail.into()),
            template_count: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_missing_fields_default_to_empty() {
        let content: MessageTemplateContent =
            serde_json::from_value(json!({"htmlContent": "<p>Hi</p>"})).unwrap();
        assert_eq!(content.html_content, "<p>Hi</p>");
        assert!(content.text_content.is_empty());
        assert!(content.subject.is_none());
    }

    #[test]
    fn test_create_request_camel_case() {
        let request: CreateMessageTemplateRequest = serde_json::from_value(json!({
            "template": {"templateName": "welcome", "version": "1", "owner": "marketing"},
            "content": {"htmlContent": "<p>Hi</p>", "textContent": "Hi", "subject": "Hello"}
        }))
        .unwrap();

        let template = request.template.unwrap();
        assert_eq!(template.template_name.as_deref(), Some("welcome"));
        assert_eq!(template.owner.as_deref(), Some("marketing"));
        assert_eq!(request.content.unwrap().subject.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_health_status_serializes_uppercase() {
        let health = PersistenceServiceHealthResponse {
            status: HealthStatus::Degraded,
            detail: None,
            template_count: Some(3),
        };
        let value = serde_json::to_value(&health).unwrap();
        assert_eq!(value, json!({"status": "DEGRADED", "templateCount": 3}));
    }

    #[test]
    fn test_delete_response_fields() {
        let response = DeleteTemplateResponse::deleted(TemplateKey::new("welcome", "1"));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"templateName": "welcome", "version": "1", "status": "DELETED"})
        );
    }

    #[test]
    fn test_error_messages() {
        let err = TemplateError::NotFound(TemplateKey::new("missing", "1"));
        assert_eq!(err.to_string(), "Template not found: missing/1");

        let err = TemplateError::InvalidTemplate {
            part: TemplatePart::Subject,
            reason: "unterminated placeholder".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid template subject: unterminated placeholder");
    }
}
