//! Template CRUD endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::de::DeserializeOwned;

use crate::server::AppState;
use crate::template::{
    CreateMessageTemplateRequest, DeleteTemplateResponse, MessageTemplate, MessageTemplateContent,
    PersistenceServiceHealthResponse, TemplateError, TemplateResult,
};

/// Bind a JSON body. An empty body or a literal `null` yields `None` so the
/// registry can report which part of the request is missing.
fn bind_body<T: DeserializeOwned>(body: &[u8]) -> TemplateResult<Option<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice::<Option<T>>(body)
        .map_err(|e| TemplateError::InvalidRequest(format!("Malformed request body: {}", e)))
}

/// GET /template/list - List all templates
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageTemplate>>, TemplateError> {
    let templates = state.registry.list().await?;
    Ok(Json(templates))
}

/// GET /template/{templateName}/{templateVersion} - Get template content
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path((template_name, template_version)): Path<(String, String)>,
) -> Result<Json<MessageTemplateContent>, TemplateError> {
    let content = state
        .registry
        .get(&template_name, &template_version)
        .await?;
    Ok(Json(content))
}

/// POST /template/ - Create a new template
#[tracing::instrument(name = "http.create_template", skip(state, body))]
pub async fn create_template(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageTemplate>, TemplateError> {
    let request = bind_body::<CreateMessageTemplateRequest>(&body)?;
    let created = state.registry.create(request).await?;
    Ok(Json(created))
}

/// PUT /template/{templateName}/{templateVersion} - Replace template content
#[tracing::instrument(name = "http.update_template", skip(state, body))]
pub async fn update_template(
    State(state): State<AppState>,
    Path((template_name, template_version)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<MessageTemplate>, TemplateError> {
    let content = bind_body::<MessageTemplateContent>(&body)?;
    let updated = state
        .registry
        .update(&template_name, &template_version, content)
        .await?;
    Ok(Json(updated))
}

/// DELETE /template/{templateName}/{templateVersion} - Delete a template
#[tracing::instrument(name = "http.delete_template", skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    Path((template_name, template_version)): Path<(String, String)>,
) -> Result<Json<DeleteTemplateResponse>, TemplateError> {
    let deleted = state
        .registry
        .delete(&template_name, &template_version)
        .await?;
    Ok(Json(deleted))
}

/// GET /template/healthCheck - Persistence service health
#[tracing::instrument(name = "http.template_health", skip(state))]
pub async fn template_health(
    State(state): State<AppState>,
) -> Json<PersistenceServiceHealthResponse> {
    Json(state.registry.health_check().await)
}
