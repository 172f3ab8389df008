//! Structural validation of incoming template requests

use super::types::{
    CreateMessageTemplateRequest, MessageTemplateContent, NewTemplate, TemplateError,
    TemplateKey, TemplateResult,
};

/// Validate a create request, short-circuiting on the first failure.
///
/// Checks run in a fixed order: request, template, content, html/text
/// content, name, version.
pub fn validate_create_request(
    request: Option<CreateMessageTemplateRequest>,
) -> TemplateResult<NewTemplate> {
    let request = request.ok_or_else(|| invalid("Template Request is null"))?;
    let template = request
        .template
        .ok_or_else(|| invalid("Message Template is null"))?;
    let content = request
        .content
        .ok_or_else(|| invalid("Template Content Object is null"))?;

    check_content(&content)?;

    let name = non_blank(template.template_name).ok_or_else(|| invalid("Template Name is null"))?;
    let version = non_blank(template.version).ok_or_else(|| invalid("Template Version is null"))?;

    tracing::debug!(template_name = %name, version = %version, "Template validation complete");

    Ok(NewTemplate {
        key: TemplateKey::new(name, version),
        owner: template.owner,
        content,
    })
}

/// Validate the body of an update request
pub fn validate_update_content(
    content: Option<MessageTemplateContent>,
) -> TemplateResult<MessageTemplateContent> {
    let content = content.ok_or_else(|| invalid("Template Content Object is null"))?;
    check_content(&content)?;
    Ok(content)
}

fn check_content(content: &MessageTemplateContent) -> TemplateResult<()> {
    if content.html_content.is_empty() || content.text_content.is_empty() {
        return Err(invalid("Template Html or text content is empty"));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn invalid(message: &str) -> TemplateError {
    TemplateError::InvalidRequest(message.to_string())
}
