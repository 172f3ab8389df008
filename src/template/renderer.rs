//! Placeholder renderer used to check template content before it is stored

use serde::Serialize;

use super::types::{MessageTemplateContent, TemplateError, TemplatePart, TemplateResult};

/// Capability consulted for content validity before create and update
pub trait ContentValidator: Send + Sync {
    /// Reject content the renderer could not render
    fn validate(&self, content: &MessageTemplateContent) -> TemplateResult<()>;
}

/// Content with every placeholder substituted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedContent {
    pub html_content: String,
    pub text_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Renderer for `{{variable}}` placeholders
///
/// Placeholder names may contain ASCII letters, digits, `_`, `.` and `-`;
/// surrounding whitespace inside the braces is ignored.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderValidator;

impl PlaceholderValidator {
    pub fn new() -> Self {
        Self
    }

    /// Render all parts of `content` with values from a JSON object.
    ///
    /// Placeholders without a matching variable are left untouched.
    pub fn render(
        &self,
        content: &MessageTemplateContent,
        variables: &serde_json::Value,
    ) -> TemplateResult<RenderedContent> {
        let vars = match variables {
            serde_json::Value::Object(map) => map,
            _ => {
                return Err(TemplateError::InvalidRequest(
                    "Variables must be an object".to_string(),
                ))
            }
        };

        Ok(RenderedContent {
            html_content: render_part(TemplatePart::Html, &content.html_content, vars)?,
            text_content: render_part(TemplatePart::Text, &content.text_content, vars)?,
            subject: content
                .subject
                .as_deref()
                .map(|s| render_part(TemplatePart::Subject, s, vars))
                .transpose()?,
        })
    }
}

impl ContentValidator for PlaceholderValidator {
    fn validate(&self, content: &MessageTemplateContent) -> TemplateResult<()> {
        check_part(TemplatePart::Html, &content.html_content)?;
        check_part(TemplatePart::Text, &content.text_content)?;
        if let Some(subject) = &content.subject {
            check_part(TemplatePart::Subject, subject)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn check_part(part: TemplatePart, input: &str) -> TemplateResult<()> {
    parse(input)
        .map(|_| ())
        .map_err(|reason| TemplateError::InvalidTemplate { part, reason })
}

fn render_part(
    part: TemplatePart,
    input: &str,
    variables: &serde_json::Map<String, serde_json::Value>,
) -> TemplateResult<String> {
    let segments = parse(input).map_err(|reason| TemplateError::InvalidTemplate { part, reason })?;

    let mut output = String::with_capacity(input.len());
    for segment in segments {
        match segment {
            Segment::Literal(text) => output.push_str(text),
            Segment::Placeholder(name) => match variables.get(name) {
                Some(value) => output.push_str(&value_to_string(value)),
                None => {
                    output.push_str("{{");
                    output.push_str(name);
                    output.push_str("}}");
                }
            },
        }
    }
    Ok(output)
}

fn parse(input: &str) -> Result<Vec<Segment<'_>>, String> {
    let mut segments = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find("{{") {
        push_literal(&mut segments, &rest[..start])?;

        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| "unterminated placeholder".to_string())?;
        let name = after[..end].trim();
        check_name(name)?;
        segments.push(Segment::Placeholder(name));

        rest = &after[end + 2..];
    }
    push_literal(&mut segments, rest)?;

    Ok(segments)
}

fn push_literal<'a>(segments: &mut Vec<Segment<'a>>, literal: &'a str) -> Result<(), String> {
    if literal.contains("}}") {
        return Err("unmatched '}}'".to_string());
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("empty placeholder".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(format!("invalid placeholder name '{}'", name));
    }
    Ok(())
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        // Arrays and objects render as JSON
        _ => value.to_string(),
    }
}
