//! Message template registry.
//!
//! This module provides:
//! - The template data model (identity, content, request and response records)
//! - Structural validation of create and update requests
//! - A placeholder renderer consulted for content validity
//! - The `TemplateStore` persistence capability with an in-memory implementation
//! - `TemplateRegistry`, which ties validation and persistence together
//!
//! # Example
//!
//! ```ignore
//! let registry = TemplateRegistry::new(
//!     Arc::new(MemoryTemplateStore::default()),
//!     Arc::new(PlaceholderValidator::new()),
//! );
//!
//! let request: CreateMessageTemplateRequest = serde_json::from_value(json!({
//!     "template": {"templateName": "welcome", "version": "1"},
//!     "content": {"htmlContent": "<p>Hi {{name}}</p>", "textContent": "Hi {{name}}"}
//! }))?;
//!
//! let created = registry.create(Some(request)).await?;
//! let content = registry.get("welcome", "1").await?;
//! ```

mod registry;
mod renderer;
mod store;
mod types;
mod validation;

pub use registry::TemplateRegistry;
pub use renderer::{ContentValidator, PlaceholderValidator, RenderedContent};
pub use store::{MemoryTemplateStore, StoreLimits, TemplateStore};
pub use types::{
    CreateMessageTemplateRequest, DeleteTemplateResponse, HealthStatus, MessageTemplate,
    MessageTemplateContent, NewTemplate, PersistenceServiceHealthResponse, TemplateDefinition,
    TemplateError, TemplateKey, TemplatePart, TemplateResult,
};
pub use validation::{validate_create_request, validate_update_content};
