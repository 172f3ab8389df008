//! Persistence collaborator for templates.
//!
//! `TemplateStore` abstracts the store of record so that the registry can run
//! against the in-memory implementation here or any other backend.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::types::{
    DeleteTemplateResponse, HealthStatus, MessageTemplate, MessageTemplateContent, NewTemplate,
    PersistenceServiceHealthResponse, TemplateError, TemplateKey, TemplateResult,
};

/// Store of record for templates.
///
/// Implementations are responsible for key uniqueness under concurrent
/// creates; the registry performs no locking of its own.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// All stored templates, ordered by name then version.
    async fn list_templates(&self) -> TemplateResult<Vec<MessageTemplate>>;

    async fn get_template(&self, key: &TemplateKey) -> TemplateResult<MessageTemplateContent>;

    /// Fails with `Duplicate` if the key already exists.
    async fn create_template(&self, template: NewTemplate) -> TemplateResult<MessageTemplate>;

    async fn update_template(
        &self,
        key: &TemplateKey,
        content: MessageTemplateContent,
    ) -> TemplateResult<MessageTemplate>;

    async fn delete_template(&self, key: &TemplateKey) -> TemplateResult<DeleteTemplateResponse>;

    async fn service_health(&self) -> TemplateResult<PersistenceServiceHealthResponse>;
}

/// Limits enforced by the in-memory store
#[derive(Debug, Clone)]
pub struct StoreLimits {
    /// Maximum number of stored templates
    pub max_templates: usize,
    /// Maximum combined size of html, text and subject in bytes
    pub max_content_bytes: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_templates: 10_000,
            max_content_bytes: 512 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredTemplate {
    template: MessageTemplate,
    content: MessageTemplateContent,
}

/// In-memory template store using DashMap.
///
/// Contents are lost on restart.
pub struct MemoryTemplateStore {
    templates: DashMap<TemplateKey, StoredTemplate>,
    limits: StoreLimits,
}

impl Default for MemoryTemplateStore {
    fn default() -> Self {
        Self::new(StoreLimits::default())
    }
}

impl MemoryTemplateStore {
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            templates: DashMap::new(),
            limits,
        }
    }

    /// Number of stored templates
    pub fn count(&self) -> usize {
        self.templates.len()
    }

    pub fn exists(&self, key: &TemplateKey) -> bool {
        self.templates.contains_key(key)
    }

    fn check_content_size(&self, content: &MessageTemplateContent) -> TemplateResult<()> {
        let size = content.byte_len();
        if size > self.limits.max_content_bytes {
            return Err(TemplateError::InvalidContent(format!(
                "content is {} bytes, limit is {}",
                size, self.limits.max_content_bytes
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn list_templates(&self) -> TemplateResult<Vec<MessageTemplate>> {
        let mut templates: Vec<MessageTemplate> = self
            .templates
            .iter()
            .map(|entry| entry.value().template.clone())
            .collect();
        templates.sort_by(|a, b| {
            (&a.template_name, &a.version).cmp(&(&b.template_name, &b.version))
        });
        Ok(templates)
    }

    async fn get_template(&self, key: &TemplateKey) -> TemplateResult<MessageTemplateContent> {
        self.templates
            .get(key)
            .map(|stored| stored.content.clone())
            .ok_or_else(|| TemplateError::NotFound(key.clone()))
    }

    async fn create_template(&self, template: NewTemplate) -> TemplateResult<MessageTemplate> {
        self.check_content_size(&template.content)?;

        if self.templates.contains_key(&template.key) {
            return Err(TemplateError::Duplicate(template.key));
        }

        // Checked before taking the entry lock; len() reads every shard
        if self.templates.len() >= self.limits.max_templates {
            return Err(TemplateError::ServiceUnavailable(format!(
                "template capacity of {} reached",
                self.limits.max_templates
            )));
        }

        match self.templates.entry(template.key.clone()) {
            Entry::Occupied(_) => Err(TemplateError::Duplicate(template.key)),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let stored = StoredTemplate {
                    template: MessageTemplate {
                        template_name: template.key.name,
                        version: template.key.version,
                        owner: template.owner,
                        created_at: now,
                        updated_at: now,
                    },
                    content: template.content,
                };
                let created = stored.template.clone();
                slot.insert(stored);
                Ok(created)
            }
        }
    }

    async fn update_template(
        &self,
        key: &TemplateKey,
        content: MessageTemplateContent,
    ) -> TemplateResult<MessageTemplate> {
        let mut stored = self
            .templates
            .get_mut(key)
            .ok_or_else(|| TemplateError::NotFound(key.clone()))?;

        self.check_content_size(&content)?;
        stored.content = content;
        stored.template.updated_at = Utc::now();

        Ok(stored.template.clone())
    }

    async fn delete_template(&self, key: &TemplateKey) -> TemplateResult<DeleteTemplateResponse> {
        self.templates
            .remove(key)
            .map(|(key, _)| DeleteTemplateResponse::deleted(key))
            .ok_or_else(|| TemplateError::NotFound(key.clone()))
    }

    async fn service_health(&self) -> TemplateResult<PersistenceServiceHealthResponse> {
        let count = self.templates.len();

        let (status, detail) = if count >= self.limits.max_templates {
            (
                HealthStatus::Degraded,
                Some(format!(
                    "template capacity reached ({}/{})",
                    count, self.limits.max_templates
                )),
            )
        } else {
            (HealthStatus::Up, None)
        };

        Ok(PersistenceServiceHealthResponse {
            status,
            detail,
            template_count: Some(count),
        })
    }
}
