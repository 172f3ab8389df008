//! Template registry: validates requests and delegates to the persistence
//! collaborator.

use std::sync::Arc;

use crate::metrics::{OperationTimer, TEMPLATES_STORED};

use super::renderer::ContentValidator;
use super::store::TemplateStore;
use super::types::{
    CreateMessageTemplateRequest, DeleteTemplateResponse, MessageTemplate,
    MessageTemplateContent, PersistenceServiceHealthResponse, TemplateKey, TemplateResult,
};
use super::validation::{validate_create_request, validate_update_content};

/// Stateless front for template operations.
///
/// Holds only shared handles to its collaborators, so it can be cloned into
/// every request.
#[derive(Clone)]
pub struct TemplateRegistry {
    store: Arc<dyn TemplateStore>,
    validator: Arc<dyn ContentValidator>,
}

impl TemplateRegistry {
    pub fn new(store: Arc<dyn TemplateStore>, validator: Arc<dyn ContentValidator>) -> Self {
        Self { store, validator }
    }

    /// List all templates
    #[tracing::instrument(name = "registry.list", skip(self))]
    pub async fn list(&self) -> TemplateResult<Vec<MessageTemplate>> {
        let timer = OperationTimer::start("list");
        let result = self.store.list_templates().await;
        if let Ok(templates) = &result {
            TEMPLATES_STORED.set(templates.len() as i64);
        }
        observe(timer, result)
    }

    /// Get the content of one template version
    #[tracing::instrument(name = "registry.get", skip(self))]
    pub async fn get(&self, name: &str, version: &str) -> TemplateResult<MessageTemplateContent> {
        let timer = OperationTimer::start("get");
        let result = self.store.get_template(&TemplateKey::new(name, version)).await;
        observe(timer, result)
    }

    /// Validate and create a template
    #[tracing::instrument(name = "registry.create", skip(self, request))]
    pub async fn create(
        &self,
        request: Option<CreateMessageTemplateRequest>,
    ) -> TemplateResult<MessageTemplate> {
        let timer = OperationTimer::start("create");
        let result = self.try_create(request).await;
        if let Ok(created) = &result {
            TEMPLATES_STORED.inc();
            tracing::info!(
                template_name = %created.template_name,
                version = %created.version,
                "Template created"
            );
        }
        observe(timer, result)
    }

    async fn try_create(
        &self,
        request: Option<CreateMessageTemplateRequest>,
    ) -> TemplateResult<MessageTemplate> {
        let template = validate_create_request(request)?;
        self.validator.validate(&template.content)?;
        self.store.create_template(template).await
    }

    /// Replace the content of an existing template version
    #[tracing::instrument(name = "registry.update", skip(self, content))]
    pub async fn update(
        &self,
        name: &str,
        version: &str,
        content: Option<MessageTemplateContent>,
    ) -> TemplateResult<MessageTemplate> {
        let timer = OperationTimer::start("update");
        let result = self.try_update(TemplateKey::new(name, version), content).await;
        if result.is_ok() {
            tracing::info!(template_name = %name, version = %version, "Template updated");
        }
        observe(timer, result)
    }

    async fn try_update(
        &self,
        key: TemplateKey,
        content: Option<MessageTemplateContent>,
    ) -> TemplateResult<MessageTemplate> {
        let content = validate_update_content(content)?;
        self.validator.validate(&content)?;
        self.store.update_template(&key, content).await
    }

    /// Delete a template version
    #[tracing::instrument(name = "registry.delete", skip(self))]
    pub async fn delete(&self, name: &str, version: &str) -> TemplateResult<DeleteTemplateResponse> {
        let timer = OperationTimer::start("delete");
        let result = self
            .store
            .delete_template(&TemplateKey::new(name, version))
            .await;
        if result.is_ok() {
            TEMPLATES_STORED.dec();
            tracing::info!(template_name = %name, version = %version, "Template deleted");
        }
        observe(timer, result)
    }

    /// Report persistence health. Never fails: a store error becomes `DOWN`.
    #[tracing::instrument(name = "registry.health_check", skip(self))]
    pub async fn health_check(&self) -> PersistenceServiceHealthResponse {
        let timer = OperationTimer::start("health_check");
        match self.store.service_health().await {
            Ok(health) => {
                if let Some(count) = health.template_count {
                    TEMPLATES_STORED.set(count as i64);
                }
                timer.finish("ok");
                health
            }
            Err(e) => {
                tracing::warn!(error = %e, "Persistence health check failed");
                timer.finish(e.kind());
                PersistenceServiceHealthResponse::down(e.to_string())
            }
        }
    }
}

fn observe<T>(timer: OperationTimer, result: TemplateResult<T>) -> TemplateResult<T> {
    match &result {
        Ok(_) => timer.finish("ok"),
        Err(e) => timer.finish(e.kind()),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::template::renderer::PlaceholderValidator;
    use crate::template::store::MemoryTemplateStore;
    use crate::template::types::{
        HealthStatus, NewTemplate, TemplateDefinition, TemplateError,
    };

    /// Wraps a memory store and counts calls that reach it
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryTemplateStore,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl TemplateStore for CountingStore {
        async fn list_templates(&self) -> TemplateResult<Vec<MessageTemplate>> {
            self.hit();
            self.inner.list_templates().await
        }

        async fn get_template(&self, key: &TemplateKey) -> TemplateResult<MessageTemplateContent> {
            self.hit();
            self.inner.get_template(key).await
        }

        async fn create_template(&self, template: NewTemplate) -> TemplateResult<MessageTemplate> {
            self.hit();
            self.inner.create_template(template).await
        }

        async fn update_template(
            &self,
            key: &TemplateKey,
            content: MessageTemplateContent,
        ) -> TemplateResult<MessageTemplate> {
            self.hit();
            self.inner.update_template(key, content).await
        }

        async fn delete_template(&self, key: &TemplateKey) -> TemplateResult<DeleteTemplateResponse> {
            self.hit();
            self.inner.delete_template(key).await
        }

        async fn service_health(&self) -> TemplateResult<PersistenceServiceHealthResponse> {
            self.hit();
            self.inner.service_health().await
        }
    }

    /// A store whose every call fails
    struct BrokenStore;

    #[async_trait]
    impl TemplateStore for BrokenStore {
        async fn list_templates(&self) -> TemplateResult<Vec<MessageTemplate>> {
            Err(TemplateError::Internal("connection reset".to_string()))
        }

        async fn get_template(&self, _key: &TemplateKey) -> TemplateResult<MessageTemplateContent> {
            Err(TemplateError::Internal("connection reset".to_string()))
        }

        async fn create_template(&self, _template: NewTemplate) -> TemplateResult<MessageTemplate> {
            Err(TemplateError::ServiceUnavailable("read only".to_string()))
        }

        async fn update_template(
            &self,
            _key: &TemplateKey,
            _content: MessageTemplateContent,
        ) -> TemplateResult<MessageTemplate> {
            Err(TemplateError::ServiceUnavailable("read only".to_string()))
        }

        async fn delete_template(&self, _key: &TemplateKey) -> TemplateResult<DeleteTemplateResponse> {
            Err(TemplateError::ServiceUnavailable("read only".to_string()))
        }

        async fn service_health(&self) -> TemplateResult<PersistenceServiceHealthResponse> {
            Err(TemplateError::ServiceUnavailable("backing store offline".to_string()))
        }
    }

    fn registry_with(store: Arc<dyn TemplateStore>) -> TemplateRegistry {
        TemplateRegistry::new(store, Arc::new(PlaceholderValidator::new()))
    }

    fn create_request(name: &str, version: &str, html: &str, text: &str) -> CreateMessageTemplateRequest {
        CreateMessageTemplateRequest {
            template: Some(TemplateDefinition {
                template_name: Some(name.to_string()),
                version: Some(version.to_string()),
                owner: None,
            }),
            content: Some(MessageTemplateContent::new(html, text)),
        }
    }

    #[tokio::test]
    async fn test_invalid_create_never_reaches_store() {
        let store = Arc::new(CountingStore::default());
        let registry = registry_with(store.clone());

        let result = registry
            .create(Some(create_request("welcome", "1", "", "Hi")))
            .await;
        match result {
            Err(TemplateError::InvalidRequest(msg)) => {
                assert_eq!(msg, "Template Html or text content is empty")
            }
            other => panic!("expected InvalidRequest, got {:?}", other),
        }

        assert!(registry.create(None).await.is_err());
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_unrenderable_create_never_reaches_store() {
        let store = Arc::new(CountingStore::default());
        let registry = registry_with(store.clone());

        let result = registry
            .create(Some(create_request("welcome", "1", "<p>{{name</p>", "Hi")))
            .await;
        assert!(matches!(result, Err(TemplateError::InvalidTemplate { .. })));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_get_delete_lifecycle() {
        let registry = registry_with(Arc::new(MemoryTemplateStore::default()));

        let created = registry
            .create(Some(create_request("welcome", "1", "<p>Hi</p>", "Hi")))
            .await
            .unwrap();
        assert_eq!(created.key(), TemplateKey::new("welcome", "1"));

        assert!(matches!(
            registry
                .create(Some(create_request("welcome", "1", "<p>Hi</p>", "Hi")))
                .await,
            Err(TemplateError::Duplicate(_))
        ));

        let content = registry.get("welcome", "1").await.unwrap();
        assert_eq!(content.text_content, "Hi");

        let deleted = registry.delete("welcome", "1").await.unwrap();
        assert_eq!(deleted.version, "1");

        assert!(matches!(
            registry.get("welcome", "1").await,
            Err(TemplateError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_reflects_creates_and_deletes() {
        let registry = registry_with(Arc::new(MemoryTemplateStore::default()));

        for version in ["1", "2", "3"] {
            registry
                .create(Some(create_request("welcome", version, "<p>Hi</p>", "Hi")))
                .await
                .unwrap();
        }
        registry.delete("welcome", "2").await.unwrap();

        let versions: Vec<String> = registry
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.version)
            .collect();
        assert_eq!(versions, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_update_validation_and_missing() {
        let store = Arc::new(CountingStore::default());
        let registry = registry_with(store.clone());

        assert!(matches!(
            registry
                .update("welcome", "1", Some(MessageTemplateContent::new("", "Hi")))
                .await,
            Err(TemplateError::InvalidRequest(_))
        ));
        assert_eq!(store.calls(), 0);

        assert!(matches!(
            registry
                .update("welcome", "1", Some(MessageTemplateContent::new("<p>Hi</p>", "Hi")))
                .await,
            Err(TemplateError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_content() {
        let registry = registry_with(Arc::new(MemoryTemplateStore::default()));
        registry
            .create(Some(create_request("welcome", "1", "<p>Hi</p>", "Hi")))
            .await
            .unwrap();

        let updated = registry
            .update(
                "welcome",
                "1",
                Some(MessageTemplateContent::new("<p>Hello {{name}}</p>", "Hello {{name}}")),
            )
            .await
            .unwrap();
        assert_eq!(updated.template_name, "welcome");

        let content = registry.get("welcome", "1").await.unwrap();
        assert_eq!(content.html_content, "<p>Hello {{name}}</p>");
    }

    #[tokio::test]
    async fn test_health_check_reports_store_status() {
        let registry = registry_with(Arc::new(MemoryTemplateStore::default()));
        let health = registry.health_check().await;
        assert_eq!(health.status, HealthStatus::Up);
    }

    #[tokio::test]
    async fn test_health_check_never_fails() {
        let registry = registry_with(Arc::new(BrokenStore));
        let health = registry.health_check().await;
        assert_eq!(health.status, HealthStatus::Down);
        assert!(health.detail.unwrap().contains("backing store offline"));
    }

    #[tokio::test]
    async fn test_upstream_failures_propagate() {
        let registry = registry_with(Arc::new(BrokenStore));
        assert!(matches!(registry.list().await, Err(TemplateError::Internal(_))));
        assert!(matches!(
            registry
                .create(Some(create_request("welcome", "1", "<p>Hi</p>", "Hi")))
                .await,
            Err(TemplateError::ServiceUnavailable(_))
        ));
    }
}
