use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::health::health;
use super::metrics::prometheus_metrics;
use super::template::{
    create_template, delete_template, get_template, list_templates, template_health,
    update_template,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // Template registry
        .route("/template/list", get(list_templates))
        .route("/template/healthCheck", get(template_health))
        .route("/template/", post(create_template))
        .route("/template", post(create_template))
        .route(
            "/template/{template_name}/{template_version}",
            get(get_template)
                .put(update_template)
                .delete(delete_template),
        )
}
