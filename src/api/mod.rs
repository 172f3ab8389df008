//! API layer - HTTP endpoint handlers.

mod health;
mod metrics;
mod routes;
mod template;

// Re-export all handlers for use in server/app.rs
pub use health::{health, not_found, HealthResponse};
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
pub use template::{
    create_template, delete_template, get_template, list_templates, template_health,
    update_template,
};
