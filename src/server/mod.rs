mod app;
mod middleware;
mod state;

pub use app::create_app;
pub use middleware::json_error_body;
pub use state::AppState;
