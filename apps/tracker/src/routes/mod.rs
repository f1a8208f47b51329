pub mod health;

use axum::{
    routing::{delete, get, patch},
    Router,
};

use crate::query::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/jobs", get(handlers::handle_list_jobs))
        .route("/api/jobs/export.csv", get(handlers::handle_export_csv))
        .route("/api/jobs/:id/status", patch(handlers::handle_set_status))
        .route("/api/jobs/:id", delete(handlers::handle_delete_job))
        .with_state(state)
}
