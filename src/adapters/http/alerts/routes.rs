//! HTTP routes for alert endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{get_alert, list_alerts, resolve_alert, respond_to_alert, AlertHandlers};

/// Routes mounted under `/api/alerts`.
pub fn alert_routes(handlers: AlertHandlers) -> Router {
    Router::new()
        .route("/", get(list_alerts))
        .route("/:id", get(get_alert))
        .route("/:id/resolve", patch(resolve_alert))
        .route("/:id/respond", post(respond_to_alert))
        .with_state(handlers)
}
