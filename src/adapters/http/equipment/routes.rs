//! HTTP routes for status ingest.

use axum::{routing::post, Router};

use super::handlers::{publish_status, EquipmentHandlers};

/// Routes mounted under `/api/equipment`.
pub fn equipment_routes(handlers: EquipmentHandlers) -> Router {
    Router::new()
        .route("/:id/status", post(publish_status))
        .with_state(handlers)
}
