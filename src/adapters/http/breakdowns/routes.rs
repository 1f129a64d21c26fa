//! HTTP routes for breakdown and reorder endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{
    get_breakdown, list_breakdowns, list_reorders, report_breakdown, resolve_breakdown,
    review_reorder, submit_reorder, BreakdownHandlers,
};

/// Routes mounted under `/api/breakdowns`.
pub fn breakdown_routes(handlers: BreakdownHandlers) -> Router {
    Router::new()
        .route("/", post(report_breakdown).get(list_breakdowns))
        .route("/:id", get(get_breakdown))
        .route("/:id/reorder", post(submit_reorder))
        .route("/:id/resolve", patch(resolve_breakdown))
        .with_state(handlers)
}

/// Routes mounted under `/api/reorder-requests`.
pub fn reorder_routes(handlers: BreakdownHandlers) -> Router {
    Router::new()
        .route("/", get(list_reorders))
        .route("/:id/review", patch(review_reorder))
        .with_state(handlers)
}
