//! HTTP handlers for breakdown and reorder endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::{
    GetBreakdownHandler, GetBreakdownQuery, ListBreakdownsHandler, ListBreakdownsQuery,
    ListReordersHandler, ListReordersQuery, ReportBreakdownCommand, ReportBreakdownHandler,
    ResolveBreakdownCommand, ResolveBreakdownHandler, ReviewReorderCommand, ReviewReorderHandler,
    SubmitReorderCommand, SubmitReorderHandler,
};
use crate::domain::breakdown::ReorderDetails;
use crate::domain::foundation::{BreakdownId, EquipmentId, ReorderRequestId};

use super::dto::{
    BreakdownListParams, ReorderListParams, ReportBreakdownRequest, ReportBreakdownResponse,
    ReviewRequest, WorkflowResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct BreakdownHandlers {
    pub report: Arc<ReportBreakdownHandler>,
    pub submit_reorder: Arc<SubmitReorderHandler>,
    pub review_reorder: Arc<ReviewReorderHandler>,
    pub resolve: Arc<ResolveBreakdownHandler>,
    pub get: Arc<GetBreakdownHandler>,
    pub list: Arc<ListBreakdownsHandler>,
    pub list_reorders: Arc<ListReordersHandler>,
}

fn parse_breakdown_id(raw: &str) -> Result<BreakdownId, ApiError> {
    raw.parse().map_err(|_| ApiError::invalid("breakdown ID", raw))
}

// ════════════════════════════════════════════════════════════════════════════
// Breakdowns
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/breakdowns - Report a breakdown
pub async fn report_breakdown(
    State(handlers): State<BreakdownHandlers>,
    RequireAuth(subject): RequireAuth,
    Json(req): Json<ReportBreakdownRequest>,
) -> Response {
    let equipment_id = match EquipmentId::new(req.equipment_id) {
        Ok(id) => id,
        Err(e) => return ApiError::from(e).into_response(),
    };
    let cmd = ReportBreakdownCommand {
        equipment_id,
        reason: req.reason,
        reporter: subject,
    };

    match handlers.report.handle(cmd).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(ReportBreakdownResponse {
                breakdown: result.breakdown,
                alert: result.alert,
            }),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /api/breakdowns - List breakdowns, newest first
pub async fn list_breakdowns(
    State(handlers): State<BreakdownHandlers>,
    RequireAuth(_subject): RequireAuth,
    Query(params): Query<BreakdownListParams>,
) -> Response {
    let query = ListBreakdownsQuery {
        active_only: params.active_only,
    };
    match handlers.list.handle(query).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /api/breakdowns/:id - Breakdown with its reorder requests
pub async fn get_breakdown(
    State(handlers): State<BreakdownHandlers>,
    RequireAuth(_subject): RequireAuth,
    Path(breakdown_id): Path<String>,
) -> Response {
    let breakdown_id = match parse_breakdown_id(&breakdown_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    match handlers.get.handle(GetBreakdownQuery { breakdown_id }).await {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST /api/breakdowns/:id/reorder - Submit a reorder request
pub async fn submit_reorder(
    State(handlers): State<BreakdownHandlers>,
    RequireAuth(subject): RequireAuth,
    Path(breakdown_id): Path<String>,
    Json(details): Json<ReorderDetails>,
) -> Response {
    let breakdown_id = match parse_breakdown_id(&breakdown_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let cmd = SubmitReorderCommand {
        breakdown_id,
        details,
        requester: subject,
    };

    match handlers.submit_reorder.handle(cmd).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(WorkflowResponse {
                breakdown: result.breakdown,
                reorder_request: result.request,
            }),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// PATCH /api/breakdowns/:id/resolve - Mark equipment repaired
pub async fn resolve_breakdown(
    State(handlers): State<BreakdownHandlers>,
    RequireAuth(subject): RequireAuth,
    Path(breakdown_id): Path<String>,
) -> Response {
    let breakdown_id = match parse_breakdown_id(&breakdown_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let cmd = ResolveBreakdownCommand {
        breakdown_id,
        resolver: subject,
    };

    match handlers.resolve.handle(cmd).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Reorder requests
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/reorder-requests - List reorder requests, newest first
pub async fn list_reorders(
    State(handlers): State<BreakdownHandlers>,
    RequireAuth(_subject): RequireAuth,
    Query(params): Query<ReorderListParams>,
) -> Response {
    let query = ListReordersQuery { status: params.status };
    match handlers.list_reorders.handle(query).await {
        Ok(requests) => (StatusCode::OK, Json(requests)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// PATCH /api/reorder-requests/:id/review - Approve or reject
pub async fn review_reorder(
    State(handlers): State<BreakdownHandlers>,
    RequireAuth(subject): RequireAuth,
    Path(request_id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> Response {
    let reorder_request_id = match request_id.parse::<ReorderRequestId>() {
        Ok(id) => id,
        Err(_) => return ApiError::invalid("reorder request ID", &request_id).into_response(),
    };
    let cmd = ReviewReorderCommand {
        reorder_request_id,
        decision: req.decision,
        comment: req.comment,
        reviewer: subject,
    };

    match handlers.review_reorder.handle(cmd).await {
        Ok(result) => (
            StatusCode::OK,
            Json(WorkflowResponse {
                breakdown: result.breakdown,
                reorder_request: result.request,
            }),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
