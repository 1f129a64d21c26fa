//! HTTP handlers for alert endpoints.

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
    GetAlertHandler, GetAlertQuery, ListAlertsHandler, ListAlertsQuery, ResolveAlertCommand,
    ResolveAlertHandler, RespondToBreakdownAlertCommand, RespondToBreakdownAlertHandler,
};
use crate::domain::foundation::{AlertId, EquipmentId};

use super::dto::{AlertListParams, ResolveAlertRequest, RespondRequest, RespondResponse};

#[derive(Clone)]
pub struct AlertHandlers {
    list: Arc<ListAlertsHandler>,
    get: Arc<GetAlertHandler>,
    resolve: Arc<ResolveAlertHandler>,
    respond: Arc<RespondToBreakdownAlertHandler>,
}

impl AlertHandlers {
    pub fn new(
        list: Arc<ListAlertsHandler>,
        get: Arc<GetAlertHandler>,
        resolve: Arc<ResolveAlertHandler>,
        respond: Arc<RespondToBreakdownAlertHandler>,
    ) -> Self {
        Self {
            list,
            get,
            resolve,
            respond,
        }
    }
}

fn parse_alert_id(raw: &str) -> Result<AlertId, ApiError> {
    raw.parse().map_err(|_| ApiError::invalid("alert ID", raw))
}

/// GET /api/alerts - List alerts, newest first
pub async fn list_alerts(
    State(handlers): State<AlertHandlers>,
    RequireAuth(_subject): RequireAuth,
    Query(params): Query<AlertListParams>,
) -> Response {
    let equipment_id = match params.equipment_id.map(EquipmentId::new).transpose() {
        Ok(id) => id,
        Err(e) => return ApiError::from(e).into_response(),
    };
    let query = ListAlertsQuery {
        resolved: params.resolved,
        equipment_id,
    };

    match handlers.list.handle(query).await {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /api/alerts/:id - One alert
pub async fn get_alert(
    State(handlers): State<AlertHandlers>,
    RequireAuth(_subject): RequireAuth,
    Path(alert_id): Path<String>,
) -> Response {
    let alert_id = match parse_alert_id(&alert_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match handlers.get.handle(GetAlertQuery { alert_id }).await {
        Ok(alert) => (StatusCode::OK, Json(alert)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// PATCH /api/alerts/:id/resolve - Resolve an alert (idempotent)
pub async fn resolve_alert(
    State(handlers): State<AlertHandlers>,
    RequireAuth(subject): RequireAuth,
    Path(alert_id): Path<String>,
    body: Option<Json<ResolveAlertRequest>>,
) -> Response {
    let alert_id = match parse_alert_id(&alert_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let cmd = ResolveAlertCommand {
        alert_id,
        resolver: subject,
        note: req.note,
    };

    match handlers.resolve.handle(cmd).await {
        Ok(result) => (StatusCode::OK, Json(result.alert)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST /api/alerts/:id/respond - Confirm or dismiss a breakdown check
pub async fn respond_to_alert(
    State(handlers): State<AlertHandlers>,
    RequireAuth(subject): RequireAuth,
    Path(alert_id): Path<String>,
    Json(req): Json<RespondRequest>,
) -> Response {
    let alert_id = match parse_alert_id(&alert_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    let cmd = RespondToBreakdownAlertCommand {
        alert_id,
        responder: subject,
        is_breakdown: req.is_breakdown,
        reason: req.reason,
    };

    match handlers.respond.handle(cmd).await {
        Ok(result) => (
            StatusCode::OK,
            Json(RespondResponse {
                alert: result.alert,
                breakdown: result.breakdown,
            }),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
