//! HTTP handlers for status ingest.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::{PublishStatusCommand, PublishStatusHandler, StatusPublishError};
use crate::domain::equipment::StatusReport;

use super::dto::{PublishStatusResponse, StatusReportRequest};

#[derive(Clone)]
pub struct EquipmentHandlers {
    publish_status: Arc<PublishStatusHandler>,
}

impl EquipmentHandlers {
    pub fn new(publish_status: Arc<PublishStatusHandler>) -> Self {
        Self { publish_status }
    }
}

/// POST /api/equipment/:id/status - Ingest a status report
pub async fn publish_status(
    State(handlers): State<EquipmentHandlers>,
    RequireAuth(subject): RequireAuth,
    Path(equipment_id): Path<String>,
    Json(req): Json<StatusReportRequest>,
) -> Response {
    let report = match StatusReport::try_from(req) {
        Ok(report) => report,
        Err(e) => return ApiError::from(StatusPublishError::Malformed(e)).into_response(),
    };

    tracing::debug!(equipment_id = %equipment_id, publisher = %subject.id, "Status report received");
    let cmd = PublishStatusCommand { equipment_id, report };

    match handlers.publish_status.handle(cmd).await {
        Ok(result) => (
            StatusCode::OK,
            Json(PublishStatusResponse {
                snapshot: result.snapshot,
                raised_alerts: result.raised,
            }),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
