//! HTTP DTOs for breakdown and reorder endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::alert::Alert;
use crate::domain::breakdown::{BreakdownRecord, ReorderRequest, ReorderStatus, ReviewDecision};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBreakdownRequest {
    pub equipment_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBreakdownResponse {
    pub breakdown: BreakdownRecord,
    /// The BREAKDOWN_REPORTED alert, when it could be raised.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownListParams {
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReorderListParams {
    #[serde(default)]
    pub status: Option<ReorderStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Both records touched by a reorder submission or review.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse {
    pub breakdown: BreakdownRecord,
    pub reorder_request: ReorderRequest,
}
