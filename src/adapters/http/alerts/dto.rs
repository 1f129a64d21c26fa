//! HTTP DTOs for alert endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::alert::Alert;
use crate::domain::breakdown::BreakdownRecord;

/// Query parameters for `GET /api/alerts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertListParams {
    #[serde(default)]
    pub resolved: Option<bool>,
    #[serde(default)]
    pub equipment_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveAlertRequest {
    #[serde(default)]
    pub note: Option<String>,
}

/// Answer to an equipment breakdown check.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub is_breakdown: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondResponse {
    pub alert: Alert,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<BreakdownRecord>,
}
