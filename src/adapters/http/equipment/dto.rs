//! HTTP DTOs for status ingest.

use serde::{Deserialize, Serialize};

use crate::domain::alert::Alert;
use crate::domain::equipment::{EquipmentStatusSnapshot, HealthScore, OperationalStatus, StatusReport, Telemetry};
use crate::domain::foundation::ValidationError;

/// A partial status report. Absent fields keep their last known value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReportRequest {
    #[serde(default)]
    pub status: Option<OperationalStatus>,
    #[serde(default)]
    pub health_score: Option<i64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub vibration: Option<f64>,
    #[serde(default)]
    pub energy_consumption: Option<f64>,
    #[serde(default)]
    pub in_use: bool,
}

impl TryFrom<StatusReportRequest> for StatusReport {
    type Error = ValidationError;

    fn try_from(req: StatusReportRequest) -> Result<Self, Self::Error> {
        Ok(StatusReport {
            status: req.status,
            health_score: req.health_score.map(HealthScore::new).transpose()?,
            telemetry: Telemetry {
                temperature: req.temperature,
                vibration: req.vibration,
                energy_consumption: req.energy_consumption,
            },
            in_use: req.in_use,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishStatusResponse {
    pub snapshot: EquipmentStatusSnapshot,
    pub raised_alerts: Vec<Alert>,
}
