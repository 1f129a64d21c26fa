//! Live status snapshot of a piece of equipment.
//!
//! There is exactly one live snapshot per equipment. Each report is merged
//! into the previous snapshot (absent fields keep their prior value) and the
//! result overwrites it; no history is kept here.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EquipmentId, Timestamp};

use super::{HealthScore, OperationalStatus};

/// Telemetry readings; each may be absent in a given report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub temperature: Option<f64>,
    pub vibration: Option<f64>,
    pub energy_consumption: Option<f64>,
}

/// Current status of one piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentStatusSnapshot {
    pub equipment_id: EquipmentId,
    pub status: OperationalStatus,
    pub health_score: HealthScore,
    #[serde(flatten)]
    pub telemetry: Telemetry,
    pub last_used_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// A partial status report as received from the telemetry source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    pub status: Option<OperationalStatus>,
    pub health_score: Option<HealthScore>,
    pub telemetry: Telemetry,
    pub in_use: bool,
}

impl EquipmentStatusSnapshot {
    /// Merges a report into the previous snapshot (if any) at time `at`.
    pub fn merge(
        equipment_id: EquipmentId,
        previous: Option<&EquipmentStatusSnapshot>,
        report: &StatusReport,
        at: Timestamp,
    ) -> Self {
        let base_status = previous
            .map(|p| p.status)
            .unwrap_or(OperationalStatus::Operational);
        let base_health = previous.map(|p| p.health_score).unwrap_or_default();
        let base_telemetry = previous.map(|p| p.telemetry).unwrap_or_default();
        let base_last_used = previous.and_then(|p| p.last_used_at);

        Self {
            equipment_id,
            status: report.status.unwrap_or(base_status),
            health_score: report.health_score.unwrap_or(base_health),
            telemetry: Telemetry {
                temperature: report.telemetry.temperature.or(base_telemetry.temperature),
                vibration: report.telemetry.vibration.or(base_telemetry.vibration),
                energy_consumption: report
                    .telemetry
                    .energy_consumption
                    .or(base_telemetry.energy_consumption),
            },
            last_used_at: if report.in_use { Some(at) } else { base_last_used },
            updated_at: at,
        }
    }

    /// True when this snapshot moved into `status` from something else.
    pub fn entered(&self, previous: Option<&EquipmentStatusSnapshot>, status: OperationalStatus) -> bool {
        self.status == status && previous.map_or(true, |p| p.status != status)
    }
}
