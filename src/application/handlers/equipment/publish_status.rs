//! PublishStatusHandler - ingests a status report and fans it out.
//!
//! The report is merged into the live snapshot, then:
//! 1. the full snapshot goes to `equipment:<id>`;
//! 2. `{equipmentId, status, timestamp}` is broadcast to everyone;
//! 3. on entering FAULTY, `overview-refresh` is broadcast;
//! 4. the threshold rules run and each derived alert is raised.
//!
//! Alert derivation never fails the publish; its errors are only logged.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::alert::{Alert, ThresholdRules};
use crate::domain::equipment::{EquipmentStatusSnapshot, OperationalStatus, StatusReport};
use crate::domain::foundation::{DomainError, EquipmentId, Timestamp, ValidationError};
use crate::ports::{EquipmentRepository, Gateway, GatewayEvent, OverviewRefresh, RoomKey, StatusUpdate};

use crate::application::handlers::alert::{RaiseAlertCommand, RaiseAlertHandler};

#[derive(Debug, Clone)]
pub struct PublishStatusCommand {
    /// Raw id as received; blank means the update is malformed.
    pub equipment_id: String,
    pub report: StatusReport,
}

#[derive(Debug, Clone)]
pub struct PublishStatusResult {
    pub snapshot: EquipmentStatusSnapshot,
    /// Alerts raised from this report.
    pub raised: Vec<Alert>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusPublishError {
    #[error("Malformed status update: {0}")]
    Malformed(#[from] ValidationError),

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl From<DomainError> for StatusPublishError {
    fn from(err: DomainError) -> Self {
        StatusPublishError::Infrastructure(err.to_string())
    }
}

pub struct PublishStatusHandler {
    equipment: Arc<dyn EquipmentRepository>,
    gateway: Arc<dyn Gateway>,
    alerts: Arc<RaiseAlertHandler>,
    rules: ThresholdRules,
}

impl PublishStatusHandler {
    pub fn new(
        equipment: Arc<dyn EquipmentRepository>,
        gateway: Arc<dyn Gateway>,
        alerts: Arc<RaiseAlertHandler>,
        rules: ThresholdRules,
    ) -> Self {
        Self {
            equipment,
            gateway,
            alerts,
            rules,
        }
    }

    pub async fn handle(&self, cmd: PublishStatusCommand) -> Result<PublishStatusResult, StatusPublishError> {
        let equipment_id = EquipmentId::new(cmd.equipment_id).map_err(|e| {
            tracing::warn!(error = %e, "Dropping malformed status update");
            StatusPublishError::Malformed(e)
        })?;

        let change = self
            .equipment
            .record_status(&equipment_id, &cmd.report, Timestamp::now())
            .await?;
        let snapshot = change.current;
        let previous = change.previous;

        self.gateway
            .publish(
                RoomKey::equipment(&equipment_id),
                GatewayEvent::EquipmentStatus(snapshot.clone()),
            )
            .await;
        self.gateway
            .publish_broadcast(GatewayEvent::EquipmentStatusUpdate(StatusUpdate {
                equipment_id: equipment_id.clone(),
                status: snapshot.status,
                timestamp: snapshot.updated_at,
            }))
            .await;

        if snapshot.entered(previous.as_ref(), OperationalStatus::Faulty) {
            tracing::info!(equipment_id = %equipment_id, "Equipment entered FAULTY");
            self.gateway
                .publish_broadcast(GatewayEvent::OverviewRefresh(OverviewRefresh {
                    equipment_id: equipment_id.clone(),
                    status: snapshot.status,
                }))
                .await;
        }

        let mut raised = Vec::new();
        for draft in self.rules.evaluate(previous.as_ref(), &snapshot) {
            let alert_type = draft.alert_type;
            match self
                .alerts
                .handle(RaiseAlertCommand::from_draft(equipment_id.clone(), draft))
                .await
            {
                Ok(alert) => raised.push(alert),
                Err(e) => tracing::error!(
                    equipment_id = %equipment_id,
                    alert_type = %alert_type,
                    error = %e,
                    "Failed to raise derived alert"
                ),
            }
        }

        Ok(PublishStatusResult { snapshot, raised })
    }
}
