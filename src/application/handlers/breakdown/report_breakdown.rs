//! ReportBreakdownHandler - opens a breakdown record.
//!
//! At most one active record exists per equipment; a second report while one
//! is active fails with the existing record's id. A successful report raises
//! a BREAKDOWN_REPORTED alert, announced before `breakdown-updated`.

use std::sync::Arc;

use crate::application::handlers::access::{require_role, REPORTERS};
use crate::application::handlers::alert::{RaiseAlertCommand, RaiseAlertHandler};
use crate::domain::alert::{Alert, AlertPriority, AlertType};
use crate::domain::breakdown::{BreakdownRecord, WorkflowError};
use crate::domain::foundation::{AuthenticatedSubject, EquipmentId};
use crate::ports::{BreakdownRepository, Gateway};

use super::{check_inserted, publish_breakdown_updated};

/// Command to report a breakdown.
#[derive(Debug, Clone)]
pub struct ReportBreakdownCommand {
    pub equipment_id: EquipmentId,
    pub reason: String,
    pub reporter: AuthenticatedSubject,
}

#[derive(Debug, Clone)]
pub struct ReportBreakdownResult {
    pub breakdown: BreakdownRecord,
    /// The alert raised for the report, if raising it succeeded.
    pub alert: Option<Alert>,
}

pub struct ReportBreakdownHandler {
    breakdowns: Arc<dyn BreakdownRepository>,
    gateway: Arc<dyn Gateway>,
    alerts: Arc<RaiseAlertHandler>,
}

impl ReportBreakdownHandler {
    pub fn new(
        breakdowns: Arc<dyn BreakdownRepository>,
        gateway: Arc<dyn Gateway>,
        alerts: Arc<RaiseAlertHandler>,
    ) -> Self {
        Self {
            breakdowns,
            gateway,
            alerts,
        }
    }

    pub async fn handle(&self, cmd: ReportBreakdownCommand) -> Result<ReportBreakdownResult, WorkflowError> {
        require_role(&cmd.reporter, REPORTERS, "report breakdown")?;

        let record = BreakdownRecord::report(
            cmd.equipment_id,
            cmd.reason,
            false,
            Some(cmd.reporter.id.clone()),
        )?;

        let outcome = self.breakdowns.insert_reported(&record).await?;
        check_inserted(outcome, &record.equipment_id)?;

        tracing::info!(
            breakdown_id = %record.id,
            equipment_id = %record.equipment_id,
            reporter = %cmd.reporter.id,
            "Breakdown reported"
        );

        let raised = self
            .alerts
            .handle(RaiseAlertCommand {
                equipment_id: record.equipment_id.clone(),
                alert_type: AlertType::BreakdownReported,
                priority: AlertPriority::High,
                message: format!("Breakdown reported: {}", record.reason),
                breakdown_id: Some(record.id),
            })
            .await;
        let alert = match raised {
            Ok(alert) => Some(alert),
            Err(e) => {
                tracing::error!(breakdown_id = %record.id, error = %e, "Failed to raise breakdown alert");
                None
            }
        };

        publish_breakdown_updated(self.gateway.as_ref(), &record).await;

        Ok(ReportBreakdownResult {
            breakdown: record,
            alert,
        })
    }
}
