//! RespondToBreakdownAlertHandler - the decision on a breakdown check.
//!
//! Confirming opens an auto-detected breakdown for the alert's equipment, or
//! attaches the alert to the breakdown already active for it, and closes the
//! alert in the same store write. Dismissing closes the alert as a false
//! alarm and opens nothing. Of a racing confirm and dismiss exactly one
//! applies; the other gets `Conflict { current: RESOLVED }`.

use std::sync::Arc;

use crate::application::handlers::access::{require_role, OPERATORS};
use crate::application::handlers::alert::publish_resolved;
use crate::domain::alert::{Alert, AlertType, ResolveOutcome};
use crate::domain::breakdown::{BreakdownRecord, BreakdownStatus, WorkflowError};
use crate::domain::foundation::{AlertId, AuthenticatedSubject, Timestamp, ValidationError};
use crate::ports::{
    AlertRepository, BreakdownRepository, ConfirmOutcome, Gateway, RecipientDirectory,
};

use super::publish_breakdown_updated;

#[derive(Debug, Clone)]
pub struct RespondToBreakdownAlertCommand {
    pub alert_id: AlertId,
    pub responder: AuthenticatedSubject,
    pub is_breakdown: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RespondToBreakdownAlertResult {
    pub alert: Alert,
    /// Present when the response confirmed a breakdown.
    pub breakdown: Option<BreakdownRecord>,
}

pub struct RespondToBreakdownAlertHandler {
    alerts: Arc<dyn AlertRepository>,
    breakdowns: Arc<dyn BreakdownRepository>,
    gateway: Arc<dyn Gateway>,
    directory: Arc<dyn RecipientDirectory>,
}

impl RespondToBreakdownAlertHandler {
    pub fn new(
        alerts: Arc<dyn AlertRepository>,
        breakdowns: Arc<dyn BreakdownRepository>,
        gateway: Arc<dyn Gateway>,
        directory: Arc<dyn RecipientDirectory>,
    ) -> Self {
        Self {
            alerts,
            breakdowns,
            gateway,
            directory,
        }
    }

    pub async fn handle(
        &self,
        cmd: RespondToBreakdownAlertCommand,
    ) -> Result<RespondToBreakdownAlertResult, WorkflowError> {
        require_role(&cmd.responder, OPERATORS, "respond to breakdown alert")?;

        let alert = self
            .alerts
            .find_by_id(&cmd.alert_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Alert", cmd.alert_id))?;

        if alert.alert_type != AlertType::EquipmentBreakdownCheck {
            return Err(ValidationError::invalid_format(
                "alertId",
                format!("alert {} is {}, not a breakdown check", alert.id, alert.alert_type),
            )
            .into());
        }
        if alert.resolved {
            return Err(already_answered(&alert));
        }

        let reason = cmd
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        if cmd.is_breakdown {
            self.confirm(alert, reason, &cmd.responder).await
        } else {
            self.dismiss(alert, reason, &cmd.responder).await
        }
    }

    async fn confirm(
        &self,
        alert: Alert,
        reason: Option<String>,
        responder: &AuthenticatedSubject,
    ) -> Result<RespondToBreakdownAlertResult, WorkflowError> {
        let candidate = BreakdownRecord::report(
            alert.equipment_id.clone(),
            reason.unwrap_or_else(|| alert.message.clone()),
            true,
            Some(responder.id.clone()),
        )?;

        let outcome = self
            .breakdowns
            .confirm_check(&candidate, &alert.id, &responder.id, Timestamp::now())
            .await?;

        let (alert, breakdown) = match outcome {
            ConfirmOutcome::Opened { breakdown, alert } => {
                tracing::info!(
                    breakdown_id = %breakdown.id,
                    alert_id = %alert.id,
                    equipment_id = %breakdown.equipment_id,
                    "Breakdown confirmed from alert"
                );
                publish_breakdown_updated(self.gateway.as_ref(), &breakdown).await;
                (alert, breakdown)
            }
            ConfirmOutcome::Attached { breakdown, alert } => {
                tracing::info!(
                    breakdown_id = %breakdown.id,
                    alert_id = %alert.id,
                    "Breakdown check attached to active breakdown"
                );
                (alert, breakdown)
            }
            ConfirmOutcome::AlreadyAnswered(stored) => return Err(already_answered(&stored)),
            ConfirmOutcome::Raced => {
                tracing::debug!(alert_id = %alert.id, "Confirmation raced a breakdown resolution");
                return Err(WorkflowError::conflict(BreakdownStatus::Resolved));
            }
            ConfirmOutcome::Missing => return Err(WorkflowError::not_found("Alert", alert.id)),
        };

        publish_resolved(self.gateway.as_ref(), self.directory.as_ref(), &alert).await;
        Ok(RespondToBreakdownAlertResult {
            alert,
            breakdown: Some(breakdown),
        })
    }

    async fn dismiss(
        &self,
        alert: Alert,
        reason: Option<String>,
        responder: &AuthenticatedSubject,
    ) -> Result<RespondToBreakdownAlertResult, WorkflowError> {
        let note = match reason {
            Some(reason) => format!("False alarm: {}", reason),
            None => "False alarm".to_string(),
        };

        let outcome = self
            .alerts
            .resolve(&alert.id, &responder.id, Some(note), Timestamp::now())
            .await?
            .ok_or_else(|| WorkflowError::not_found("Alert", alert.id))?;

        match outcome {
            ResolveOutcome::Resolved(alert) => {
                tracing::info!(alert_id = %alert.id, responder = %responder.id, "Breakdown check dismissed");
                publish_resolved(self.gateway.as_ref(), self.directory.as_ref(), &alert).await;
                Ok(RespondToBreakdownAlertResult { alert, breakdown: None })
            }
            ResolveOutcome::AlreadyResolved(stored) => Err(already_answered(&stored)),
        }
    }
}

fn already_answered(alert: &Alert) -> WorkflowError {
    tracing::debug!(alert_id = %alert.id, "Breakdown check already answered");
    WorkflowError::conflict("RESOLVED")
}
