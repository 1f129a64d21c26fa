//! ResolveAlertHandler - generic, idempotent alert resolution.
//!
//! Breakdown-check alerts are refused here while unresolved; they are
//! closed by the breakdown decision instead. That check runs before any
//! write so such an alert is never closed silently.

use std::sync::Arc;

use crate::application::handlers::access::{require_role, OPERATORS};
use crate::domain::alert::{Alert, AlertError, ResolveOutcome};
use crate::domain::foundation::{AlertId, AuthenticatedSubject, Timestamp};
use crate::ports::{AlertRepository, Gateway, RecipientDirectory};

use super::publish_resolved;

/// Command to resolve an alert.
#[derive(Debug, Clone)]
pub struct ResolveAlertCommand {
    pub alert_id: AlertId,
    pub resolver: AuthenticatedSubject,
    pub note: Option<String>,
}

/// Result of a resolution request.
#[derive(Debug, Clone)]
pub struct ResolveAlertResult {
    pub alert: Alert,
    /// False when the alert had already been resolved.
    pub newly_resolved: bool,
}

/// Handler for resolving alerts.
pub struct ResolveAlertHandler {
    alerts: Arc<dyn AlertRepository>,
    gateway: Arc<dyn Gateway>,
    directory: Arc<dyn RecipientDirectory>,
}

impl ResolveAlertHandler {
    pub fn new(
        alerts: Arc<dyn AlertRepository>,
        gateway: Arc<dyn Gateway>,
        directory: Arc<dyn RecipientDirectory>,
    ) -> Self {
        Self {
            alerts,
            gateway,
            directory,
        }
    }

    pub async fn handle(&self, cmd: ResolveAlertCommand) -> Result<ResolveAlertResult, AlertError> {
        require_role(&cmd.resolver, OPERATORS, "resolve alert")?;

        let current = self
            .alerts
            .find_by_id(&cmd.alert_id)
            .await?
            .ok_or(AlertError::NotFound(cmd.alert_id))?;

        if current.resolved {
            tracing::debug!(alert_id = %cmd.alert_id, "Alert already resolved");
            return Ok(ResolveAlertResult {
                alert: current,
                newly_resolved: false,
            });
        }

        if current.alert_type.requires_breakdown_decision() {
            tracing::debug!(alert_id = %cmd.alert_id, "Breakdown check needs a breakdown decision");
            return Err(AlertError::RequiresBreakdownDecision(cmd.alert_id));
        }

        let outcome = self
            .alerts
            .resolve(&cmd.alert_id, &cmd.resolver.id, cmd.note, Timestamp::now())
            .await?
            .ok_or(AlertError::NotFound(cmd.alert_id))?;

        match outcome {
            ResolveOutcome::Resolved(alert) => {
                tracing::info!(alert_id = %alert.id, resolver = %cmd.resolver.id, "Alert resolved");
                publish_resolved(self.gateway.as_ref(), self.directory.as_ref(), &alert).await;
                Ok(ResolveAlertResult {
                    alert,
                    newly_resolved: true,
                })
            }
            ResolveOutcome::AlreadyResolved(alert) => Ok(ResolveAlertResult {
                alert,
                newly_resolved: false,
            }),
        }
    }
}
