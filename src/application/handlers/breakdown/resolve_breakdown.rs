//! ResolveBreakdownHandler - marks equipment repaired.
//!
//! Legal from REPORTED and REORDER_APPROVED. RESOLVED is terminal; the
//! equipment can be reported again afterwards.

use std::sync::Arc;

use crate::application::handlers::access::{require_role, OPERATORS};
use crate::domain::breakdown::{BreakdownRecord, WorkflowError, WorkflowEvent};
use crate::domain::foundation::{AuthenticatedSubject, BreakdownId, Timestamp};
use crate::ports::{BreakdownRepository, Gateway};

use super::{check_applied, publish_effects};

#[derive(Debug, Clone)]
pub struct ResolveBreakdownCommand {
    pub breakdown_id: BreakdownId,
    pub resolver: AuthenticatedSubject,
}

pub struct ResolveBreakdownHandler {
    breakdowns: Arc<dyn BreakdownRepository>,
    gateway: Arc<dyn Gateway>,
}

impl ResolveBreakdownHandler {
    pub fn new(breakdowns: Arc<dyn BreakdownRepository>, gateway: Arc<dyn Gateway>) -> Self {
        Self { breakdowns, gateway }
    }

    pub async fn handle(&self, cmd: ResolveBreakdownCommand) -> Result<BreakdownRecord, WorkflowError> {
        require_role(&cmd.resolver, OPERATORS, "resolve breakdown")?;

        let current = self
            .breakdowns
            .find_by_id(&cmd.breakdown_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Breakdown", cmd.breakdown_id))?;

        let (next, transition) = current
            .apply(WorkflowEvent::Resolve, &cmd.resolver.id, Timestamp::now())
            .map_err(|e| {
                tracing::debug!(breakdown_id = %current.id, from = %e.from, "Resolution rejected");
                WorkflowError::from(e)
            })?;

        let outcome = self.breakdowns.update_if_status(&next, current.status).await?;
        check_applied(outcome, "Breakdown", current.id)?;

        tracing::info!(
            breakdown_id = %next.id,
            equipment_id = %next.equipment_id,
            from = %transition.from,
            resolver = %cmd.resolver.id,
            "Breakdown resolved"
        );
        publish_effects(self.gateway.as_ref(), &transition.effects, &next, None).await;

        Ok(next)
    }
}
