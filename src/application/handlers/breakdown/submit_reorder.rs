//! SubmitReorderHandler - asks for parts for a broken piece of equipment.
//!
//! Legal from REPORTED and REORDER_REJECTED. Creates a PENDING request and
//! moves the breakdown to REORDER_PENDING in one conditional write.

use std::sync::Arc;

use crate::application::handlers::access::{require_role, OPERATORS};
use crate::domain::breakdown::{
    BreakdownRecord, ReorderDetails, ReorderRequest, WorkflowError, WorkflowEvent,
};
use crate::domain::foundation::{AuthenticatedSubject, BreakdownId, Timestamp};
use crate::ports::{BreakdownRepository, Gateway};

use super::{check_applied, publish_effects};

#[derive(Debug, Clone)]
pub struct SubmitReorderCommand {
    pub breakdown_id: BreakdownId,
    pub details: ReorderDetails,
    pub requester: AuthenticatedSubject,
}

#[derive(Debug, Clone)]
pub struct SubmitReorderResult {
    pub breakdown: BreakdownRecord,
    pub request: ReorderRequest,
}

pub struct SubmitReorderHandler {
    breakdowns: Arc<dyn BreakdownRepository>,
    gateway: Arc<dyn Gateway>,
}

impl SubmitReorderHandler {
    pub fn new(breakdowns: Arc<dyn BreakdownRepository>, gateway: Arc<dyn Gateway>) -> Self {
        Self { breakdowns, gateway }
    }

    pub async fn handle(&self, cmd: SubmitReorderCommand) -> Result<SubmitReorderResult, WorkflowError> {
        require_role(&cmd.requester, OPERATORS, "submit reorder request")?;

        let current = self
            .breakdowns
            .find_by_id(&cmd.breakdown_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Breakdown", cmd.breakdown_id))?;

        let now = Timestamp::now();
        let (next, transition) = current
            .apply(WorkflowEvent::SubmitReorder, &cmd.requester.id, now)
            .map_err(|e| {
                tracing::debug!(breakdown_id = %current.id, from = %e.from, "Reorder submission rejected");
                WorkflowError::from(e)
            })?;
        let request = ReorderRequest::submit(&next, cmd.details, cmd.requester.id.clone(), now)?;

        let outcome = self
            .breakdowns
            .submit_reorder(&next, current.status, &request)
            .await?;
        check_applied(outcome, "Breakdown", current.id)?;

        tracing::info!(
            breakdown_id = %next.id,
            reorder_request_id = %request.id,
            from = %transition.from,
            to = %transition.next,
            "Reorder requested"
        );
        publish_effects(self.gateway.as_ref(), &transition.effects, &next, Some(&request)).await;

        Ok(SubmitReorderResult {
            breakdown: next,
            request,
        })
    }
}
