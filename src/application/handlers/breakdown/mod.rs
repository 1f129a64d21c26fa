//! Breakdown workflow handlers.
//!
//! Each command reads the record, runs the pure transition, and writes the
//! result with a compare-and-swap on the status it read. A lost race comes
//! back as `WorkflowError::Conflict` carrying the status that won. Only after
//! the write succeeds are the transition's effects published.

mod get_breakdown;
mod list_breakdowns;
mod list_reorders;
mod report_breakdown;
mod resolve_breakdown;
mod respond_to_alert;
mod review_reorder;
mod submit_reorder;

pub use get_breakdown::{BreakdownDetails, GetBreakdownHandler, GetBreakdownQuery};
pub use list_breakdowns::{ListBreakdownsHandler, ListBreakdownsQuery};
pub use list_reorders::{ListReordersHandler, ListReordersQuery};
pub use report_breakdown::{ReportBreakdownCommand, ReportBreakdownHandler, ReportBreakdownResult};
pub use resolve_breakdown::{ResolveBreakdownCommand, ResolveBreakdownHandler};
pub use respond_to_alert::{
    RespondToBreakdownAlertCommand, RespondToBreakdownAlertHandler, RespondToBreakdownAlertResult,
};
pub use review_reorder::{ReviewReorderCommand, ReviewReorderHandler, ReviewReorderResult};
pub use submit_reorder::{SubmitReorderCommand, SubmitReorderHandler, SubmitReorderResult};

use std::fmt;

use crate::domain::breakdown::{
    BreakdownRecord, BreakdownStatus, ReorderRequest, WorkflowEffect, WorkflowError,
};
use crate::domain::foundation::Role;
use crate::domain::foundation::EquipmentId;
use crate::ports::{CasOutcome, Gateway, GatewayEvent, InsertOutcome, RoomKey};

/// Rooms that follow breakdown state.
pub fn breakdown_rooms() -> Vec<RoomKey> {
    vec![RoomKey::Role(Role::LabManager), RoomKey::Role(Role::PolicyMaker)]
}

pub(crate) async fn publish_breakdown_updated(gateway: &dyn Gateway, record: &BreakdownRecord) {
    gateway
        .publish_to_rooms(breakdown_rooms(), GatewayEvent::BreakdownUpdated(record.clone()))
        .await;
}

/// Publishes the announcements a committed transition calls for.
pub(crate) async fn publish_effects(
    gateway: &dyn Gateway,
    effects: &[WorkflowEffect],
    record: &BreakdownRecord,
    request: Option<&ReorderRequest>,
) {
    for effect in effects {
        match (effect, request) {
            (WorkflowEffect::PublishBreakdownUpdated, _) => {
                publish_breakdown_updated(gateway, record).await;
            }
            (WorkflowEffect::NotifyReorderRequested, Some(request)) => {
                gateway
                    .publish(
                        RoomKey::Role(Role::PolicyMaker),
                        GatewayEvent::ReorderRequested(request.clone()),
                    )
                    .await;
            }
            (WorkflowEffect::NotifyReorderReviewed, Some(request)) => {
                gateway
                    .publish(
                        RoomKey::user(&request.requested_by),
                        GatewayEvent::ReorderReviewed(request.clone()),
                    )
                    .await;
            }
            // Storage effects are carried out by the compare-and-swap write.
            _ => {}
        }
    }
}

/// Maps a failed compare-and-swap to the caller-facing error.
pub(crate) fn check_applied<S: fmt::Display>(
    outcome: CasOutcome<S>,
    entity: &'static str,
    id: impl fmt::Display,
) -> Result<(), WorkflowError> {
    match outcome {
        CasOutcome::Applied => Ok(()),
        CasOutcome::Stale { current } => {
            tracing::debug!(entity, id = %id, current = %current, "Transition lost a race");
            Err(WorkflowError::conflict(current))
        }
        CasOutcome::Missing => Err(WorkflowError::not_found(entity, id)),
    }
}

/// Maps a refused breakdown insert to the caller-facing error.
pub(crate) fn check_inserted(outcome: InsertOutcome, equipment_id: &EquipmentId) -> Result<(), WorkflowError> {
    match outcome {
        InsertOutcome::Inserted => Ok(()),
        InsertOutcome::DuplicateActive(existing) => {
            tracing::debug!(
                equipment_id = %equipment_id,
                existing = %existing,
                "Report rejected, breakdown already active"
            );
            Err(WorkflowError::DuplicateActiveBreakdown { existing })
        }
        InsertOutcome::Raced => {
            tracing::debug!(equipment_id = %equipment_id, "Report raced a resolution");
            Err(WorkflowError::conflict(BreakdownStatus::Resolved))
        }
    }
}
