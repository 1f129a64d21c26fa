//! Pure transition function for the breakdown workflow.
//!
//! `transition(state, event)` decides the next status and the side effects
//! the caller must carry out. It touches no store and no network; handlers
//! apply the result with a compare-and-swap against the store.

use crate::domain::foundation::{IllegalTransition, StateMachine};

use super::{BreakdownStatus, ReorderStatus, ReviewDecision};

/// Something that happens to a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEvent {
    SubmitReorder,
    Review(ReviewDecision),
    Resolve,
}

impl WorkflowEvent {
    /// The status this event moves a breakdown into.
    pub fn target(&self) -> BreakdownStatus {
        match self {
            WorkflowEvent::SubmitReorder => BreakdownStatus::ReorderPending,
            WorkflowEvent::Review(ReviewDecision::Approved) => BreakdownStatus::ReorderApproved,
            WorkflowEvent::Review(ReviewDecision::Rejected) => BreakdownStatus::ReorderRejected,
            WorkflowEvent::Resolve => BreakdownStatus::Resolved,
        }
    }
}

/// Work the caller performs after a successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEffect {
    /// Persist a new PENDING reorder request with the breakdown update.
    CreateReorderRequest,
    /// Close the pending reorder request with this status.
    CloseReorderRequest(ReorderStatus),
    /// Publish `breakdown-updated` to manager and policy-maker rooms.
    PublishBreakdownUpdated,
    /// Publish `reorder-requested` to policy makers.
    NotifyReorderRequested,
    /// Publish `reorder-reviewed` to the requester.
    NotifyReorderReviewed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: BreakdownStatus,
    pub next: BreakdownStatus,
    pub effects: Vec<WorkflowEffect>,
}

/// Computes the outcome of applying `event` to a breakdown in `state`.
pub fn transition(
    state: BreakdownStatus,
    event: WorkflowEvent,
) -> Result<Transition, IllegalTransition<BreakdownStatus>> {
    let next = state.transition_to(event.target())?;

    let effects = match event {
        WorkflowEvent::SubmitReorder => vec![
            WorkflowEffect::CreateReorderRequest,
            WorkflowEffect::PublishBreakdownUpdated,
            WorkflowEffect::NotifyReorderRequested,
        ],
        WorkflowEvent::Review(decision) => vec![
            WorkflowEffect::CloseReorderRequest(decision.reorder_status()),
            WorkflowEffect::PublishBreakdownUpdated,
            WorkflowEffect::NotifyReorderReviewed,
        ],
        WorkflowEvent::Resolve => vec![WorkflowEffect::PublishBreakdownUpdated],
    };

    Ok(Transition {
        from: state,
        next,
        effects,
    })
}
