//! ReviewReorderHandler - a policy maker's verdict on a reorder request.
//!
//! Approval moves the breakdown to REORDER_APPROVED, rejection (comment
//! required) to REORDER_REJECTED. The request and the breakdown change
//! together or not at all.

use std::sync::Arc;

use crate::application::handlers::access::{require_role, REVIEWERS};
use crate::domain::breakdown::{
    BreakdownRecord, ReorderRequest, ReviewDecision, WorkflowError, WorkflowEvent,
};
use crate::domain::foundation::{AuthenticatedSubject, ReorderRequestId, Timestamp};
use crate::ports::{BreakdownRepository, Gateway};

use super::{check_applied, publish_effects};

#[derive(Debug, Clone)]
pub struct ReviewReorderCommand {
    pub reorder_request_id: ReorderRequestId,
    pub decision: ReviewDecision,
    pub comment: Option<String>,
    pub reviewer: AuthenticatedSubject,
}

#[derive(Debug, Clone)]
pub struct ReviewReorderResult {
    pub request: ReorderRequest,
    pub breakdown: BreakdownRecord,
}

pub struct ReviewReorderHandler {
    breakdowns: Arc<dyn BreakdownRepository>,
    gateway: Arc<dyn Gateway>,
}

impl ReviewReorderHandler {
    pub fn new(breakdowns: Arc<dyn BreakdownRepository>, gateway: Arc<dyn Gateway>) -> Self {
        Self { breakdowns, gateway }
    }

    pub async fn handle(&self, cmd: ReviewReorderCommand) -> Result<ReviewReorderResult, WorkflowError> {
        require_role(&cmd.reviewer, REVIEWERS, "review reorder request")?;

        let request = self
            .breakdowns
            .find_reorder(&cmd.reorder_request_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Reorder request", cmd.reorder_request_id))?;

        let now = Timestamp::now();
        let reviewed = request
            .review(cmd.decision, cmd.reviewer.id.clone(), cmd.comment, now)
            .map_err(|e| {
                tracing::debug!(reorder_request_id = %request.id, error = %e, "Review rejected");
                e
            })?;

        let breakdown = self
            .breakdowns
            .find_by_id(&request.breakdown_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Breakdown", request.breakdown_id))?;
        let (next, transition) = breakdown.apply(WorkflowEvent::Review(cmd.decision), &cmd.reviewer.id, now)?;

        let outcome = self.breakdowns.review_reorder(&reviewed, &next).await?;
        check_applied(outcome, "Reorder request", request.id)?;

        tracing::info!(
            reorder_request_id = %reviewed.id,
            breakdown_id = %next.id,
            decision = %reviewed.status,
            reviewer = %cmd.reviewer.id,
            "Reorder request reviewed"
        );
        publish_effects(self.gateway.as_ref(), &transition.effects, &next, Some(&reviewed)).await;

        Ok(ReviewReorderResult {
            request: reviewed,
            breakdown: next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::Target;
    use crate::application::handlers::breakdown::SubmitReorderCommand;
    use crate::application::handlers::test_support::{manager, policy_maker, Fixture};
    use crate::domain::breakdown::{BreakdownStatus, ReorderDetails, ReorderStatus, ReorderUrgency};
    use crate::domain::foundation::ValidationError;
    use crate::ports::RoomKey;

    async fn pending(fx: &Fixture) -> ReorderRequest {
        let breakdown = fx.seed_breakdown().await;
        fx.submit_reorder_handler()
            .handle(SubmitReorderCommand {
                breakdown_id: breakdown.id,
                details: ReorderDetails {
                    equipment_name: "Spindle bearing".to_string(),
                    quantity: 1,
                    urgency: ReorderUrgency::Medium,
                    reason: None,
                    estimated_cost: None,
                },
                requester: manager(),
            })
            .await
            .unwrap()
            .request
    }

    fn review(request: &ReorderRequest, decision: ReviewDecision, comment: Option<&str>) -> ReviewReorderCommand {
        ReviewReorderCommand {
            reorder_request_id: request.id,
            decision,
            comment: comment.map(String::from),
            reviewer: policy_maker(),
        }
    }

    #[tokio::test]
    async fn approval_moves_both_records() {
        let fx = Fixture::new();
        let request = pending(&fx).await;

        let result = fx
            .review_reorder_handler()
            .handle(review(&request, ReviewDecision::Approved, None))
            .await
            .unwrap();

        assert_eq!(result.request.status, ReorderStatus::Approved);
        assert_eq!(result.request.reviewed_by, Some(policy_maker().id));
        assert_eq!(result.breakdown.status, BreakdownStatus::ReorderApproved);
    }

    #[tokio::test]
    async fn rejection_without_comment_is_validation_error() {
        let fx = Fixture::new();
        let request = pending(&fx).await;

        let err = fx
            .review_reorder_handler()
            .handle(review(&request, ReviewDecision::Rejected, Some("")))
            .await
            .unwrap_err();

        assert_eq!(err, WorkflowError::Validation(ValidationError::empty_field("comment")));
        let stored = fx.store.find_reorder(&request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReorderStatus::Pending);
    }

    #[tokio::test]
    async fn rejection_with_comment_moves_breakdown_to_rejected() {
        let fx = Fixture::new();
        let request = pending(&fx).await;

        let result = fx
            .review_reorder_handler()
            .handle(review(&request, ReviewDecision::Rejected, Some("missing part")))
            .await
            .unwrap();

        assert_eq!(result.breakdown.status, BreakdownStatus::ReorderRejected);
        assert_eq!(result.request.review_comments.as_deref(), Some("missing part"));
    }

    #[tokio::test]
    async fn review_is_announced_to_requester() {
        let fx = Fixture::new();
        let request = pending(&fx).await;
        fx.gateway.clear();

        fx.review_reorder_handler()
            .handle(review(&request, ReviewDecision::Approved, None))
            .await
            .unwrap();

        let reviewed = fx.gateway.named("reorder-reviewed");
        assert_eq!(reviewed.len(), 1);
        assert_eq!(reviewed[0].target, Target::Room(RoomKey::User(manager().id)));
        assert_eq!(fx.gateway.named("breakdown-updated").len(), 1);
    }

    #[tokio::test]
    async fn second_review_is_invalid_transition() {
        let fx = Fixture::new();
        let request = pending(&fx).await;
        let handler = fx.review_reorder_handler();
        handler
            .handle(review(&request, ReviewDecision::Approved, None))
            .await
            .unwrap();

        let err = handler
            .handle(review(&request, ReviewDecision::Rejected, Some("changed my mind")))
            .await
            .unwrap_err();
        assert_eq!(err, WorkflowError::invalid_transition("APPROVED", "REJECTED"));
    }

    #[tokio::test]
    async fn concurrent_reviews_have_one_winner() {
        let fx = Fixture::new();
        let request = pending(&fx).await;
        let first = fx.review_reorder_handler();
        let second = fx.review_reorder_handler();

        let (a, b) = tokio::join!(
            first.handle(review(&request, ReviewDecision::Approved, None)),
            second.handle(review(&request, ReviewDecision::Rejected, Some("over budget"))),
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
        assert!(matches!(
            loser,
            WorkflowError::Conflict { .. } | WorkflowError::InvalidTransition { .. }
        ));
    }

    #[tokio::test]
    async fn lab_manager_cannot_review() {
        let fx = Fixture::new();
        let request = pending(&fx).await;
        let err = fx
            .review_reorder_handler()
            .handle(ReviewReorderCommand {
                reviewer: manager(),
                ..review(&request, ReviewDecision::Approved, None)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }
}
