//! GetBreakdownHandler - one breakdown with its reorder history.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::breakdown::{BreakdownRecord, ReorderRequest, WorkflowError};
use crate::domain::foundation::BreakdownId;
use crate::ports::BreakdownRepository;

#[derive(Debug, Clone, Copy)]
pub struct GetBreakdownQuery {
    pub breakdown_id: BreakdownId,
}

/// A breakdown and every reorder request filed against it, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownDetails {
    #[serde(flatten)]
    pub breakdown: BreakdownRecord,
    pub reorder_requests: Vec<ReorderRequest>,
}

pub struct GetBreakdownHandler {
    breakdowns: Arc<dyn BreakdownRepository>,
}

impl GetBreakdownHandler {
    pub fn new(breakdowns: Arc<dyn BreakdownRepository>) -> Self {
        Self { breakdowns }
    }

    pub async fn handle(&self, query: GetBreakdownQuery) -> Result<BreakdownDetails, WorkflowError> {
        let breakdown = self
            .breakdowns
            .find_by_id(&query.breakdown_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Breakdown", query.breakdown_id))?;
        let reorder_requests = self.breakdowns.reorders_for(&breakdown.id).await?;

        Ok(BreakdownDetails {
            breakdown,
            reorder_requests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::breakdown::{ReviewReorderCommand, SubmitReorderCommand};
    use crate::application::handlers::test_support::{manager, policy_maker, Fixture};
    use crate::domain::breakdown::{ReorderDetails, ReorderStatus, ReorderUrgency, ReviewDecision};

    fn details() -> ReorderDetails {
        ReorderDetails {
            equipment_name: "Drive belt".to_string(),
            quantity: 1,
            urgency: ReorderUrgency::Low,
            reason: None,
            estimated_cost: None,
        }
    }

    #[tokio::test]
    async fn includes_reorder_history_in_order() {
        let fx = Fixture::new();
        let breakdown = fx.seed_breakdown().await;
        let submit = fx.submit_reorder_handler();
        let first = submit
            .handle(SubmitReorderCommand {
                breakdown_id: breakdown.id,
                details: details(),
                requester: manager(),
            })
            .await
            .unwrap()
            .request;
        fx.review_reorder_handler()
            .handle(ReviewReorderCommand {
                reorder_request_id: first.id,
                decision: ReviewDecision::Rejected,
                comment: Some("wrong part number".to_string()),
                reviewer: policy_maker(),
            })
            .await
            .unwrap();
        let second = submit
            .handle(SubmitReorderCommand {
                breakdown_id: breakdown.id,
                details: details(),
                requester: manager(),
            })
            .await
            .unwrap()
            .request;

        let found = GetBreakdownHandler::new(fx.store.clone())
            .handle(GetBreakdownQuery {
                breakdown_id: breakdown.id,
            })
            .await
            .unwrap();

        let history: Vec<_> = found.reorder_requests.iter().map(|r| (r.id, r.status)).collect();
        assert_eq!(
            history,
            vec![(first.id, ReorderStatus::Rejected), (second.id, ReorderStatus::Pending)]
        );
    }

    #[tokio::test]
    async fn details_serialize_flat() {
        let fx = Fixture::new();
        let breakdown = fx.seed_breakdown().await;
        let found = GetBreakdownHandler::new(fx.store.clone())
            .handle(GetBreakdownQuery {
                breakdown_id: breakdown.id,
            })
            .await
            .unwrap();

        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json["status"], "REPORTED");
        assert_eq!(json["reorderRequests"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let fx = Fixture::new();
        let id = BreakdownId::new();
        let err = GetBreakdownHandler::new(fx.store.clone())
            .handle(GetBreakdownQuery { breakdown_id: id })
            .await
            .unwrap_err();
        assert_eq!(err, WorkflowError::not_found("Breakdown", id));
    }
}
