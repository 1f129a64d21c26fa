//! Reorder request entity and its review.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    BreakdownId, EquipmentId, ReorderRequestId, StateMachine, Timestamp, UserId, ValidationError,
};

use super::{BreakdownRecord, ReorderStatus, WorkflowError};

/// Upper bound on units requested in one reorder.
pub const MAX_REORDER_QUANTITY: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReorderUrgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl ReorderUrgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReorderUrgency::Low => "LOW",
            ReorderUrgency::Medium => "MEDIUM",
            ReorderUrgency::High => "HIGH",
            ReorderUrgency::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "LOW" => Ok(ReorderUrgency::Low),
            "MEDIUM" => Ok(ReorderUrgency::Medium),
            "HIGH" => Ok(ReorderUrgency::High),
            "CRITICAL" => Ok(ReorderUrgency::Critical),
            other => Err(ValidationError::invalid_format(
                "urgency",
                format!("unknown urgency '{}'", other),
            )),
        }
    }
}

impl fmt::Display for ReorderUrgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reviewer verdict on a pending reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    #[serde(alias = "APPROVE")]
    Approved,
    #[serde(alias = "REJECT")]
    Rejected,
}

impl ReviewDecision {
    pub fn reorder_status(&self) -> ReorderStatus {
        match self {
            ReviewDecision::Approved => ReorderStatus::Approved,
            ReviewDecision::Rejected => ReorderStatus::Rejected,
        }
    }
}

/// What the requester asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderDetails {
    pub equipment_name: String,
    pub quantity: u32,
    #[serde(default)]
    pub urgency: ReorderUrgency,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

impl ReorderDetails {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.equipment_name.trim().is_empty() {
            return Err(ValidationError::empty_field("equipmentName"));
        }
        if self.quantity == 0 || self.quantity > MAX_REORDER_QUANTITY {
            return Err(ValidationError::out_of_range(
                "quantity",
                1,
                MAX_REORDER_QUANTITY as i64,
                self.quantity as i64,
            ));
        }
        if let Some(cost) = self.estimated_cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(ValidationError::invalid_format(
                    "estimatedCost",
                    "must be a non-negative number",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub id: ReorderRequestId,
    pub breakdown_id: BreakdownId,
    pub equipment_id: EquipmentId,
    pub equipment_name: String,
    pub quantity: u32,
    pub urgency: ReorderUrgency,
    pub reason: Option<String>,
    pub estimated_cost: Option<f64>,
    pub status: ReorderStatus,
    pub requested_by: UserId,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<Timestamp>,
    pub review_comments: Option<String>,
    pub created_at: Timestamp,
}

impl ReorderRequest {
    /// Creates a PENDING request for `breakdown`.
    pub fn submit(
        breakdown: &BreakdownRecord,
        details: ReorderDetails,
        requested_by: UserId,
        at: Timestamp,
    ) -> Result<Self, ValidationError> {
        details.validate()?;
        Ok(Self {
            id: ReorderRequestId::new(),
            breakdown_id: breakdown.id,
            equipment_id: breakdown.equipment_id.clone(),
            equipment_name: details.equipment_name.trim().to_string(),
            quantity: details.quantity,
            urgency: details.urgency,
            reason: details.reason.filter(|r| !r.trim().is_empty()),
            estimated_cost: details.estimated_cost,
            status: ReorderStatus::Pending,
            requested_by,
            reviewed_by: None,
            reviewed_at: None,
            review_comments: None,
            created_at: at,
        })
    }

    /// Produces the reviewed copy of this request.
    ///
    /// A rejection must carry a non-blank comment.
    pub fn review(
        &self,
        decision: ReviewDecision,
        reviewer: UserId,
        comment: Option<String>,
        at: Timestamp,
    ) -> Result<Self, WorkflowError> {
        let comment = comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        if decision == ReviewDecision::Rejected && comment.is_none() {
            return Err(ValidationError::empty_field("comment").into());
        }
        let status = self.status.transition_to(decision.reorder_status())?;

        let mut reviewed = self.clone();
        reviewed.status = status;
        reviewed.reviewed_by = Some(reviewer);
        reviewed.reviewed_at = Some(at);
        reviewed.review_comments = comment;
        Ok(reviewed)
    }
}
