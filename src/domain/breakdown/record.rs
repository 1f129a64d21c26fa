//! Breakdown record aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    BreakdownId, EquipmentId, IllegalTransition, Timestamp, UserId, ValidationError,
};

use super::machine::{transition, Transition, WorkflowEvent};
use super::BreakdownStatus;

/// Tracks one piece of equipment from "reported broken" to "repaired".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRecord {
    pub id: BreakdownId,
    pub equipment_id: EquipmentId,
    pub reason: String,
    pub is_auto_detected: bool,
    pub status: BreakdownStatus,
    pub reported_by: Option<UserId>,
    pub resolved_by: Option<UserId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

impl BreakdownRecord {
    /// Opens a new record in REPORTED.
    pub fn report(
        equipment_id: EquipmentId,
        reason: impl Into<String>,
        is_auto_detected: bool,
        reported_by: Option<UserId>,
    ) -> Result<Self, ValidationError> {
        let reason = reason.into().trim().to_string();
        if reason.is_empty() {
            return Err(ValidationError::empty_field("reason"));
        }
        let now = Timestamp::now();
        Ok(Self {
            id: BreakdownId::new(),
            equipment_id,
            reason,
            is_auto_detected,
            status: BreakdownStatus::Reported,
            reported_by,
            resolved_by: None,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Applies `event` to a copy of this record.
    ///
    /// The returned record is what the store should hold if its current
    /// status still equals `self.status`.
    pub fn apply(
        &self,
        event: WorkflowEvent,
        actor: &UserId,
        at: Timestamp,
    ) -> Result<(BreakdownRecord, Transition), IllegalTransition<BreakdownStatus>> {
        let t = transition(self.status, event)?;
        let mut next = self.clone();
        next.status = t.next;
        next.updated_at = at;
        if t.next == BreakdownStatus::Resolved {
            next.resolved_by = Some(actor.clone());
            next.resolved_at = Some(at);
        }
        Ok((next, t))
    }
}
