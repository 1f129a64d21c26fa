//! Breakdown and reorder request status state machines.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle of a breakdown record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakdownStatus {
    /// Equipment reported broken, no parts ordered yet.
    Reported,

    /// A reorder request awaits review.
    ReorderPending,

    /// Parts approved. May stay here indefinitely until repair is confirmed.
    ReorderApproved,

    /// Latest reorder request was denied; a new one may be submitted.
    ReorderRejected,

    /// Repaired. Terminal; a new report opens a new record.
    Resolved,
}

impl BreakdownStatus {
    pub const ALL: [BreakdownStatus; 5] = [
        BreakdownStatus::Reported,
        BreakdownStatus::ReorderPending,
        BreakdownStatus::ReorderApproved,
        BreakdownStatus::ReorderRejected,
        BreakdownStatus::Resolved,
    ];

    /// Every status except RESOLVED counts as active.
    pub fn is_active(&self) -> bool {
        !matches!(self, BreakdownStatus::Resolved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BreakdownStatus::Reported => "REPORTED",
            BreakdownStatus::ReorderPending => "REORDER_PENDING",
            BreakdownStatus::ReorderApproved => "REORDER_APPROVED",
            BreakdownStatus::ReorderRejected => "REORDER_REJECTED",
            BreakdownStatus::Resolved => "RESOLVED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid_format("status", format!("unknown breakdown status '{}'", s))
            })
    }
}

impl fmt::Display for BreakdownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for BreakdownStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use BreakdownStatus::*;
        matches!(
            (self, target),
            (Reported, ReorderPending)
                | (Reported, Resolved)
                | (ReorderPending, ReorderApproved)
                | (ReorderPending, ReorderRejected)
                | (ReorderRejected, ReorderPending)
                | (ReorderApproved, Resolved)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use BreakdownStatus::*;
        match self {
            Reported => vec![ReorderPending, Resolved],
            ReorderPending => vec![ReorderApproved, ReorderRejected],
            ReorderApproved => vec![Resolved],
            ReorderRejected => vec![ReorderPending],
            Resolved => vec![],
        }
    }
}

/// Review state of a single reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReorderStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReorderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReorderStatus::Pending => "PENDING",
            ReorderStatus::Approved => "APPROVED",
            ReorderStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "PENDING" => Ok(ReorderStatus::Pending),
            "APPROVED" => Ok(ReorderStatus::Approved),
            "REJECTED" => Ok(ReorderStatus::Rejected),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown reorder status '{}'", other),
            )),
        }
    }
}

impl fmt::Display for ReorderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for ReorderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (ReorderStatus::Pending, ReorderStatus::Approved)
                | (ReorderStatus::Pending, ReorderStatus::Rejected)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            ReorderStatus::Pending => vec![ReorderStatus::Approved, ReorderStatus::Rejected],
            ReorderStatus::Approved | ReorderStatus::Rejected => vec![],
        }
    }
}
