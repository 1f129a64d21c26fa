//! Workflow error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | Forbidden | 403 |
//! | NotFound | 404 |
//! | InvalidTransition | 409 |
//! | DuplicateActiveBreakdown | 409 |
//! | Conflict | 409 |
//! | Infrastructure | 500 |

use std::fmt;
use thiserror::Error;

use crate::domain::alert::AlertError;
use crate::domain::foundation::{
    BreakdownId, DomainError, ErrorCode, IllegalTransition, StateMachine, ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record is not in a state that permits the operation.
    #[error("Cannot move from {current} to {attempted}")]
    InvalidTransition { current: String, attempted: String },

    #[error("Equipment already has an active breakdown: {existing}")]
    DuplicateActiveBreakdown { existing: BreakdownId },

    /// A concurrent caller changed the record first.
    #[error("Record changed concurrently; current state is {current}")]
    Conflict { current: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Forbidden(String),

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl WorkflowError {
    pub fn invalid_transition(current: impl fmt::Display, attempted: impl fmt::Display) -> Self {
        WorkflowError::InvalidTransition {
            current: current.to_string(),
            attempted: attempted.to_string(),
        }
    }

    pub fn conflict(current: impl fmt::Display) -> Self {
        WorkflowError::Conflict {
            current: current.to_string(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        WorkflowError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        WorkflowError::Forbidden(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            WorkflowError::Validation(_) => ErrorCode::ValidationFailed,
            WorkflowError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            WorkflowError::DuplicateActiveBreakdown { .. } => ErrorCode::DuplicateActiveBreakdown,
            WorkflowError::Conflict { .. } => ErrorCode::Conflict,
            WorkflowError::NotFound { entity, .. } => match *entity {
                "Alert" => ErrorCode::AlertNotFound,
                "Reorder request" => ErrorCode::ReorderRequestNotFound,
                "Equipment" => ErrorCode::EquipmentNotFound,
                _ => ErrorCode::BreakdownNotFound,
            },
            WorkflowError::Forbidden(_) => ErrorCode::Forbidden,
            WorkflowError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Current state carried by state errors, for client resynchronization.
    pub fn current_state(&self) -> Option<&str> {
        match self {
            WorkflowError::InvalidTransition { current, .. } | WorkflowError::Conflict { current } => {
                Some(current)
            }
            _ => None,
        }
    }
}

impl<S> From<IllegalTransition<S>> for WorkflowError
where
    S: StateMachine + fmt::Display,
{
    fn from(err: IllegalTransition<S>) -> Self {
        WorkflowError::invalid_transition(err.from, err.to)
    }
}

impl From<DomainError> for WorkflowError {
    fn from(err: DomainError) -> Self {
        WorkflowError::Infrastructure(err.to_string())
    }
}

impl From<AlertError> for WorkflowError {
    fn from(err: AlertError) -> Self {
        match err {
            AlertError::NotFound(id) => WorkflowError::not_found("Alert", id),
            AlertError::RequiresBreakdownDecision(id) => {
                WorkflowError::Validation(ValidationError::invalid_format(
                    "alertId",
                    format!("alert {} requires a breakdown decision", id),
                ))
            }
            AlertError::Forbidden(message) => WorkflowError::Forbidden(message),
            AlertError::Infrastructure(message) => WorkflowError::Infrastructure(message),
        }
    }
}
