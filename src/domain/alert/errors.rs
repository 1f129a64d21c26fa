//! Alert-specific error types.
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | RequiresBreakdownDecision | 409 |
//! | Forbidden | 403 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{AlertId, DomainError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertError {
    #[error("Alert not found: {0}")]
    NotFound(AlertId),

    /// Breakdown checks must go through the breakdown decision instead.
    #[error("Alert {0} requires a breakdown decision and cannot be resolved directly")]
    RequiresBreakdownDecision(AlertId),

    #[error("{0}")]
    Forbidden(String),

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl AlertError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AlertError::NotFound(_) => ErrorCode::AlertNotFound,
            AlertError::RequiresBreakdownDecision(_) => ErrorCode::BreakdownDecisionRequired,
            AlertError::Forbidden(_) => ErrorCode::Forbidden,
            AlertError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for AlertError {
    fn from(err: DomainError) -> Self {
        AlertError::Infrastructure(err.to_string())
    }
}
