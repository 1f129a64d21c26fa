//! Error bodies and status mapping shared by every endpoint.
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation / malformed update | 400 |
//! | Authentication | 401 |
//! | Forbidden | 403 |
//! | NotFound | 404 |
//! | InvalidTransition / DuplicateActiveBreakdown / Conflict | 409 |
//! | Infrastructure | 500 |
//!
//! State conflicts carry `details.current`; duplicate reports carry
//! `details.existingId`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::handlers::StatusPublishError;
use crate::domain::alert::AlertError;
use crate::domain::breakdown::WorkflowError;
use crate::domain::foundation::{AuthError, ErrorCode, ValidationError};

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, body: ErrorResponse) -> Self {
        Self { status, body }
    }

    /// 400 for an unparseable path or query value.
    pub fn invalid(what: &str, raw: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorResponse::bad_request(format!("Invalid {}: '{}'", what, raw)),
        )
    }

    fn internal(code: ErrorCode, message: String) -> Self {
        tracing::error!(code = %code, error = %message, "Request failed");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(ErrorCode::InternalError, "Internal server error"),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(ErrorCode::ValidationFailed, err.to_string())
                .with_details(serde_json::json!({ "field": err.field() })),
        )
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match err {
            AuthError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        };
        Self::new(status, ErrorResponse::new(ErrorCode::Unauthorized, err.to_string()))
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match err {
            WorkflowError::Validation(e) => e.into(),
            WorkflowError::InvalidTransition { ref current, ref attempted } => Self::new(
                StatusCode::CONFLICT,
                ErrorResponse::new(code, &message)
                    .with_details(serde_json::json!({ "current": current, "attempted": attempted })),
            ),
            WorkflowError::Conflict { ref current } => Self::new(
                StatusCode::CONFLICT,
                ErrorResponse::new(code, &message).with_details(serde_json::json!({ "current": current })),
            ),
            WorkflowError::DuplicateActiveBreakdown { existing } => Self::new(
                StatusCode::CONFLICT,
                ErrorResponse::new(code, &message)
                    .with_details(serde_json::json!({ "existingId": existing.to_string() })),
            ),
            WorkflowError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, ErrorResponse::new(code, message)),
            WorkflowError::Forbidden(_) => Self::new(StatusCode::FORBIDDEN, ErrorResponse::new(code, message)),
            WorkflowError::Infrastructure(_) => Self::internal(code, message),
        }
    }
}

impl From<AlertError> for ApiError {
    fn from(err: AlertError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match err {
            AlertError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, ErrorResponse::new(code, message)),
            AlertError::RequiresBreakdownDecision(_) => {
                Self::new(StatusCode::CONFLICT, ErrorResponse::new(code, message))
            }
            AlertError::Forbidden(_) => Self::new(StatusCode::FORBIDDEN, ErrorResponse::new(code, message)),
            AlertError::Infrastructure(_) => Self::internal(code, message),
        }
    }
}

impl From<StatusPublishError> for ApiError {
    fn from(err: StatusPublishError) -> Self {
        match err {
            StatusPublishError::Malformed(e) => Self::new(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(ErrorCode::MalformedUpdate, e.to_string()),
            ),
            StatusPublishError::Infrastructure(message) => Self::internal(ErrorCode::DatabaseError, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::breakdown::check_inserted;
    use crate::domain::foundation::{BreakdownId, EquipmentId};
    use crate::ports::InsertOutcome;

    #[test]
    fn invalid_transition_maps_to_409_with_current_state() {
        let err: ApiError = WorkflowError::invalid_transition("RESOLVED", "REORDER_PENDING").into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.body.code, "INVALID_STATE_TRANSITION");
        assert_eq!(err.body.details.unwrap()["current"], "RESOLVED");
    }

    #[test]
    fn duplicate_report_carries_existing_id() {
        let existing = BreakdownId::new();
        let err: ApiError = WorkflowError::DuplicateActiveBreakdown { existing }.into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.body.details.unwrap()["existingId"], existing.to_string());
    }

    #[test]
    fn raced_report_is_409_conflict() {
        let equipment_id = EquipmentId::new("EQ-1").unwrap();
        let err: ApiError = check_inserted(InsertOutcome::Raced, &equipment_id).unwrap_err().into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.body.code, "CONFLICT");
        assert_eq!(err.body.details.unwrap()["current"], "RESOLVED");
    }

    #[test]
    fn validation_maps_to_400() {
        let err: ApiError = WorkflowError::Validation(ValidationError::empty_field("comment")).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.code, "VALIDATION_FAILED");
    }

    #[test]
    fn not_found_and_forbidden() {
        let err: ApiError = WorkflowError::not_found("Reorder request", "x").into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.body.code, "REORDER_REQUEST_NOT_FOUND");

        let err: ApiError = WorkflowError::forbidden("no").into();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn infrastructure_hides_message() {
        let err: ApiError = WorkflowError::Infrastructure("pool timed out".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.body.message.contains("pool"));
    }

    #[test]
    fn malformed_status_update_is_400() {
        let err: ApiError = StatusPublishError::Malformed(ValidationError::empty_field("equipment_id")).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.code, "MALFORMED_UPDATE");
    }

    #[test]
    fn expired_token_is_401() {
        let err: ApiError = AuthError::TokenExpired.into();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
