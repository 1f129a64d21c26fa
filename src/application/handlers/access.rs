//! Role checks shared by command handlers.

use crate::domain::alert::AlertError;
use crate::domain::breakdown::WorkflowError;
use crate::domain::foundation::{AuthenticatedSubject, Role};

/// Roles that drive the breakdown workflow and close alerts.
pub const OPERATORS: &[Role] = &[Role::LabManager, Role::PolicyMaker];

/// Roles allowed to report a breakdown.
pub const REPORTERS: &[Role] = &[Role::LabManager, Role::PolicyMaker, Role::Trainer];

/// Roles allowed to review reorder requests.
pub const REVIEWERS: &[Role] = &[Role::PolicyMaker];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied(pub String);

/// Checks that `subject` holds one of `allowed` for `action`.
pub fn require_role(
    subject: &AuthenticatedSubject,
    allowed: &[Role],
    action: &str,
) -> Result<(), AccessDenied> {
    if subject.has_any_role(allowed) {
        return Ok(());
    }
    tracing::debug!(user_id = %subject.id, role = %subject.role, action, "Access denied");
    let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
    Err(AccessDenied(format!(
        "{} requires one of: {}",
        action,
        names.join(", ")
    )))
}

impl From<AccessDenied> for WorkflowError {
    fn from(denied: AccessDenied) -> Self {
        WorkflowError::Forbidden(denied.0)
    }
}

impl From<AccessDenied> for AlertError {
    fn from(denied: AccessDenied) -> Self {
        AlertError::Forbidden(denied.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    fn subject(role: Role) -> AuthenticatedSubject {
        AuthenticatedSubject::new(UserId::new("u-1").unwrap(), role)
    }

    #[test]
    fn trainer_may_report_but_not_operate() {
        assert!(require_role(&subject(Role::Trainer), REPORTERS, "report breakdown").is_ok());
        let denied = require_role(&subject(Role::Trainer), OPERATORS, "resolve breakdown").unwrap_err();
        assert_eq!(denied.0, "resolve breakdown requires one of: LAB_MANAGER, POLICY_MAKER");
    }

    #[test]
    fn only_policy_makers_review() {
        assert!(require_role(&subject(Role::PolicyMaker), REVIEWERS, "review").is_ok());
        assert!(require_role(&subject(Role::LabManager), REVIEWERS, "review").is_err());
    }

    #[test]
    fn denial_converts_to_forbidden() {
        let err: WorkflowError = AccessDenied("nope".into()).into();
        assert_eq!(err, WorkflowError::Forbidden("nope".into()));
    }
}
