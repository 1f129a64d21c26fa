//! Mock session validator for testing.
//!
//! # Example
//!
//! ```ignore
//! use lab_monitor::adapters::auth::MockSessionValidator;
//! use lab_monitor::domain::foundation::Role;
//!
//! let validator = MockSessionValidator::new()
//!     .with_test_subject("manager-token", "manager-1", Role::LabManager);
//!
//! let subject = validator.validate("manager-token").await?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedSubject, Role, UserId};
use crate::ports::SessionValidator;

/// Maps fixed tokens to subjects. Unknown tokens are `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedSubject>>,
    /// Returned for every validation when set.
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(self, token: impl Into<String>, subject: AuthenticatedSubject) -> Self {
        self.tokens.write().unwrap().insert(token.into(), subject);
        self
    }

    /// Convenience for `with_subject` from plain strings.
    pub fn with_test_subject(
        self,
        token: impl Into<String>,
        user_id: impl Into<String>,
        role: Role,
    ) -> Self {
        let subject = AuthenticatedSubject::new(UserId::new(user_id).unwrap(), role);
        self.with_subject(token, subject)
    }

    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }

    pub fn remove_token(&self, token: &str) {
        self.tokens.write().unwrap().remove(token);
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedSubject, AuthError> {
        if let Some(error) = self.force_error.read().unwrap().clone() {
            return Err(error);
        }
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
