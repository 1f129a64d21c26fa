//! Session validation port for bearer token verification.
//!
//! Both the HTTP middleware and the connection handshake use this port to
//! turn a raw token into an `AuthenticatedSubject`. The token format is an
//! adapter concern.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedSubject};

/// Verifies bearer tokens and extracts the subject id and role.
///
/// # Contract
///
/// Implementations must:
/// - Validate the token signature
/// - Validate the expiry claim
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedSubject, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Role, UserId};
    use std::collections::HashMap;

    struct FixedTokens(HashMap<String, AuthenticatedSubject>);

    #[async_trait]
    impl SessionValidator for FixedTokens {
        async fn validate(&self, token: &str) -> Result<AuthenticatedSubject, AuthError> {
            self.0.get(token).cloned().ok_or(AuthError::InvalidToken)
        }
    }

    #[tokio::test]
    async fn validator_is_usable_as_trait_object() {
        let mut tokens = HashMap::new();
        tokens.insert(
            "good".to_string(),
            AuthenticatedSubject::new(UserId::new("u-1").unwrap(), Role::Trainer),
        );
        let validator: Box<dyn SessionValidator> = Box::new(FixedTokens(tokens));

        assert_eq!(validator.validate("good").await.unwrap().role, Role::Trainer);
        assert_eq!(validator.validate("bad").await, Err(AuthError::InvalidToken));
    }
}
