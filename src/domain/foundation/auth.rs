//! Authentication types for the domain layer.
//!
//! An `AuthenticatedSubject` is what remains of a bearer token once the
//! `SessionValidator` port has verified it: the subject id and its role.
//! Nothing here depends on a particular token format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::{UserId, ValidationError};

/// Role carried in the token; decides which role room a connection joins
/// and which workflow operations a caller may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Reviews reorder requests; sees everything.
    PolicyMaker,
    /// Manages equipment for an institute; drives the breakdown workflow.
    LabManager,
    /// Uses equipment in a lab; may report breakdowns.
    Trainer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::PolicyMaker, Role::LabManager, Role::Trainer];

    /// Wire name, also used in `role:<name>` room keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PolicyMaker => "POLICY_MAKER",
            Role::LabManager => "LAB_MANAGER",
            Role::Trainer => "TRAINER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("role", format!("unknown role '{}'", s)))
    }
}

/// Verified identity of a caller or a live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject {
    pub id: UserId,
    pub role: Role,
}

impl AuthenticatedSubject {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// True when the subject holds any of the given roles.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No token was presented.
    #[error("No token provided")]
    MissingToken,

    /// The token is malformed or its signature does not verify.
    #[error("Invalid token")]
    InvalidToken,

    /// The signature verifies but the token is past its expiry.
    #[error("Token expired")]
    TokenExpired,

    /// The validation backend could not be reached.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Returns true if the client should obtain a new token and reconnect.
    pub fn requires_reauthentication(&self) -> bool {
        !matches!(self, AuthError::ServiceUnavailable(_))
    }
}
