//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, roles, and error types
//! that form the vocabulary of the lab monitoring domain.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedSubject, Role};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AlertId, BreakdownId, EquipmentId, LabId, ReorderRequestId, UserId};
pub use state_machine::{IllegalTransition, StateMachine};
pub use timestamp::Timestamp;
