//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `jwt` - HS256 shared-secret tokens
//! - `mock` - Fixed tokens for tests

mod jwt;
mod mock;

pub use jwt::{JwtConfig, JwtSessionValidator, LabClaims};
pub use mock::MockSessionValidator;
