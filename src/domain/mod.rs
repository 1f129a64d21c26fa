//! Domain layer - Pure business logic with no external dependencies.
//!
//! - `foundation`: identifiers, roles, errors, and the state machine trait
//! - `equipment`: equipment identity and live status snapshots
//! - `alert`: alert records and anomaly rules
//! - `breakdown`: the breakdown and reorder workflow

pub mod alert;
pub mod breakdown;
pub mod equipment;
pub mod foundation;
