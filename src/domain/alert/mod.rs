//! Alert module - alert records, classification, and anomaly rules.

mod aggregate;
mod errors;
mod thresholds;
mod types;

pub use aggregate::{Alert, ResolveOutcome};
pub use errors::AlertError;
pub use thresholds::{AlertDraft, ThresholdRules};
pub use types::{AlertPriority, AlertType};
