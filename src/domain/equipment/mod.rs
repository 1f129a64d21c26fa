//! Equipment module - identity, operational status, and live snapshot.

mod snapshot;
mod status;

pub use snapshot::{EquipmentStatusSnapshot, StatusReport, Telemetry};
pub use status::{HealthScore, OperationalStatus};
