//! Equipment status store port.
//!
//! Holds the single live snapshot per equipment. Recording a report is an
//! atomic read-merge-write: the adapter returns the snapshot it replaced so
//! callers can detect edges (e.g. a transition into FAULTY) without a second
//! round trip.

use async_trait::async_trait;

use crate::domain::equipment::{EquipmentStatusSnapshot, StatusReport};
use crate::domain::foundation::{DomainError, EquipmentId, Timestamp};

/// Snapshot before and after one report.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub previous: Option<EquipmentStatusSnapshot>,
    pub current: EquipmentStatusSnapshot,
}

#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    /// Merges `report` into the stored snapshot and returns both versions.
    async fn record_status(
        &self,
        equipment_id: &EquipmentId,
        report: &StatusReport,
        at: Timestamp,
    ) -> Result<StatusChange, DomainError>;

    /// Current snapshot, if any report has been recorded.
    async fn find_status(&self, equipment_id: &EquipmentId) -> Result<Option<EquipmentStatusSnapshot>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EquipmentRepository) {}
}
