//! Breakdown repository port (breakdown records and their reorder requests).
//!
//! # Design
//!
//! - **Store is the arbiter**: handlers hold no locks. Every status write is
//!   conditional on the status the handler read, and a lost race comes back
//!   as `CasOutcome::Stale` carrying what the store holds now.
//! - **One active record per equipment**: `insert_reported` refuses a new
//!   record while a non-RESOLVED one exists, atomically with the insert.
//! - **Paired writes**: submitting and reviewing a reorder touch both the
//!   request and its breakdown; confirming a breakdown check touches the
//!   breakdown and the alert. Adapters apply them all-or-nothing.

use async_trait::async_trait;

use crate::domain::alert::Alert;
use crate::domain::breakdown::{BreakdownRecord, BreakdownStatus, ReorderRequest, ReorderStatus};
use crate::domain::foundation::{
    AlertId, BreakdownId, DomainError, EquipmentId, ReorderRequestId, Timestamp, UserId,
};

/// Result of inserting a freshly reported breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// An active record already exists for the equipment.
    DuplicateActive(BreakdownId),
    /// The insert was blocked by an active record that was resolved before
    /// it could be read back.
    Raced,
}

/// Result of confirming a breakdown check alert.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// The candidate record was inserted and the alert resolved against it.
    Opened { breakdown: BreakdownRecord, alert: Alert },
    /// The equipment already had an active record; the alert was resolved
    /// against that one and the candidate discarded.
    Attached { breakdown: BreakdownRecord, alert: Alert },
    /// The alert had already been answered. Nothing was written.
    AlreadyAnswered(Alert),
    /// Same as `InsertOutcome::Raced`. Nothing was written.
    Raced,
    /// No alert with that id.
    Missing,
}

/// Result of a compare-and-swap status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome<S> {
    Applied,
    /// Stored status no longer matched the expected one.
    Stale { current: S },
    /// No record with that id.
    Missing,
}

impl<S> CasOutcome<S> {
    pub fn is_applied(&self) -> bool {
        matches!(self, CasOutcome::Applied)
    }
}

/// Listing filter for reorder requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReorderFilter {
    pub status: Option<ReorderStatus>,
}

#[async_trait]
pub trait BreakdownRepository: Send + Sync {
    /// Inserts a REPORTED record unless the equipment has an active one.
    async fn insert_reported(&self, record: &BreakdownRecord) -> Result<InsertOutcome, DomainError>;

    async fn find_by_id(&self, id: &BreakdownId) -> Result<Option<BreakdownRecord>, DomainError>;

    async fn find_active_for_equipment(
        &self,
        equipment_id: &EquipmentId,
    ) -> Result<Option<BreakdownRecord>, DomainError>;

    /// Newest first.
    async fn list(&self, active_only: bool) -> Result<Vec<BreakdownRecord>, DomainError>;

    /// Replaces the record if its stored status still equals `expected`.
    async fn update_if_status(
        &self,
        record: &BreakdownRecord,
        expected: BreakdownStatus,
    ) -> Result<CasOutcome<BreakdownStatus>, DomainError>;

    /// Updates the breakdown (conditional on `expected`) and inserts the
    /// new PENDING request, atomically.
    async fn submit_reorder(
        &self,
        record: &BreakdownRecord,
        expected: BreakdownStatus,
        request: &ReorderRequest,
    ) -> Result<CasOutcome<BreakdownStatus>, DomainError>;

    /// Writes a reviewed request and its breakdown atomically.
    ///
    /// Applies only if the request is still PENDING and the breakdown is
    /// still REORDER_PENDING; otherwise reports the request's stored status.
    async fn review_reorder(
        &self,
        request: &ReorderRequest,
        record: &BreakdownRecord,
    ) -> Result<CasOutcome<ReorderStatus>, DomainError>;

    /// Confirms the breakdown check `alert_id` in one paired write.
    ///
    /// Applies only while the alert is unresolved. Inserts `candidate`
    /// unless the equipment already has an active record, then resolves the
    /// alert linked to whichever record is active.
    async fn confirm_check(
        &self,
        candidate: &BreakdownRecord,
        alert_id: &AlertId,
        resolver: &UserId,
        at: Timestamp,
    ) -> Result<ConfirmOutcome, DomainError>;

    async fn find_reorder(&self, id: &ReorderRequestId) -> Result<Option<ReorderRequest>, DomainError>;

    /// Requests of one breakdown, oldest first.
    async fn reorders_for(&self, breakdown_id: &BreakdownId) -> Result<Vec<ReorderRequest>, DomainError>;

    /// Newest first.
    async fn list_reorders(&self, filter: ReorderFilter) -> Result<Vec<ReorderRequest>, DomainError>;
}
