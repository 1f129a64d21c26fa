//! Alert repository port.

use async_trait::async_trait;

use crate::domain::alert::{Alert, ResolveOutcome};
use crate::domain::foundation::{AlertId, DomainError, EquipmentId, Timestamp, UserId};

/// Filter for listing alerts. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub resolved: Option<bool>,
    pub equipment_id: Option<EquipmentId>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        self.resolved.map_or(true, |r| alert.resolved == r)
            && self
                .equipment_id
                .as_ref()
                .map_or(true, |id| &alert.equipment_id == id)
    }
}

/// Repository port for alerts.
///
/// Implementations must make `resolve` conditional on the stored alert
/// still being unresolved, so two concurrent resolvers produce exactly one
/// `ResolveOutcome::Resolved`.
#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn insert(&self, alert: &Alert) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &AlertId) -> Result<Option<Alert>, DomainError>;

    /// Resolves the alert if it is unresolved.
    ///
    /// Returns `None` when no alert has this id.
    async fn resolve(
        &self,
        id: &AlertId,
        resolver: &UserId,
        note: Option<String>,
        at: Timestamp,
    ) -> Result<Option<ResolveOutcome>, DomainError>;

    /// Newest first.
    async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, DomainError>;
}
