//! In-memory entity store.
//!
//! Implements the equipment, alert, and breakdown repositories over a single
//! async `RwLock`, so each conditional write (and each paired write) is
//! atomic with respect to every other call. Used when no database is
//! configured, and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::alert::{Alert, ResolveOutcome};
use crate::domain::breakdown::{BreakdownRecord, BreakdownStatus, ReorderRequest, ReorderStatus};
use crate::domain::equipment::{EquipmentStatusSnapshot, StatusReport};
use crate::domain::foundation::{
    AlertId, BreakdownId, DomainError, EquipmentId, ReorderRequestId, Timestamp, UserId,
};
use crate::ports::{
    AlertFilter, AlertRepository, BreakdownRepository, CasOutcome, ConfirmOutcome,
    EquipmentRepository, InsertOutcome, ReorderFilter, StatusChange,
};

#[derive(Default)]
struct Tables {
    snapshots: HashMap<EquipmentId, EquipmentStatusSnapshot>,
    alerts: HashMap<AlertId, Alert>,
    breakdowns: HashMap<BreakdownId, BreakdownRecord>,
    reorders: HashMap<ReorderRequestId, ReorderRequest>,
}

impl Tables {
    fn active_breakdown(&self, equipment_id: &EquipmentId) -> Option<&BreakdownRecord> {
        self.breakdowns
            .values()
            .find(|b| &b.equipment_id == equipment_id && b.is_active())
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], created: impl Fn(&T) -> Timestamp) {
    items.sort_by(|a, b| created(b).cmp(&created(a)));
}

#[async_trait]
impl EquipmentRepository for InMemoryStore {
    async fn record_status(
        &self,
        equipment_id: &EquipmentId,
        report: &StatusReport,
        at: Timestamp,
    ) -> Result<StatusChange, DomainError> {
        let mut tables = self.tables.write().await;
        let previous = tables.snapshots.get(equipment_id).cloned();
        let current = EquipmentStatusSnapshot::merge(equipment_id.clone(), previous.as_ref(), report, at);
        tables.snapshots.insert(equipment_id.clone(), current.clone());
        Ok(StatusChange { previous, current })
    }

    async fn find_status(&self, equipment_id: &EquipmentId) -> Result<Option<EquipmentStatusSnapshot>, DomainError> {
        Ok(self.tables.read().await.snapshots.get(equipment_id).cloned())
    }
}

#[async_trait]
impl AlertRepository for InMemoryStore {
    async fn insert(&self, alert: &Alert) -> Result<(), DomainError> {
        self.tables.write().await.alerts.insert(alert.id, alert.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AlertId) -> Result<Option<Alert>, DomainError> {
        Ok(self.tables.read().await.alerts.get(id).cloned())
    }

    async fn resolve(
        &self,
        id: &AlertId,
        resolver: &UserId,
        note: Option<String>,
        at: Timestamp,
    ) -> Result<Option<ResolveOutcome>, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.alerts.get_mut(id) else {
            return Ok(None);
        };
        let outcome = stored.resolve(resolver.clone(), note, at);
        if let ResolveOutcome::Resolved(updated) = &outcome {
            *stored = updated.clone();
        }
        Ok(Some(outcome))
    }

    async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, DomainError> {
        let tables = self.tables.read().await;
        let mut alerts: Vec<Alert> = tables
            .alerts
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        newest_first(&mut alerts, |a| a.created_at);
        Ok(alerts)
    }
}

#[async_trait]
impl BreakdownRepository for InMemoryStore {
    async fn insert_reported(&self, record: &BreakdownRecord) -> Result<InsertOutcome, DomainError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.active_breakdown(&record.equipment_id) {
            return Ok(InsertOutcome::DuplicateActive(existing.id));
        }
        tables.breakdowns.insert(record.id, record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_id(&self, id: &BreakdownId) -> Result<Option<BreakdownRecord>, DomainError> {
        Ok(self.tables.read().await.breakdowns.get(id).cloned())
    }

    async fn find_active_for_equipment(
        &self,
        equipment_id: &EquipmentId,
    ) -> Result<Option<BreakdownRecord>, DomainError> {
        Ok(self.tables.read().await.active_breakdown(equipment_id).cloned())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<BreakdownRecord>, DomainError> {
        let tables = self.tables.read().await;
        let mut records: Vec<BreakdownRecord> = tables
            .breakdowns
            .values()
            .filter(|b| !active_only || b.is_active())
            .cloned()
            .collect();
        newest_first(&mut records, |b| b.created_at);
        Ok(records)
    }

    async fn update_if_status(
        &self,
        record: &BreakdownRecord,
        expected: BreakdownStatus,
    ) -> Result<CasOutcome<BreakdownStatus>, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.breakdowns.get_mut(&record.id) else {
            return Ok(CasOutcome::Missing);
        };
        if stored.status != expected {
            return Ok(CasOutcome::Stale { current: stored.status });
        }
        *stored = record.clone();
        Ok(CasOutcome::Applied)
    }

    async fn submit_reorder(
        &self,
        record: &BreakdownRecord,
        expected: BreakdownStatus,
        request: &ReorderRequest,
    ) -> Result<CasOutcome<BreakdownStatus>, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.breakdowns.get_mut(&record.id) else {
            return Ok(CasOutcome::Missing);
        };
        if stored.status != expected {
            return Ok(CasOutcome::Stale { current: stored.status });
        }
        *stored = record.clone();
        tables.reorders.insert(request.id, request.clone());
        Ok(CasOutcome::Applied)
    }

    async fn review_reorder(
        &self,
        request: &ReorderRequest,
        record: &BreakdownRecord,
    ) -> Result<CasOutcome<ReorderStatus>, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(stored_request) = tables.reorders.get(&request.id) else {
            return Ok(CasOutcome::Missing);
        };
        if stored_request.status != ReorderStatus::Pending {
            return Ok(CasOutcome::Stale {
                current: stored_request.status,
            });
        }
        let breakdown_pending = tables
            .breakdowns
            .get(&record.id)
            .map(|b| b.status == BreakdownStatus::ReorderPending);
        match breakdown_pending {
            None => return Ok(CasOutcome::Missing),
            Some(false) => {
                return Ok(CasOutcome::Stale {
                    current: ReorderStatus::Pending,
                })
            }
            Some(true) => {}
        }

        tables.reorders.insert(request.id, request.clone());
        tables.breakdowns.insert(record.id, record.clone());
        Ok(CasOutcome::Applied)
    }

    async fn confirm_check(
        &self,
        candidate: &BreakdownRecord,
        alert_id: &AlertId,
        resolver: &UserId,
        at: Timestamp,
    ) -> Result<ConfirmOutcome, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(alert) = tables.alerts.get(alert_id).cloned() else {
            return Ok(ConfirmOutcome::Missing);
        };
        if alert.resolved {
            return Ok(ConfirmOutcome::AlreadyAnswered(alert));
        }

        let existing = tables.active_breakdown(&alert.equipment_id).cloned();
        let breakdown = existing.clone().unwrap_or_else(|| candidate.clone());
        let resolved = match alert.confirm_breakdown(breakdown.id, existing.is_some(), resolver.clone(), at) {
            ResolveOutcome::Resolved(resolved) => resolved,
            ResolveOutcome::AlreadyResolved(stored) => return Ok(ConfirmOutcome::AlreadyAnswered(stored)),
        };

        tables.alerts.insert(resolved.id, resolved.clone());
        Ok(match existing {
            Some(breakdown) => ConfirmOutcome::Attached {
                breakdown,
                alert: resolved,
            },
            None => {
                tables.breakdowns.insert(breakdown.id, breakdown.clone());
                ConfirmOutcome::Opened {
                    breakdown,
                    alert: resolved,
                }
            }
        })
    }

    async fn find_reorder(&self, id: &ReorderRequestId) -> Result<Option<ReorderRequest>, DomainError> {
        Ok(self.tables.read().await.reorders.get(id).cloned())
    }

    async fn reorders_for(&self, breakdown_id: &BreakdownId) -> Result<Vec<ReorderRequest>, DomainError> {
        let tables = self.tables.read().await;
        let mut requests: Vec<ReorderRequest> = tables
            .reorders
            .values()
            .filter(|r| &r.breakdown_id == breakdown_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(requests)
    }

    async fn list_reorders(&self, filter: ReorderFilter) -> Result<Vec<ReorderRequest>, DomainError> {
        let tables = self.tables.read().await;
        let mut requests: Vec<ReorderRequest> = tables
            .reorders
            .values()
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        newest_first(&mut requests, |r| r.created_at);
        Ok(requests)
    }
}
