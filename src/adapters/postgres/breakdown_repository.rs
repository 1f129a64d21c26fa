//! PostgreSQL implementation of BreakdownRepository.
//!
//! Every transition is `UPDATE ... WHERE id = $1 AND status = $expected`.
//! Zero affected rows means another writer got there first; the current
//! status is then read back and returned as `CasOutcome::Stale`. Paired
//! writes (breakdown + reorder request) share one transaction.
//!
//! The partial unique index `breakdowns_one_active_per_equipment` enforces
//! one active breakdown per equipment.
//!
//! Confirming a breakdown check locks the alert row first, so a confirm and
//! a dismissal of the same alert are serialized and exactly one applies.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::alert::ResolveOutcome;
use crate::domain::breakdown::{
    BreakdownRecord, BreakdownStatus, ReorderRequest, ReorderStatus, ReorderUrgency,
};
use crate::domain::foundation::{
    AlertId, BreakdownId, DomainError, EquipmentId, ReorderRequestId, Timestamp, UserId,
};
use crate::ports::{BreakdownRepository, CasOutcome, ConfirmOutcome, InsertOutcome, ReorderFilter};

use super::alert_repository::{row_to_alert, ALERT_COLUMNS};
use super::rows::{db_error, get, optional_timestamp, optional_user, stored, timestamp};

#[derive(Clone)]
pub struct PostgresBreakdownRepository {
    pool: PgPool,
}

impl PostgresBreakdownRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_status(&self, id: &BreakdownId) -> Result<Option<BreakdownStatus>, DomainError> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM breakdowns WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch breakdown status", e))?;

        status
            .map(|s| BreakdownStatus::parse(&s).map_err(|e| stored("status", e)))
            .transpose()
    }

    async fn stale_or_missing(&self, id: &BreakdownId) -> Result<CasOutcome<BreakdownStatus>, DomainError> {
        Ok(match self.current_status(id).await? {
            Some(current) => CasOutcome::Stale { current },
            None => CasOutcome::Missing,
        })
    }
}

const BREAKDOWN_COLUMNS: &str = "id, equipment_id, reason, is_auto_detected, status, reported_by, \
     resolved_by, created_at, updated_at, resolved_at";

const REORDER_COLUMNS: &str = "id, breakdown_id, equipment_id, equipment_name, quantity, urgency, \
     reason, estimated_cost, status, requested_by, reviewed_by, reviewed_at, review_comments, created_at";

/// Conditionally moves a breakdown to `record`'s state.
async fn update_breakdown_in(
    tx: &mut Transaction<'_, Postgres>,
    record: &BreakdownRecord,
    expected: BreakdownStatus,
) -> Result<bool, DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE breakdowns SET
            status = $3,
            resolved_by = $4,
            updated_at = $5,
            resolved_at = $6
        WHERE id = $1 AND status = $2
        "#,
    )
    .bind(record.id.as_uuid())
    .bind(expected.as_str())
    .bind(record.status.as_str())
    .bind(record.resolved_by.as_ref().map(|u| u.as_str()))
    .bind(record.updated_at.as_datetime())
    .bind(record.resolved_at.map(|t| *t.as_datetime()))
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to update breakdown", e))?;

    Ok(result.rows_affected() == 1)
}

/// Inserts a REPORTED record unless the equipment has an active one.
async fn insert_breakdown_in(
    tx: &mut Transaction<'_, Postgres>,
    record: &BreakdownRecord,
) -> Result<bool, DomainError> {
    let result = sqlx::query(
        r#"
        INSERT INTO breakdowns (
            id, equipment_id, reason, is_auto_detected, status, reported_by,
            resolved_by, created_at, updated_at, resolved_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (equipment_id) WHERE status <> 'RESOLVED' DO NOTHING
        "#,
    )
    .bind(record.id.as_uuid())
    .bind(record.equipment_id.as_str())
    .bind(&record.reason)
    .bind(record.is_auto_detected)
    .bind(record.status.as_str())
    .bind(record.reported_by.as_ref().map(|u| u.as_str()))
    .bind(record.resolved_by.as_ref().map(|u| u.as_str()))
    .bind(record.created_at.as_datetime())
    .bind(record.updated_at.as_datetime())
    .bind(record.resolved_at.map(|t| *t.as_datetime()))
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to insert breakdown", e))?;

    Ok(result.rows_affected() == 1)
}

#[async_trait]
impl BreakdownRepository for PostgresBreakdownRepository {
    async fn insert_reported(&self, record: &BreakdownRecord) -> Result<InsertOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        if insert_breakdown_in(&mut tx, record).await? {
            tx.commit()
                .await
                .map_err(|e| db_error("Failed to commit transaction", e))?;
            return Ok(InsertOutcome::Inserted);
        }
        drop(tx);

        Ok(match self.find_active_for_equipment(&record.equipment_id).await? {
            Some(existing) => InsertOutcome::DuplicateActive(existing.id),
            None => InsertOutcome::Raced,
        })
    }

    async fn find_by_id(&self, id: &BreakdownId) -> Result<Option<BreakdownRecord>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM breakdowns WHERE id = $1", BREAKDOWN_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch breakdown", e))?;

        row.as_ref().map(row_to_breakdown).transpose()
    }

    async fn find_active_for_equipment(
        &self,
        equipment_id: &EquipmentId,
    ) -> Result<Option<BreakdownRecord>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM breakdowns WHERE equipment_id = $1 AND status <> 'RESOLVED'",
            BREAKDOWN_COLUMNS
        ))
        .bind(equipment_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch active breakdown", e))?;

        row.as_ref().map(row_to_breakdown).transpose()
    }

    async fn list(&self, active_only: bool) -> Result<Vec<BreakdownRecord>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM breakdowns
            WHERE NOT $1 OR status <> 'RESOLVED'
            ORDER BY created_at DESC
            "#,
            BREAKDOWN_COLUMNS
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list breakdowns", e))?;

        rows.iter().map(row_to_breakdown).collect()
    }

    async fn update_if_status(
        &self,
        record: &BreakdownRecord,
        expected: BreakdownStatus,
    ) -> Result<CasOutcome<BreakdownStatus>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        if !update_breakdown_in(&mut tx, record, expected).await? {
            drop(tx);
            return self.stale_or_missing(&record.id).await;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        Ok(CasOutcome::Applied)
    }

    async fn submit_reorder(
        &self,
        record: &BreakdownRecord,
        expected: BreakdownStatus,
        request: &ReorderRequest,
    ) -> Result<CasOutcome<BreakdownStatus>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        if !update_breakdown_in(&mut tx, record, expected).await? {
            drop(tx);
            return self.stale_or_missing(&record.id).await;
        }

        sqlx::query(
            r#"
            INSERT INTO reorder_requests (
                id, breakdown_id, equipment_id, equipment_name, quantity, urgency,
                reason, estimated_cost, status, requested_by, reviewed_by,
                reviewed_at, review_comments, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.breakdown_id.as_uuid())
        .bind(request.equipment_id.as_str())
        .bind(&request.equipment_name)
        .bind(request.quantity as i32)
        .bind(request.urgency.as_str())
        .bind(&request.reason)
        .bind(request.estimated_cost)
        .bind(request.status.as_str())
        .bind(request.requested_by.as_str())
        .bind(request.reviewed_by.as_ref().map(|u| u.as_str()))
        .bind(request.reviewed_at.map(|t| *t.as_datetime()))
        .bind(&request.review_comments)
        .bind(request.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert reorder request", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        Ok(CasOutcome::Applied)
    }

    async fn review_reorder(
        &self,
        request: &ReorderRequest,
        record: &BreakdownRecord,
    ) -> Result<CasOutcome<ReorderStatus>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        let reviewed = sqlx::query(
            r#"
            UPDATE reorder_requests SET
                status = $2,
                reviewed_by = $3,
                reviewed_at = $4,
                review_comments = $5
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.status.as_str())
        .bind(request.reviewed_by.as_ref().map(|u| u.as_str()))
        .bind(request.reviewed_at.map(|t| *t.as_datetime()))
        .bind(&request.review_comments)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to review reorder request", e))?;

        if reviewed.rows_affected() == 0 {
            drop(tx);
            return Ok(match self.find_reorder(&request.id).await? {
                Some(current) => CasOutcome::Stale {
                    current: current.status,
                },
                None => CasOutcome::Missing,
            });
        }

        if !update_breakdown_in(&mut tx, record, BreakdownStatus::ReorderPending).await? {
            // Rolls back the request update with it.
            drop(tx);
            return Ok(match self.current_status(&record.id).await? {
                Some(_) => CasOutcome::Stale {
                    current: ReorderStatus::Pending,
                },
                None => CasOutcome::Missing,
            });
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        Ok(CasOutcome::Applied)
    }

    async fn confirm_check(
        &self,
        candidate: &BreakdownRecord,
        alert_id: &AlertId,
        resolver: &UserId,
        at: Timestamp,
    ) -> Result<ConfirmOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM alerts WHERE id = $1 FOR UPDATE",
            ALERT_COLUMNS
        ))
        .bind(alert_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock alert", e))?;
        let Some(alert) = row.as_ref().map(row_to_alert).transpose()? else {
            return Ok(ConfirmOutcome::Missing);
        };
        if alert.resolved {
            return Ok(ConfirmOutcome::AlreadyAnswered(alert));
        }

        let existing = if insert_breakdown_in(&mut tx, candidate).await? {
            None
        } else {
            let row = sqlx::query(&format!(
                "SELECT {} FROM breakdowns WHERE equipment_id = $1 AND status <> 'RESOLVED' FOR UPDATE",
                BREAKDOWN_COLUMNS
            ))
            .bind(alert.equipment_id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to fetch active breakdown", e))?;
            match row.as_ref().map(row_to_breakdown).transpose()? {
                Some(record) => Some(record),
                None => return Ok(ConfirmOutcome::Raced),
            }
        };

        let breakdown = existing.clone().unwrap_or_else(|| candidate.clone());
        let resolved = match alert.confirm_breakdown(breakdown.id, existing.is_some(), resolver.clone(), at) {
            ResolveOutcome::Resolved(resolved) => resolved,
            ResolveOutcome::AlreadyResolved(stored) => return Ok(ConfirmOutcome::AlreadyAnswered(stored)),
        };

        sqlx::query(
            r#"
            UPDATE alerts SET
                resolved = TRUE,
                resolved_by = $2,
                resolution_note = $3,
                breakdown_id = $4,
                resolved_at = $5
            WHERE id = $1 AND resolved = FALSE
            "#,
        )
        .bind(resolved.id.as_uuid())
        .bind(resolver.as_str())
        .bind(&resolved.resolution_note)
        .bind(breakdown.id.as_uuid())
        .bind(at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to resolve alert", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(match existing {
            Some(breakdown) => ConfirmOutcome::Attached {
                breakdown,
                alert: resolved,
            },
            None => ConfirmOutcome::Opened {
                breakdown,
                alert: resolved,
            },
        })
    }

    async fn find_reorder(&self, id: &ReorderRequestId) -> Result<Option<ReorderRequest>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM reorder_requests WHERE id = $1", REORDER_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch reorder request", e))?;

        row.as_ref().map(row_to_reorder).transpose()
    }

    async fn reorders_for(&self, breakdown_id: &BreakdownId) -> Result<Vec<ReorderRequest>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM reorder_requests WHERE breakdown_id = $1 ORDER BY created_at ASC",
            REORDER_COLUMNS
        ))
        .bind(breakdown_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch reorder requests", e))?;

        rows.iter().map(row_to_reorder).collect()
    }

    async fn list_reorders(&self, filter: ReorderFilter) -> Result<Vec<ReorderRequest>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM reorder_requests
            WHERE $1::TEXT IS NULL OR status = $1
            ORDER BY created_at DESC
            "#,
            REORDER_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list reorder requests", e))?;

        rows.iter().map(row_to_reorder).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Row mapping
// ════════════════════════════════════════════════════════════════════════════

fn row_to_breakdown(row: &PgRow) -> Result<BreakdownRecord, DomainError> {
    let id: uuid::Uuid = get(row, "id")?;
    let equipment_id: String = get(row, "equipment_id")?;
    let status: String = get(row, "status")?;

    Ok(BreakdownRecord {
        id: BreakdownId::from_uuid(id),
        equipment_id: EquipmentId::new(equipment_id).map_err(|e| stored("equipment_id", e))?,
        reason: get(row, "reason")?,
        is_auto_detected: get(row, "is_auto_detected")?,
        status: BreakdownStatus::parse(&status).map_err(|e| stored("status", e))?,
        reported_by: optional_user(row, "reported_by")?,
        resolved_by: optional_user(row, "resolved_by")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
        resolved_at: optional_timestamp(row, "resolved_at")?,
    })
}

fn row_to_reorder(row: &PgRow) -> Result<ReorderRequest, DomainError> {
    let id: uuid::Uuid = get(row, "id")?;
    let breakdown_id: uuid::Uuid = get(row, "breakdown_id")?;
    let equipment_id: String = get(row, "equipment_id")?;
    let quantity: i32 = get(row, "quantity")?;
    let urgency: String = get(row, "urgency")?;
    let status: String = get(row, "status")?;
    let requested_by: String = get(row, "requested_by")?;

    Ok(ReorderRequest {
        id: ReorderRequestId::from_uuid(id),
        breakdown_id: BreakdownId::from_uuid(breakdown_id),
        equipment_id: EquipmentId::new(equipment_id).map_err(|e| stored("equipment_id", e))?,
        equipment_name: get(row, "equipment_name")?,
        quantity: u32::try_from(quantity)
            .map_err(|e| db_error("Invalid stored quantity", e))?,
        urgency: ReorderUrgency::parse(&urgency).map_err(|e| stored("urgency", e))?,
        reason: get(row, "reason")?,
        estimated_cost: get(row, "estimated_cost")?,
        status: ReorderStatus::parse(&status).map_err(|e| stored("status", e))?,
        requested_by: UserId::new(requested_by).map_err(|e| stored("requested_by", e))?,
        reviewed_by: optional_user(row, "reviewed_by")?,
        reviewed_at: optional_timestamp(row, "reviewed_at")?,
        review_comments: get(row, "review_comments")?,
        created_at: timestamp(row, "created_at")?,
    })
}
