//! PostgreSQL implementation of AlertRepository.
//!
//! Resolution is a conditional update on `resolved = FALSE`; of any number
//! of concurrent resolvers exactly one sees `Resolved`.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::alert::{Alert, AlertPriority, AlertType, ResolveOutcome};
use crate::domain::foundation::{
    AlertId, BreakdownId, DomainError, EquipmentId, Timestamp, UserId,
};
use crate::ports::{AlertFilter, AlertRepository};

use super::rows::{db_error, get, optional_timestamp, optional_user, stored, timestamp};

#[derive(Clone)]
pub struct PostgresAlertRepository {
    pool: PgPool,
}

impl PostgresAlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(super) const ALERT_COLUMNS: &str = "id, equipment_id, alert_type, priority, message, resolved, resolved_by, \
     resolution_note, breakdown_id, created_at, resolved_at";

#[async_trait]
impl AlertRepository for PostgresAlertRepository {
    async fn insert(&self, alert: &Alert) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO alerts (
                id, equipment_id, alert_type, priority, message, resolved,
                resolved_by, resolution_note, breakdown_id, created_at, resolved_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(alert.id.as_uuid())
        .bind(alert.equipment_id.as_str())
        .bind(alert.alert_type.as_str())
        .bind(alert.priority.as_str())
        .bind(&alert.message)
        .bind(alert.resolved)
        .bind(alert.resolved_by.as_ref().map(|u| u.as_str()))
        .bind(&alert.resolution_note)
        .bind(alert.breakdown_id.map(|b| *b.as_uuid()))
        .bind(alert.created_at.as_datetime())
        .bind(alert.resolved_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert alert", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &AlertId) -> Result<Option<Alert>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM alerts WHERE id = $1", ALERT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch alert", e))?;

        row.as_ref().map(row_to_alert).transpose()
    }

    async fn resolve(
        &self,
        id: &AlertId,
        resolver: &UserId,
        note: Option<String>,
        at: Timestamp,
    ) -> Result<Option<ResolveOutcome>, DomainError> {
        let Some(current) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let resolved = match current.resolve(resolver.clone(), note, at) {
            ResolveOutcome::Resolved(resolved) => resolved,
            already => return Ok(Some(already)),
        };

        let result = sqlx::query(
            r#"
            UPDATE alerts SET
                resolved = TRUE,
                resolved_by = $2,
                resolution_note = $3,
                resolved_at = $4
            WHERE id = $1 AND resolved = FALSE
            "#,
        )
        .bind(id.as_uuid())
        .bind(resolver.as_str())
        .bind(&resolved.resolution_note)
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to resolve alert", e))?;

        if result.rows_affected() == 1 {
            return Ok(Some(ResolveOutcome::Resolved(resolved)));
        }

        // Another resolver won; report what it stored.
        Ok(self.find_by_id(id).await?.map(ResolveOutcome::AlreadyResolved))
    }

    async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM alerts
            WHERE ($1::BOOLEAN IS NULL OR resolved = $1)
              AND ($2::TEXT IS NULL OR equipment_id = $2)
            ORDER BY created_at DESC
            "#,
            ALERT_COLUMNS
        ))
        .bind(filter.resolved)
        .bind(filter.equipment_id.as_ref().map(|e| e.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list alerts", e))?;

        rows.iter().map(row_to_alert).collect()
    }
}

pub(super) fn row_to_alert(row: &PgRow) -> Result<Alert, DomainError> {
    let id: uuid::Uuid = get(row, "id")?;
    let equipment_id: String = get(row, "equipment_id")?;
    let alert_type: String = get(row, "alert_type")?;
    let priority: String = get(row, "priority")?;
    let breakdown_id: Option<uuid::Uuid> = get(row, "breakdown_id")?;

    Ok(Alert {
        id: AlertId::from_uuid(id),
        equipment_id: EquipmentId::new(equipment_id).map_err(|e| stored("equipment_id", e))?,
        alert_type: AlertType::parse(&alert_type).map_err(|e| stored("alert_type", e))?,
        priority: AlertPriority::parse(&priority).map_err(|e| stored("priority", e))?,
        message: get(row, "message")?,
        resolved: get(row, "resolved")?,
        resolved_by: optional_user(row, "resolved_by")?,
        resolution_note: get(row, "resolution_note")?,
        breakdown_id: breakdown_id.map(BreakdownId::from_uuid),
        created_at: timestamp(row, "created_at")?,
        resolved_at: optional_timestamp(row, "resolved_at")?,
    })
}
