//! PostgreSQL implementation of EquipmentRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::equipment::{
    EquipmentStatusSnapshot, HealthScore, OperationalStatus, StatusReport, Telemetry,
};
use crate::domain::foundation::{DomainError, EquipmentId, Timestamp};
use crate::ports::{EquipmentRepository, StatusChange};

use super::rows::{db_error, get, optional_timestamp, stored, timestamp};

#[derive(Clone)]
pub struct PostgresEquipmentRepository {
    pool: PgPool,
}

impl PostgresEquipmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SNAPSHOT_COLUMNS: &str = "equipment_id, status, health_score, temperature, vibration, \
     energy_consumption, last_used_at, updated_at";

#[async_trait]
impl EquipmentRepository for PostgresEquipmentRepository {
    async fn record_status(
        &self,
        equipment_id: &EquipmentId,
        report: &StatusReport,
        at: Timestamp,
    ) -> Result<StatusChange, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        // Lock the live row so concurrent reports merge one after another.
        let row = sqlx::query(&format!(
            "SELECT {} FROM equipment_status WHERE equipment_id = $1 FOR UPDATE",
            SNAPSHOT_COLUMNS
        ))
        .bind(equipment_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to fetch status", e))?;
        let previous = row.as_ref().map(row_to_snapshot).transpose()?;

        let current = EquipmentStatusSnapshot::merge(equipment_id.clone(), previous.as_ref(), report, at);

        sqlx::query(
            r#"
            INSERT INTO equipment_status (
                equipment_id, status, health_score, temperature, vibration,
                energy_consumption, last_used_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (equipment_id) DO UPDATE SET
                status = EXCLUDED.status,
                health_score = EXCLUDED.health_score,
                temperature = EXCLUDED.temperature,
                vibration = EXCLUDED.vibration,
                energy_consumption = EXCLUDED.energy_consumption,
                last_used_at = EXCLUDED.last_used_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(current.equipment_id.as_str())
        .bind(current.status.as_str())
        .bind(current.health_score.value() as i16)
        .bind(current.telemetry.temperature)
        .bind(current.telemetry.vibration)
        .bind(current.telemetry.energy_consumption)
        .bind(current.last_used_at.map(|t| *t.as_datetime()))
        .bind(current.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to write status", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(StatusChange { previous, current })
    }

    async fn find_status(&self, equipment_id: &EquipmentId) -> Result<Option<EquipmentStatusSnapshot>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM equipment_status WHERE equipment_id = $1",
            SNAPSHOT_COLUMNS
        ))
        .bind(equipment_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch status", e))?;

        row.as_ref().map(row_to_snapshot).transpose()
    }
}

fn row_to_snapshot(row: &PgRow) -> Result<EquipmentStatusSnapshot, DomainError> {
    let equipment_id: String = get(row, "equipment_id")?;
    let status: String = get(row, "status")?;
    let health: i16 = get(row, "health_score")?;

    Ok(EquipmentStatusSnapshot {
        equipment_id: EquipmentId::new(equipment_id).map_err(|e| stored("equipment_id", e))?,
        status: OperationalStatus::parse(&status).map_err(|e| stored("status", e))?,
        health_score: HealthScore::new(health as i64).map_err(|e| stored("health_score", e))?,
        telemetry: Telemetry {
            temperature: get(row, "temperature")?,
            vibration: get(row, "vibration")?,
            energy_consumption: get(row, "energy_consumption")?,
        },
        last_used_at: optional_timestamp(row, "last_used_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}
