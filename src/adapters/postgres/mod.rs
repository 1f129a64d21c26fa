//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresEquipmentRepository` - live status snapshots
//! - `PostgresAlertRepository` - Alerts with conditional resolution
//! - `PostgresBreakdownRepository` - Breakdowns and reorder requests with
//!   compare-and-swap transitions
//!
//! Schema lives in `migrations/` and is applied at startup.

mod alert_repository;
mod breakdown_repository;
mod equipment_repository;
mod rows;

pub use alert_repository::PostgresAlertRepository;
pub use breakdown_repository::PostgresBreakdownRepository;
pub use equipment_repository::PostgresEquipmentRepository;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

/// Opens the pool and applies pending migrations.
pub async fn connect(config: &DatabaseConfig, url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
