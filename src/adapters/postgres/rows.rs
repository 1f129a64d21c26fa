//! Row decoding helpers shared by the PostgreSQL repositories.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId, ValidationError};

pub(super) fn db_error(context: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

pub(super) fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| db_error(&format!("Failed to get {}", column), e))
}

pub(super) fn timestamp(row: &PgRow, column: &str) -> Result<Timestamp, DomainError> {
    let value: DateTime<Utc> = get(row, column)?;
    Ok(Timestamp::from_datetime(value))
}

pub(super) fn optional_timestamp(row: &PgRow, column: &str) -> Result<Option<Timestamp>, DomainError> {
    let value: Option<DateTime<Utc>> = get(row, column)?;
    Ok(value.map(Timestamp::from_datetime))
}

pub(super) fn optional_user(row: &PgRow, column: &str) -> Result<Option<UserId>, DomainError> {
    let value: Option<String> = get(row, column)?;
    value.map(UserId::new).transpose().map_err(|e| stored(column, e))
}

/// A stored value that no longer passes domain validation.
pub(super) fn stored(column: &str, e: ValidationError) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid stored {}: {}", column, e),
    )
}
