//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by record:
//! - `trades.rs` - Trade rows and trade queries
//! - `investments.rs` - Investment rows, always scoped to a parent trade
//! - `wallets.rs` - Exchange wallet rows
//!
//! Each submodule also exposes free functions over `&mut SqliteConnection`
//! so services can run several of them inside one transaction.

pub mod investments;
pub mod trades;
pub mod wallets;

use crate::domain::Decimal;
use sqlx::sqlite::{Sqlite, SqlitePool, SqliteRow};
use sqlx::{Row, Transaction};
use std::str::FromStr;
use tracing::warn;

/// Repository for database operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Start a transaction. Dropping it without `commit` rolls back.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn column_decode_error<E>(row: &SqliteRow, column: &str, raw: &str, err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let id: Option<i64> = row.try_get("id").ok();
    warn!(?id, column, raw, error = %err, "Undecodable column value");
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    }
}

/// Read a TEXT column holding a decimal.
pub(crate) fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).map_err(|e| column_decode_error(row, column, &raw, e))
}

/// Read a nullable TEXT column holding a decimal.
pub(crate) fn optional_decimal_column(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| Decimal::from_str(&s).map_err(|e| column_decode_error(row, column, &s, e)))
        .transpose()
}

/// Read a TEXT column holding one of the journal's enum labels.
pub(crate) fn label_column<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    T::from_str(&raw).map_err(|e| column_decode_error(row, column, &raw, e))
}

pub(crate) fn optional_label_column<T>(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<T>, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| T::from_str(&s).map_err(|e| column_decode_error(row, column, &s, e)))
        .transpose()
}

pub(crate) fn canonical(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_canonical_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use tempfile::TempDir;

    pub(crate) async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path, 2).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_decimal_column_rejects_garbage() {
        let (repo, _temp) = setup_test_db().await;
        let row = sqlx::query("SELECT 1 AS id, 'abc' AS amount, NULL AS fee")
            .fetch_one(repo.pool())
            .await
            .unwrap();

        assert!(matches!(
            decimal_column(&row, "amount"),
            Err(sqlx::Error::ColumnDecode { .. })
        ));
        assert_eq!(optional_decimal_column(&row, "fee").unwrap(), None);
    }

    #[tokio::test]
    async fn test_label_column_parses_enum() {
        use crate::domain::TradeType;

        let (repo, _temp) = setup_test_db().await;
        let row = sqlx::query("SELECT 'SHORT' AS trade_type, 'SIDEWAYS' AS other")
            .fetch_one(repo.pool())
            .await
            .unwrap();

        let parsed: TradeType = label_column(&row, "trade_type").unwrap();
        assert_eq!(parsed, TradeType::Short);
        assert!(label_column::<TradeType>(&row, "other").is_err());
    }
}
