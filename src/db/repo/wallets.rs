//! Exchange wallet persistence.

use super::{decimal_column, Repository};
use crate::domain::{Decimal, ExchangeWallet};
use crate::engine::total_balance;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

const WALLET_COLUMNS: &str = "id, exchange_name, total_balance, notes, created_at, updated_at";

fn wallet_from_row(row: &SqliteRow) -> Result<ExchangeWallet, sqlx::Error> {
    Ok(ExchangeWallet {
        id: row.try_get("id")?,
        exchange_name: row.try_get("exchange_name")?,
        total_balance: decimal_column(row, "total_balance")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn fetch_wallet(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<ExchangeWallet>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {WALLET_COLUMNS} FROM exchange_wallets WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(wallet_from_row).transpose()
}

/// True if some wallet other than `excluding` already uses `exchange_name`,
/// compared without regard to case.
pub async fn exchange_name_taken(
    conn: &mut SqliteConnection,
    exchange_name: &str,
    excluding: Option<i64>,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS n
        FROM exchange_wallets
        WHERE exchange_name = ? COLLATE NOCASE AND id <> ?
        "#,
    )
    .bind(exchange_name.trim())
    .bind(excluding.unwrap_or(0))
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.try_get::<i64, _>("n")? > 0)
}

pub async fn insert_wallet(
    conn: &mut SqliteConnection,
    wallet: &ExchangeWallet,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO exchange_wallets (exchange_name, total_balance, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(wallet.exchange_name.as_str())
    .bind(wallet.total_balance.to_canonical_string())
    .bind(wallet.notes.as_deref())
    .bind(wallet.created_at)
    .bind(wallet.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn update_wallet(
    conn: &mut SqliteConnection,
    wallet: &ExchangeWallet,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE exchange_wallets
        SET exchange_name = ?, total_balance = ?, notes = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(wallet.exchange_name.as_str())
    .bind(wallet.total_balance.to_canonical_string())
    .bind(wallet.notes.as_deref())
    .bind(wallet.updated_at)
    .bind(wallet.id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

impl Repository {
    pub async fn get_wallet(&self, id: i64) -> Result<Option<ExchangeWallet>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_wallet(&mut conn, id).await
    }

    /// All wallets, alphabetical by exchange name.
    pub async fn list_wallets(&self) -> Result<Vec<ExchangeWallet>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {WALLET_COLUMNS} FROM exchange_wallets ORDER BY exchange_name COLLATE NOCASE ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(wallet_from_row).collect()
    }

    /// Look a wallet up by exchange name, ignoring case.
    pub async fn wallet_by_exchange_name(
        &self,
        exchange_name: &str,
    ) -> Result<Option<ExchangeWallet>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {WALLET_COLUMNS} FROM exchange_wallets WHERE exchange_name = ? COLLATE NOCASE"
        ))
        .bind(exchange_name.trim())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(wallet_from_row).transpose()
    }

    /// Sum of every wallet's total balance; zero when there are none.
    pub async fn total_wallet_balance(&self) -> Result<Decimal, sqlx::Error> {
        let wallets = self.list_wallets().await?;
        Ok(total_balance(&wallets))
    }

    /// Delete a wallet. Trades naming its exchange are left untouched.
    pub async fn delete_wallet(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM exchange_wallets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
