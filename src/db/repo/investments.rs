//! Investment persistence. Every read is scoped to a parent trade.

use super::{canonical, decimal_column, optional_decimal_column, Repository};
use crate::domain::{Decimal, Investment};
use crate::engine::invested_total;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

const INVESTMENT_COLUMNS: &str = "id, trade_id, amount, price_at_investment, current_value, \
     profit_loss, notes, investment_date, created_at";

fn investment_from_row(row: &SqliteRow) -> Result<Investment, sqlx::Error> {
    Ok(Investment {
        id: row.try_get("id")?,
        trade_id: row.try_get("trade_id")?,
        amount: decimal_column(row, "amount")?,
        price_at_investment: decimal_column(row, "price_at_investment")?,
        current_value: optional_decimal_column(row, "current_value")?,
        profit_loss: optional_decimal_column(row, "profit_loss")?,
        notes: row.try_get("notes")?,
        investment_date: row.try_get("investment_date")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert an investment and return its id. Fails if the parent trade is gone.
pub async fn insert_investment(
    conn: &mut SqliteConnection,
    investment: &Investment,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO investments (
            trade_id, amount, price_at_investment, current_value, profit_loss, notes,
            investment_date, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(investment.trade_id)
    .bind(investment.amount.to_canonical_string())
    .bind(investment.price_at_investment.to_canonical_string())
    .bind(canonical(investment.current_value))
    .bind(canonical(investment.profit_loss))
    .bind(investment.notes.as_deref())
    .bind(investment.investment_date)
    .bind(investment.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Rewrite an investment's editable and derived columns. The parent trade
/// and creation time never change.
pub async fn update_investment(
    conn: &mut SqliteConnection,
    investment: &Investment,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE investments SET
            amount = ?, price_at_investment = ?, current_value = ?, profit_loss = ?,
            notes = ?, investment_date = ?
        WHERE id = ? AND trade_id = ?
        "#,
    )
    .bind(investment.amount.to_canonical_string())
    .bind(investment.price_at_investment.to_canonical_string())
    .bind(canonical(investment.current_value))
    .bind(canonical(investment.profit_loss))
    .bind(investment.notes.as_deref())
    .bind(investment.investment_date)
    .bind(investment.id)
    .bind(investment.trade_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch one investment, but only if it belongs to `trade_id`.
pub async fn fetch_investment(
    conn: &mut SqliteConnection,
    trade_id: i64,
    investment_id: i64,
) -> Result<Option<Investment>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {INVESTMENT_COLUMNS} FROM investments WHERE id = ? AND trade_id = ?"
    ))
    .bind(investment_id)
    .bind(trade_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(investment_from_row).transpose()
}

/// A trade's investments, newest investment date first.
pub async fn investments_for_trade(
    conn: &mut SqliteConnection,
    trade_id: i64,
) -> Result<Vec<Investment>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {INVESTMENT_COLUMNS} FROM investments WHERE trade_id = ? \
         ORDER BY investment_date DESC, id DESC"
    ))
    .bind(trade_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(investment_from_row).collect()
}

pub async fn delete_investment(
    conn: &mut SqliteConnection,
    trade_id: i64,
    investment_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM investments WHERE id = ? AND trade_id = ?")
        .bind(investment_id)
        .bind(trade_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove every investment of a trade; returns how many were removed.
pub async fn delete_investments_for_trade(
    conn: &mut SqliteConnection,
    trade_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM investments WHERE trade_id = ?")
        .bind(trade_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

impl Repository {
    pub async fn get_investment(
        &self,
        trade_id: i64,
        investment_id: i64,
    ) -> Result<Option<Investment>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_investment(&mut conn, trade_id, investment_id).await
    }

    pub async fn list_investments(&self, trade_id: i64) -> Result<Vec<Investment>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        investments_for_trade(&mut conn, trade_id).await
    }

    /// Sum of a trade's investment amounts; zero when it has none.
    pub async fn total_invested(&self, trade_id: i64) -> Result<Decimal, sqlx::Error> {
        let investments = self.list_investments(trade_id).await?;
        Ok(invested_total(&investments).unwrap_or_default())
    }
}
