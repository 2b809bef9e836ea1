//! Trade persistence and trade queries.

use super::{
    canonical, decimal_column, label_column, optional_decimal_column, optional_label_column,
    Repository,
};
use crate::domain::{Coin, Trade, TradeStatus, TradeType};
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

const TRADE_COLUMNS: &str = "id, coin, trade_type, entry_price, exit_price, current_price, \
     quantity, leverage, position_size, profit_loss, profit_loss_pct, fees, exchange, status, \
     notes, stop_loss, take_profit, liquidation_price, tp_hit, liquidated, close_reason, \
     trade_date, close_date, created_at, updated_at";

/// Newest first; ties broken by id so listings are stable.
const NEWEST_FIRST: &str = "ORDER BY trade_date DESC, id DESC";

pub(crate) fn trade_from_row(row: &SqliteRow) -> Result<Trade, sqlx::Error> {
    let leverage: i64 = row.try_get("leverage")?;
    let leverage = u32::try_from(leverage).map_err(|e| sqlx::Error::ColumnDecode {
        index: "leverage".to_string(),
        source: Box::new(e),
    })?;

    Ok(Trade {
        id: row.try_get("id")?,
        coin: Coin::new(row.try_get("coin")?),
        trade_type: label_column(row, "trade_type")?,
        entry_price: decimal_column(row, "entry_price")?,
        exit_price: optional_decimal_column(row, "exit_price")?,
        current_price: optional_decimal_column(row, "current_price")?,
        quantity: decimal_column(row, "quantity")?,
        leverage,
        position_size: optional_decimal_column(row, "position_size")?,
        profit_loss: optional_decimal_column(row, "profit_loss")?,
        profit_loss_percentage: optional_decimal_column(row, "profit_loss_pct")?,
        fees: optional_decimal_column(row, "fees")?,
        exchange: row.try_get("exchange")?,
        status: label_column(row, "status")?,
        notes: row.try_get("notes")?,
        stop_loss: optional_decimal_column(row, "stop_loss")?,
        take_profit: optional_decimal_column(row, "take_profit")?,
        liquidation_price: optional_decimal_column(row, "liquidation_price")?,
        tp_hit: row.try_get("tp_hit")?,
        liquidated: row.try_get("liquidated")?,
        close_reason: optional_label_column(row, "close_reason")?,
        trade_date: row.try_get("trade_date")?,
        close_date: row.try_get("close_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn trades_from_rows(rows: &[SqliteRow]) -> Result<Vec<Trade>, sqlx::Error> {
    rows.iter().map(trade_from_row).collect()
}

/// Insert a new trade and return its assigned id. `trade.id` is ignored.
pub async fn insert_trade(conn: &mut SqliteConnection, trade: &Trade) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO trades (
            coin, trade_type, entry_price, exit_price, current_price, quantity, leverage,
            position_size, profit_loss, profit_loss_pct, fees, exchange, status, notes,
            stop_loss, take_profit, liquidation_price, tp_hit, liquidated, close_reason,
            trade_date, close_date, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(trade.coin.as_str())
    .bind(trade.trade_type.as_str())
    .bind(trade.entry_price.to_canonical_string())
    .bind(canonical(trade.exit_price))
    .bind(canonical(trade.current_price))
    .bind(trade.quantity.to_canonical_string())
    .bind(i64::from(trade.leverage))
    .bind(canonical(trade.position_size))
    .bind(canonical(trade.profit_loss))
    .bind(canonical(trade.profit_loss_percentage))
    .bind(canonical(trade.fees))
    .bind(trade.exchange.as_deref())
    .bind(trade.status.as_str())
    .bind(trade.notes.as_deref())
    .bind(canonical(trade.stop_loss))
    .bind(canonical(trade.take_profit))
    .bind(canonical(trade.liquidation_price))
    .bind(trade.tp_hit)
    .bind(trade.liquidated)
    .bind(trade.close_reason.map(|r| r.as_str()))
    .bind(trade.trade_date)
    .bind(trade.close_date)
    .bind(trade.created_at)
    .bind(trade.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Overwrite every column of an existing trade except `created_at`.
///
/// Returns false if no trade has `trade.id`.
pub async fn update_trade(conn: &mut SqliteConnection, trade: &Trade) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE trades SET
            coin = ?, trade_type = ?, entry_price = ?, exit_price = ?, current_price = ?,
            quantity = ?, leverage = ?, position_size = ?, profit_loss = ?, profit_loss_pct = ?,
            fees = ?, exchange = ?, status = ?, notes = ?, stop_loss = ?, take_profit = ?,
            liquidation_price = ?, tp_hit = ?, liquidated = ?, close_reason = ?,
            trade_date = ?, close_date = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(trade.coin.as_str())
    .bind(trade.trade_type.as_str())
    .bind(trade.entry_price.to_canonical_string())
    .bind(canonical(trade.exit_price))
    .bind(canonical(trade.current_price))
    .bind(trade.quantity.to_canonical_string())
    .bind(i64::from(trade.leverage))
    .bind(canonical(trade.position_size))
    .bind(canonical(trade.profit_loss))
    .bind(canonical(trade.profit_loss_percentage))
    .bind(canonical(trade.fees))
    .bind(trade.exchange.as_deref())
    .bind(trade.status.as_str())
    .bind(trade.notes.as_deref())
    .bind(canonical(trade.stop_loss))
    .bind(canonical(trade.take_profit))
    .bind(canonical(trade.liquidation_price))
    .bind(trade.tp_hit)
    .bind(trade.liquidated)
    .bind(trade.close_reason.map(|r| r.as_str()))
    .bind(trade.trade_date)
    .bind(trade.close_date)
    .bind(trade.updated_at)
    .bind(trade.id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn fetch_trade(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Trade>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {TRADE_COLUMNS} FROM trades WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(trade_from_row).transpose()
}

/// Delete a trade. Its investments go with it via `ON DELETE CASCADE`.
pub async fn delete_trade(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM trades WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

impl Repository {
    /// Insert a trade outside any caller transaction.
    pub async fn insert_trade(&self, trade: &Trade) -> Result<i64, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        insert_trade(&mut conn, trade).await
    }

    pub async fn get_trade(&self, id: i64) -> Result<Option<Trade>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_trade(&mut conn, id).await
    }

    /// All trades, newest trade date first.
    pub async fn list_trades(&self) -> Result<Vec<Trade>, sqlx::Error> {
        let rows = sqlx::query(&format!("SELECT {TRADE_COLUMNS} FROM trades {NEWEST_FIRST}"))
            .fetch_all(&self.pool)
            .await?;
        trades_from_rows(&rows)
    }

    /// Trades for one coin, matched without regard to case.
    pub async fn trades_by_coin(&self, coin: &str) -> Result<Vec<Trade>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE coin = ? COLLATE NOCASE {NEWEST_FIRST}"
        ))
        .bind(coin.trim())
        .fetch_all(&self.pool)
        .await?;
        trades_from_rows(&rows)
    }

    pub async fn trades_by_status(&self, status: TradeStatus) -> Result<Vec<Trade>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE status = ? {NEWEST_FIRST}"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        trades_from_rows(&rows)
    }

    pub async fn trades_by_type(&self, trade_type: TradeType) -> Result<Vec<Trade>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE trade_type = ? {NEWEST_FIRST}"
        ))
        .bind(trade_type.as_str())
        .fetch_all(&self.pool)
        .await?;
        trades_from_rows(&rows)
    }

    /// Trades on `exchange` (ignoring case) with the given status.
    pub async fn trades_by_exchange_and_status(
        &self,
        exchange: &str,
        status: TradeStatus,
    ) -> Result<Vec<Trade>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades \
             WHERE exchange = ? COLLATE NOCASE AND status = ? {NEWEST_FIRST}"
        ))
        .bind(exchange.trim())
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        trades_from_rows(&rows)
    }

    /// Trades whose trade date falls in `[start, end]`, both ends inclusive.
    pub async fn trades_opened_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Trade>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades \
             WHERE trade_date >= ? AND trade_date <= ? {NEWEST_FIRST}"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        trades_from_rows(&rows)
    }

    /// CLOSED trades whose close date falls in `[start, end]`, both ends inclusive.
    pub async fn trades_closed_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Trade>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades \
             WHERE status = 'CLOSED' AND close_date >= ? AND close_date <= ? \
             ORDER BY close_date DESC, id DESC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        trades_from_rows(&rows)
    }

    /// Distinct coin symbols, alphabetical.
    pub async fn distinct_coins(&self) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query("SELECT DISTINCT coin FROM trades ORDER BY coin ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|row| row.try_get("coin")).collect()
    }

    /// Distinct non-empty exchange names, alphabetical. Names differing only
    /// in case are reported once.
    pub async fn distinct_exchanges(&self) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT MIN(exchange) AS exchange
            FROM trades
            WHERE exchange IS NOT NULL AND exchange <> ''
            GROUP BY exchange COLLATE NOCASE
            ORDER BY exchange COLLATE NOCASE ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(|row| row.try_get("exchange")).collect()
    }
}
