//! Journal database bootstrap: pool, per-connection pragmas, schema.

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = include_str!("schema.sql");

/// Pragmas applied to every pooled connection. `foreign_keys` is what makes
/// deleting a trade cascade to its investments.
const CONNECTION_PRAGMAS: &[&str] = &[
    "PRAGMA foreign_keys = ON",
    "PRAGMA busy_timeout = 5000",
    "PRAGMA synchronous = NORMAL",
];

/// Open (creating if needed) the journal database at `db_path` and bring its
/// schema up to date.
pub async fn init_db(db_path: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .after_connect(|conn, _meta| Box::pin(async move { prepare_connection(conn).await }))
        .connect_with(options)
        .await?;

    apply_schema(&pool).await?;

    info!(path = %db_path, max_connections, "Journal database ready");
    Ok(pool)
}

/// Statements of `schema`, split on `;`, blanks dropped.
fn schema_statements(schema: &str) -> impl Iterator<Item = &str> {
    schema.split(';').map(str::trim).filter(|s| !s.is_empty())
}

/// Apply every schema statement in one transaction. All statements are
/// `IF NOT EXISTS`, so reapplying is a no-op.
async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut applied = 0usize;
    for statement in schema_statements(SCHEMA) {
        sqlx::query(statement).execute(&mut *tx).await?;
        applied += 1;
    }
    tx.commit().await?;

    debug!(statements = applied, "Journal schema applied");
    Ok(())
}

async fn prepare_connection(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    for pragma in CONNECTION_PRAGMAS {
        sqlx::query(pragma).execute(&mut *conn).await?;
    }

    // SQLite may refuse WAL (e.g. some network filesystems) and report the mode it kept.
    let journal_mode: String = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?
        .get(0);
    debug!(%journal_mode, "Journal connection prepared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_temp() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("journal.db");
        let pool = init_db(db_path.to_str().unwrap(), 2)
            .await
            .expect("init_db failed");
        (pool, temp_dir)
    }

    #[test]
    fn test_schema_statements_skip_blanks() {
        let statements: Vec<&str> =
            schema_statements("CREATE TABLE a (x);\n\n ; CREATE INDEX i ON a (x);\n").collect();
        assert_eq!(statements, vec!["CREATE TABLE a (x)", "CREATE INDEX i ON a (x)"]);
    }

    #[tokio::test]
    async fn test_init_db_creates_nested_path() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("data").join("journal.db");

        let pool = init_db(db_path.to_str().unwrap(), 1)
            .await
            .expect("init_db failed");
        assert!(db_path.exists());

        let one: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(one.0, 1);
    }

    #[tokio::test]
    async fn test_schema_creates_journal_tables() {
        let (pool, _dir) = open_temp().await;

        for table in ["trades", "investments", "exchange_wallets"] {
            let found: (String,) =
                sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
                    .bind(table)
                    .fetch_one(&pool)
                    .await
                    .expect("table missing");
            assert_eq!(found.0, table);
        }
    }

    #[tokio::test]
    async fn test_wallet_names_unique_ignoring_case() {
        let (pool, _dir) = open_temp().await;

        let insert = "INSERT INTO exchange_wallets (exchange_name, total_balance, created_at, updated_at) \
                      VALUES (?, '100', '2024-01-01 00:00:00', '2024-01-01 00:00:00')";
        sqlx::query(insert)
            .bind("Binance")
            .execute(&pool)
            .await
            .expect("first insert failed");
        let duplicate = sqlx::query(insert).bind("BINANCE").execute(&pool).await;
        assert!(duplicate.is_err());
    }

    async fn table_count(pool: &SqlitePool) -> i64 {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table'")
            .fetch_one(pool)
            .await
            .unwrap();
        row.0
    }

    #[tokio::test]
    async fn test_reapplying_schema_keeps_table_count() {
        let (pool, _dir) = open_temp().await;

        let before = table_count(&pool).await;
        apply_schema(&pool).await.expect("reapply failed");
        assert_eq!(table_count(&pool).await, before);
    }

    #[tokio::test]
    async fn test_connection_pragmas() {
        let (pool, _dir) = open_temp().await;

        let foreign_keys: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(foreign_keys.0, 1);

        let busy_timeout: (i64,) = sqlx::query_as("PRAGMA busy_timeout")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(busy_timeout.0, 5000);

        let journal_mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(
            matches!(journal_mode.0.as_str(), "wal" | "delete"),
            "unexpected journal_mode: {}",
            journal_mode.0
        );
    }
}
