//! SQLite record store for trades, investments and exchange wallets.
//!
//! This module provides:
//! - Database initialization, migrations and pragma configuration
//! - The `Repository` and per-record connection-level operations

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
