//! The mutating contract over the store.
//!
//! Each operation validates its input, runs the pure engine and persists the
//! result. Read-modify-write sequences on a trade and its investments happen
//! inside one store transaction.

pub mod investments;
pub mod trades;
pub mod wallets;

pub use investments::InvestmentService;
pub use trades::TradeService;
pub use wallets::WalletService;

use chrono::{NaiveDate, NaiveDateTime};

/// Wall-clock time in the server's local zone, as stored on records.
pub(crate) fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub(crate) fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
