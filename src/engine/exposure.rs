//! Used and available balance per exchange wallet.

use crate::domain::{Decimal, ExchangeWallet, Trade};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Exposure report for one wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub id: i64,
    pub exchange_name: String,
    pub total_balance: Decimal,
    pub used_balance: Decimal,
    /// `total_balance - used_balance`; negative means the wallet is over-committed.
    pub available_balance: Decimal,
    pub open_trades_count: usize,
    pub notes: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// Compute `wallet`'s exposure from `trades`.
///
/// Only OPEN trades whose exchange matches the wallet name (ignoring case)
/// count; any other trade in the slice is skipped. A missing position size
/// counts as zero.
pub fn wallet_summary(wallet: &ExchangeWallet, trades: &[Trade]) -> WalletSummary {
    let open: Vec<&Trade> = trades
        .iter()
        .filter(|t| t.is_open() && t.is_on_exchange(&wallet.exchange_name))
        .collect();

    let used_balance: Decimal = open
        .iter()
        .map(|t| t.position_size.unwrap_or_default())
        .sum();

    WalletSummary {
        id: wallet.id,
        exchange_name: wallet.exchange_name.clone(),
        total_balance: wallet.total_balance,
        used_balance,
        available_balance: wallet.total_balance - used_balance,
        open_trades_count: open.len(),
        notes: wallet.notes.clone(),
        updated_at: wallet.updated_at,
    }
}

/// Sum of every wallet's total balance, regardless of usage.
pub fn total_balance(wallets: &[ExchangeWallet]) -> Decimal {
    wallets.iter().map(|w| w.total_balance).sum()
}
