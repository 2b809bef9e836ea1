//! Pure valuation engine: no I/O, no clock reads.
//!
//! Every function takes a snapshot of records and returns derived values;
//! the service layer decides when to call them and persists the results.

use crate::domain::{Decimal, ValidationError};

pub mod exposure;
pub mod investment_valuation;
pub mod position_aggregator;
pub mod summary;
pub mod trade_valuation;

pub use exposure::{total_balance, wallet_summary, WalletSummary};
pub use investment_valuation::{revalue, value_investment, InvestmentValuation};
pub use position_aggregator::{invested_total, resize};
pub use summary::{
    live_valuation, realized_between, summarize, CloseWindow, LiveValuation, SummaryWindows,
    TradeSummary,
};
pub use trade_valuation::{close, recompute, value_trade, TradeInputs, TradeValuation};

/// Largest magnitude a stored position size, P&L or investment value may
/// reach. Sums over any realistic number of records stay in range.
pub const MAX_VALUATION: i64 = 1_000_000_000_000_000_000;

/// Accept `value` when it was computed without overflow and lies within
/// [`MAX_VALUATION`]; otherwise blame `field`.
pub(crate) fn in_range(
    value: Option<Decimal>,
    field: &'static str,
) -> Result<Decimal, ValidationError> {
    match value {
        Some(v) if v.abs() <= Decimal::from(MAX_VALUATION) => Ok(v),
        _ => Err(ValidationError::new(
            field,
            format!("valuation must stay within {}", MAX_VALUATION),
        )),
    }
}
