//! Keeps a trade's position size equal to the sum of its investments.

use crate::domain::{Decimal, Investment, Trade, ValidationError};
use crate::engine::trade_valuation::recompute;

/// Total amount invested, or `None` when the trade has no investments and
/// entry-price sizing still applies.
pub fn invested_total(investments: &[Investment]) -> Option<Decimal> {
    if investments.is_empty() {
        None
    } else {
        Some(investments.iter().map(|i| i.amount).sum())
    }
}

/// Re-derive `trade`'s position size (and everything that depends on it)
/// from the investments it currently owns.
///
/// Must be re-run after every investment create, update or delete; the
/// result depends only on its inputs, so running it twice is harmless.
pub fn resize(trade: Trade, investments: &[Investment]) -> Result<Trade, ValidationError> {
    debug_assert!(investments.iter().all(|i| i.trade_id == trade.id));
    recompute(trade, invested_total(investments))
}
