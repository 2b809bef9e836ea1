//! Mark a single investment to its parent trade's current price.

use crate::domain::{Decimal, Investment, Trade, TradeType, ValidationError, RATIO_DP};
use crate::engine::in_range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvestmentValuation {
    /// Signed price move since the investment, as an 8-digit ratio.
    pub price_change_ratio: Decimal,
    pub leveraged_change: Decimal,
    /// `amount * (1 + leveraged_change)` before rounding; aggregates sum this.
    pub marked_value: Decimal,
    pub current_value: Decimal,
    pub profit_loss: Decimal,
}

/// Value `amount` bought at `price_at_investment` against `current_price`.
///
/// `Ok(None)` when there is no current price yet, or when the entry price is
/// zero and no ratio can be formed. Fails when the marked value leaves the
/// storable range.
pub fn value_investment(
    trade_type: TradeType,
    leverage: u32,
    current_price: Option<Decimal>,
    amount: Decimal,
    price_at_investment: Decimal,
) -> Result<Option<InvestmentValuation>, ValidationError> {
    let current_price = match current_price {
        Some(price) => price,
        None => return Ok(None),
    };
    if price_at_investment.is_zero() {
        return Ok(None);
    }

    let price_change_ratio = in_range(
        trade_type
            .signed_move(price_at_investment, current_price)
            .div_half_up(price_at_investment, RATIO_DP),
        "priceAtInvestment",
    )?;
    let leveraged_change = in_range(
        price_change_ratio.checked_mul(Decimal::from(leverage)),
        "priceAtInvestment",
    )?;
    let marked_value = in_range(
        Decimal::one()
            .checked_add(leveraged_change)
            .and_then(|factor| amount.checked_mul(factor)),
        "amount",
    )?;
    let profit_loss = in_range(marked_value.checked_sub(amount), "amount")?;

    Ok(Some(InvestmentValuation {
        price_change_ratio,
        leveraged_change,
        marked_value,
        current_value: marked_value.round_money(),
        profit_loss: profit_loss.round_money(),
    }))
}

/// Refresh `investment`'s derived fields from its parent `trade`.
///
/// When the trade has no current price the derived fields are cleared.
pub fn revalue(mut investment: Investment, trade: &Trade) -> Result<Investment, ValidationError> {
    let valuation = value_investment(
        trade.trade_type,
        trade.leverage,
        trade.current_price,
        investment.amount,
        investment.price_at_investment,
    )?;
    investment.current_value = valuation.map(|v| v.current_value);
    investment.profit_loss = valuation.map(|v| v.profit_loss);
    Ok(investment)
}
