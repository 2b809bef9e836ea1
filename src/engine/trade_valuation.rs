//! Position size, profit/loss and percentage return for a single trade.

use crate::domain::{
    CloseReason, Decimal, Trade, TradeStatus, TradeType, ValidationError, RATIO_DP,
};
use crate::engine::in_range;
use chrono::NaiveDateTime;
use tracing::debug;

/// Derived fields of one trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeValuation {
    pub position_size: Decimal,
    /// `None` while the trade has no exit price.
    pub profit_loss: Option<Decimal>,
    /// `None` while profit/loss is unset or the position size is zero.
    pub profit_loss_percentage: Option<Decimal>,
}

/// Inputs to [`value_trade`], borrowed from a trade record.
#[derive(Debug, Clone, Copy)]
pub struct TradeInputs {
    pub trade_type: TradeType,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub quantity: Decimal,
    pub leverage: u32,
    pub fees: Option<Decimal>,
}

impl From<&Trade> for TradeInputs {
    fn from(trade: &Trade) -> Self {
        TradeInputs {
            trade_type: trade.trade_type,
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            quantity: trade.quantity,
            leverage: trade.leverage,
            fees: trade.fees,
        }
    }
}

/// Value a trade.
///
/// `invested` is the sum of the trade's investments when it has any; it
/// replaces `entry_price * quantity` as the position size. Fails, naming
/// the input to blame, when a derived value leaves the storable range.
pub fn value_trade(
    inputs: TradeInputs,
    invested: Option<Decimal>,
) -> Result<TradeValuation, ValidationError> {
    let position_size = match invested {
        Some(total) => in_range(Some(total), "amount")?,
        None => in_range(inputs.entry_price.checked_mul(inputs.quantity), "quantity")?,
    }
    .round_money();

    let profit_loss = match inputs.exit_price {
        Some(exit) => {
            let price_diff = inputs.trade_type.signed_move(inputs.entry_price, exit);
            let raw = price_diff
                .checked_mul(inputs.quantity)
                .and_then(|v| v.checked_mul(Decimal::from(inputs.leverage)));
            let net = match inputs.fees {
                Some(fees) => raw.and_then(|r| r.checked_sub(fees)),
                None => raw,
            };
            Some(in_range(net, "quantity")?.round_money())
        }
        None => None,
    };

    let profit_loss_percentage = match profit_loss {
        Some(pnl) if position_size.is_positive() => pnl.percent_of(position_size, RATIO_DP),
        _ => None,
    };

    Ok(TradeValuation {
        position_size,
        profit_loss,
        profit_loss_percentage,
    })
}

/// Re-derive every computed field of `trade` from its current inputs.
///
/// Called by each mutating operation before the record reaches the store.
/// Idempotent: a second call on the result changes nothing.
pub fn recompute(mut trade: Trade, invested: Option<Decimal>) -> Result<Trade, ValidationError> {
    let valuation = value_trade(TradeInputs::from(&trade), invested)?;
    debug!(
        trade_id = trade.id,
        position_size = %valuation.position_size,
        profit_loss = ?valuation.profit_loss.map(|p| p.to_string()),
        "recomputed trade valuation"
    );
    trade.position_size = Some(valuation.position_size);
    trade.profit_loss = valuation.profit_loss;
    trade.profit_loss_percentage = valuation.profit_loss_percentage;
    Ok(trade)
}

/// Close `trade` at `exit_price`, record why and when, and recompute.
///
/// Closing an already closed trade overwrites the previous close fields.
pub fn close(
    mut trade: Trade,
    exit_price: Decimal,
    reason: CloseReason,
    at: NaiveDateTime,
    invested: Option<Decimal>,
) -> Result<Trade, ValidationError> {
    let (tp_hit, liquidated) = reason.flags();
    trade.exit_price = Some(exit_price);
    trade.status = TradeStatus::Closed;
    trade.close_date = Some(at);
    trade.close_reason = Some(reason);
    trade.tp_hit = tp_hit;
    trade.liquidated = liquidated;
    trade.updated_at = at;
    recompute(trade, invested)
}
