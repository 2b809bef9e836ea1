//! Portfolio-wide statistics over the full trade set.

use crate::domain::{Decimal, Trade, MONEY_DP, RATE_DP};
use crate::engine::investment_valuation::value_investment;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::warn;

/// An inclusive `[start, end]` interval of close dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl CloseWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// From the first instant of `first` to the last instant of `last`.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: start_of_day(first),
            end: end_of_day(last),
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::days(1) - Duration::nanoseconds(1)
}

/// The three reporting windows, resolved by the caller for a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryWindows {
    pub today: CloseWindow,
    /// Seven days back from the start of `today` through the end of today.
    pub week: CloseWindow,
    /// First day of the month through the end of today.
    pub month: CloseWindow,
}

impl SummaryWindows {
    pub fn ending_on(today: NaiveDate) -> Self {
        let month_start = today.with_day(1).unwrap_or(today);
        Self {
            today: CloseWindow::days(today, today),
            week: CloseWindow::days(today - Duration::days(7), today),
            month: CloseWindow::days(month_start, today),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSummary {
    pub total_profit_loss: Decimal,
    pub today_profit_loss: Decimal,
    pub week_profit_loss: Decimal,
    pub month_profit_loss: Decimal,

    pub total_invested: Decimal,
    pub current_portfolio_value: Decimal,
    #[serde(rename = "unrealizedPnL")]
    pub unrealized_pnl: Decimal,
    #[serde(rename = "realizedPnL")]
    pub realized_pnl: Decimal,

    pub total_trades: u64,
    pub open_trades: u64,
    pub closed_trades: u64,
    pub winning_trades: u64,
    pub losing_trades: u64,

    pub win_rate: Decimal,
    pub average_profit: Decimal,
    pub average_loss: Decimal,
}

/// Mark-to-current-price value of an open trade, unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveValuation {
    pub current_value: Decimal,
    pub profit_loss: Decimal,
}

/// Value an open trade at its current price (entry price when none is set).
///
/// Independent of the stored profit/loss. A trade without a usable entry
/// price, or whose mark leaves the storable range, contributes its raw
/// position size and no P&L.
pub fn live_valuation(trade: &Trade) -> LiveValuation {
    let position_size = trade.position_size.unwrap_or_default();
    let raw = LiveValuation {
        current_value: position_size,
        profit_loss: Decimal::zero(),
    };
    if !trade.entry_price.is_positive() {
        return raw;
    }

    let current_price = trade.current_price.unwrap_or(trade.entry_price);
    match value_investment(
        trade.trade_type,
        trade.leverage.max(1),
        Some(current_price),
        position_size,
        trade.entry_price,
    ) {
        Ok(Some(v)) => LiveValuation {
            current_value: v.marked_value,
            profit_loss: v.marked_value - position_size,
        },
        Ok(None) => raw,
        Err(err) => {
            warn!(trade_id = trade.id, error = %err, "Live valuation out of range");
            raw
        }
    }
}

/// Realized profit/loss of closed trades whose close date falls in `window`.
///
/// Trades without a close date never match.
pub fn realized_between(trades: &[Trade], window: CloseWindow) -> Decimal {
    closed(trades)
        .filter(|t| t.close_date.map(|at| window.contains(at)).unwrap_or(false))
        .map(realized)
        .sum()
}

fn closed(trades: &[Trade]) -> impl Iterator<Item = &Trade> {
    trades.iter().filter(|t| t.is_closed())
}

fn realized(trade: &Trade) -> Decimal {
    trade.profit_loss.unwrap_or_default()
}

/// Mean rounded to the currency scale; zero for an empty slice.
fn mean(values: &[Decimal]) -> Decimal {
    let total: Decimal = values.iter().sum();
    total
        .div_half_up(Decimal::from(values.len() as i64), MONEY_DP)
        .unwrap_or_default()
}

/// Aggregate `trades` into a portfolio summary.
pub fn summarize(trades: &[Trade], windows: &SummaryWindows) -> TradeSummary {
    let realized_pnl: Decimal = closed(trades).map(realized).sum();
    let total_invested: Decimal = trades
        .iter()
        .map(|t| t.position_size.unwrap_or_default())
        .sum();

    let mut open_trades = 0u64;
    let mut open_value = Decimal::zero();
    let mut unrealized_pnl = Decimal::zero();
    for trade in trades.iter().filter(|t| t.is_open()) {
        let live = live_valuation(trade);
        open_trades += 1;
        open_value = open_value + live.current_value;
        unrealized_pnl = unrealized_pnl + live.profit_loss;
    }

    let profits: Vec<Decimal> = closed(trades)
        .filter_map(|t| t.profit_loss)
        .filter(|p| p.is_positive())
        .collect();
    let losses: Vec<Decimal> = closed(trades)
        .filter_map(|t| t.profit_loss)
        .filter(|p| p.is_negative())
        .collect();
    let closed_trades = closed(trades).count() as u64;
    let winning_trades = profits.len() as u64;

    let win_rate = Decimal::from(winning_trades as i64)
        .div_half_up(Decimal::from(closed_trades as i64), RATE_DP)
        .map(|ratio| (ratio * Decimal::hundred()).round_money())
        .unwrap_or_default();

    // Marks are summed at full precision and rounded once.
    TradeSummary {
        total_profit_loss: realized_pnl,
        today_profit_loss: realized_between(trades, windows.today),
        week_profit_loss: realized_between(trades, windows.week),
        month_profit_loss: realized_between(trades, windows.month),
        total_invested,
        current_portfolio_value: (open_value + realized_pnl).round_money(),
        unrealized_pnl: unrealized_pnl.round_money(),
        realized_pnl,
        total_trades: trades.len() as u64,
        open_trades,
        closed_trades,
        winning_trades,
        losing_trades: losses.len() as u64,
        win_rate,
        average_profit: mean(&profits),
        average_loss: mean(&losses),
    }
}
