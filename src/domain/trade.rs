//! Trade record and its editable draft.

use crate::domain::validation::{
    optional_text, require_non_negative, require_positive, require_positive_opt, require_text,
    ValidationError,
};
use crate::domain::{CloseReason, Coin, Decimal, TradeStatus, TradeType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const MIN_LEVERAGE: u32 = 1;
pub const MAX_LEVERAGE: u32 = 125;
pub const MAX_COIN_LEN: usize = 20;
pub const MAX_EXCHANGE_LEN: usize = 50;

/// One leveraged position in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    /// Store-assigned identifier; `0` until the trade has been inserted.
    pub id: i64,
    pub coin: Coin,
    pub trade_type: TradeType,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub current_price: Option<Decimal>,
    pub quantity: Decimal,
    pub leverage: u32,
    /// Derived: `entry_price * quantity`, or the sum of investments once any exist.
    pub position_size: Option<Decimal>,
    /// Derived: unset until the trade has an exit price.
    pub profit_loss: Option<Decimal>,
    /// Derived: unset until the trade has an exit price and a positive size.
    pub profit_loss_percentage: Option<Decimal>,
    pub fees: Option<Decimal>,
    pub exchange: Option<String>,
    pub status: TradeStatus,
    pub notes: Option<String>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub liquidation_price: Option<Decimal>,
    pub tp_hit: bool,
    pub liquidated: bool,
    pub close_reason: Option<CloseReason>,
    pub trade_date: NaiveDateTime,
    pub close_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Trade {
    /// Build an unsaved trade from a validated draft. Derived fields start unset.
    pub fn from_draft(draft: ValidTradeDraft, now: NaiveDateTime) -> Self {
        let ValidTradeDraft(d) = draft;
        let (tp_hit, liquidated) = d.close_reason.map(|r| r.flags()).unwrap_or((false, false));
        Trade {
            id: 0,
            coin: Coin::new(d.coin),
            trade_type: d.trade_type,
            entry_price: d.entry_price,
            exit_price: d.exit_price,
            current_price: d.current_price,
            quantity: d.quantity,
            leverage: d.leverage,
            position_size: None,
            profit_loss: None,
            profit_loss_percentage: None,
            fees: d.fees,
            exchange: d.exchange,
            status: d.status.unwrap_or_default(),
            notes: d.notes,
            stop_loss: d.stop_loss,
            take_profit: d.take_profit,
            liquidation_price: d.liquidation_price,
            tp_hit,
            liquidated,
            close_reason: d.close_reason,
            trade_date: d.trade_date,
            close_date: d.close_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field with the draft's, keeping identity and
    /// creation time. Derived fields are left for the caller to recompute.
    pub fn apply_draft(self, draft: ValidTradeDraft, now: NaiveDateTime) -> Self {
        Trade {
            id: self.id,
            created_at: self.created_at,
            ..Trade::from_draft(draft, now)
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.status == TradeStatus::Closed
    }

    /// Case-insensitive match against a wallet's exchange name.
    pub fn is_on_exchange(&self, exchange_name: &str) -> bool {
        self.exchange
            .as_deref()
            .map(|e| e.eq_ignore_ascii_case(exchange_name.trim()))
            .unwrap_or(false)
    }
}

/// Caller-supplied trade fields, as received on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDraft {
    pub coin: String,
    pub trade_type: TradeType,
    pub entry_price: Decimal,
    #[serde(default)]
    pub exit_price: Option<Decimal>,
    #[serde(default)]
    pub current_price: Option<Decimal>,
    pub quantity: Decimal,
    pub leverage: u32,
    #[serde(default)]
    pub fees: Option<Decimal>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub status: Option<TradeStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub take_profit: Option<Decimal>,
    #[serde(default)]
    pub liquidation_price: Option<Decimal>,
    #[serde(default)]
    pub tp_hit: bool,
    #[serde(default)]
    pub liquidated: bool,
    #[serde(default)]
    pub close_reason: Option<CloseReason>,
    pub trade_date: NaiveDateTime,
    #[serde(default)]
    pub close_date: Option<NaiveDateTime>,
}

/// A draft that passed [`TradeDraft::validate`], with text fields normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTradeDraft(TradeDraft);

impl TradeDraft {
    /// Check every field constraint and the open/closed invariant.
    ///
    /// The coin symbol is trimmed and upper-cased; a blank exchange becomes `None`.
    pub fn validate(self) -> Result<ValidTradeDraft, ValidationError> {
        let coin = require_text("coin", &self.coin, MAX_COIN_LEN)?.to_uppercase();
        require_positive("entryPrice", self.entry_price)?;
        require_positive_opt("exitPrice", self.exit_price)?;
        require_positive_opt("currentPrice", self.current_price)?;
        require_positive("quantity", self.quantity)?;
        if !(MIN_LEVERAGE..=MAX_LEVERAGE).contains(&self.leverage) {
            return Err(ValidationError::new(
                "leverage",
                format!("must be between {} and {}", MIN_LEVERAGE, MAX_LEVERAGE),
            ));
        }
        if let Some(fees) = self.fees {
            require_non_negative("fees", fees)?;
        }
        let exchange = optional_text("exchange", self.exchange.as_deref(), MAX_EXCHANGE_LEN)?;
        require_positive_opt("stopLoss", self.stop_loss)?;
        require_positive_opt("takeProfit", self.take_profit)?;
        require_positive_opt("liquidationPrice", self.liquidation_price)?;

        let status = self.status.unwrap_or_default();
        match status {
            TradeStatus::Open => {
                if self.exit_price.is_some() {
                    return Err(ValidationError::new("exitPrice", "must be empty while OPEN"));
                }
                if self.close_date.is_some() {
                    return Err(ValidationError::new("closeDate", "must be empty while OPEN"));
                }
                if self.close_reason.is_some() {
                    return Err(ValidationError::new(
                        "closeReason",
                        "must be empty while OPEN",
                    ));
                }
            }
            TradeStatus::Closed => {
                if self.exit_price.is_none() {
                    return Err(ValidationError::new("exitPrice", "is required when CLOSED"));
                }
                if self.close_date.is_none() {
                    return Err(ValidationError::new("closeDate", "is required when CLOSED"));
                }
                if self.close_reason.is_none() {
                    return Err(ValidationError::new(
                        "closeReason",
                        "is required when CLOSED",
                    ));
                }
            }
        }

        if self.tp_hit && self.liquidated {
            return Err(ValidationError::new(
                "liquidated",
                "cannot be set together with tpHit",
            ));
        }
        if self.tp_hit && self.close_reason != Some(CloseReason::TpHit) {
            return Err(ValidationError::new("tpHit", "requires closeReason TP_HIT"));
        }
        if self.liquidated && self.close_reason != Some(CloseReason::Liquidated) {
            return Err(ValidationError::new(
                "liquidated",
                "requires closeReason LIQUIDATED",
            ));
        }

        Ok(ValidTradeDraft(TradeDraft {
            coin,
            exchange,
            status: Some(status),
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            ..self
        }))
    }
}
