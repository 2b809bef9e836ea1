//! Domain types for the trade journal.
//!
//! This module provides:
//! - Fixed-point money handling via the Decimal wrapper
//! - Primitives: Coin, TradeType, TradeStatus, CloseReason
//! - Trade, Investment and ExchangeWallet records with validated drafts

pub mod decimal;
pub mod investment;
pub mod primitives;
pub mod trade;
pub mod validation;
pub mod wallet;

pub use decimal::{Decimal, MONEY_DP, RATE_DP, RATIO_DP};
pub use investment::{Investment, InvestmentDraft, ValidInvestmentDraft};
pub use primitives::{CloseReason, Coin, TradeStatus, TradeType, UnknownVariant};
pub use trade::{Trade, TradeDraft, ValidTradeDraft};
pub use validation::{ValidationError, MAX_AMOUNT};
pub use wallet::{ExchangeWallet, ValidWalletDraft, WalletDraft};
