//! Domain primitives: Coin, TradeType, TradeStatus, CloseReason.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Coin/asset symbol (e.g., "BTC", "ETH").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Coin(pub String);

impl Coin {
    /// Create a Coin from a string.
    pub fn new(coin: String) -> Self {
        Coin(coin)
    }

    /// Get the coin as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned when a stored or requested enum label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Direction of a leveraged position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    /// Profits when the price rises.
    Long,
    /// Profits when the price falls.
    Short,
}

impl TradeType {
    /// Price movement from `from` to `to`, signed so that a positive result
    /// is always a gain for this direction.
    ///
    /// Every valuation site goes through here; do not inline the subtraction.
    pub fn signed_move(&self, from: Decimal, to: Decimal) -> Decimal {
        match self {
            TradeType::Long => to - from,
            TradeType::Short => from - to,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Long => "LONG",
            TradeType::Short => "SHORT",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" => Ok(TradeType::Long),
            "SHORT" => Ok(TradeType::Short),
            _ => Err(UnknownVariant {
                kind: "trade type",
                value: s.to_string(),
            }),
        }
    }
}

/// Whether a trade is still running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    #[default]
    Open,
    Closed,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "OPEN",
            TradeStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(TradeStatus::Open),
            "CLOSED" => Ok(TradeStatus::Closed),
            _ => Err(UnknownVariant {
                kind: "trade status",
                value: s.to_string(),
            }),
        }
    }
}

/// How a trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloseReason {
    /// Take profit was hit.
    TpHit,
    /// Position was liquidated.
    Liquidated,
    /// Closed by hand at a chosen price.
    Manual,
}

impl CloseReason {
    /// The `(tp_hit, liquidated)` flag pair this reason implies.
    pub fn flags(&self) -> (bool, bool) {
        match self {
            CloseReason::TpHit => (true, false),
            CloseReason::Liquidated => (false, true),
            CloseReason::Manual => (false, false),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::TpHit => "TP_HIT",
            CloseReason::Liquidated => "LIQUIDATED",
            CloseReason::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloseReason {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TP_HIT" => Ok(CloseReason::TpHit),
            "LIQUIDATED" => Ok(CloseReason::Liquidated),
            "MANUAL" => Ok(CloseReason::Manual),
            _ => Err(UnknownVariant {
                kind: "close reason",
                value: s.to_string(),
            }),
        }
    }
}
