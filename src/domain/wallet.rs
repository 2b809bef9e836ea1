//! Per-exchange capital ledger.

use crate::domain::validation::{require_non_negative, require_text, ValidationError};
use crate::domain::Decimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const MAX_EXCHANGE_NAME_LEN: usize = 50;

/// Capital held on one exchange.
///
/// Trades reference a wallet only through a case-insensitive exchange name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeWallet {
    pub id: i64,
    pub exchange_name: String,
    pub total_balance: Decimal,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ExchangeWallet {
    pub fn from_draft(draft: ValidWalletDraft, now: NaiveDateTime) -> Self {
        let ValidWalletDraft(d) = draft;
        ExchangeWallet {
            id: 0,
            exchange_name: d.exchange_name,
            total_balance: d.total_balance,
            notes: d.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_draft(self, draft: ValidWalletDraft, now: NaiveDateTime) -> Self {
        ExchangeWallet {
            id: self.id,
            created_at: self.created_at,
            ..ExchangeWallet::from_draft(draft, now)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDraft {
    pub exchange_name: String,
    pub total_balance: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidWalletDraft(WalletDraft);

impl ValidWalletDraft {
    pub fn exchange_name(&self) -> &str {
        &self.0.exchange_name
    }
}

impl WalletDraft {
    /// Name uniqueness is checked against the store by the wallet service.
    pub fn validate(self) -> Result<ValidWalletDraft, ValidationError> {
        let exchange_name = require_text("exchangeName", &self.exchange_name, MAX_EXCHANGE_NAME_LEN)?;
        require_non_negative("totalBalance", self.total_balance)?;
        Ok(ValidWalletDraft(WalletDraft {
            exchange_name,
            total_balance: self.total_balance,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        }))
    }
}
