//! Incremental capital additions against a trade.

use crate::domain::validation::{require_positive, ValidationError};
use crate::domain::Decimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One capital addition to a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    /// Store-assigned identifier; `0` until inserted.
    pub id: i64,
    pub trade_id: i64,
    pub amount: Decimal,
    pub price_at_investment: Decimal,
    /// Derived from the parent trade's current price; unset until one is known.
    pub current_value: Option<Decimal>,
    pub profit_loss: Option<Decimal>,
    pub notes: Option<String>,
    pub investment_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl Investment {
    /// Build an unsaved investment for `trade_id`. The investment date
    /// defaults to `now` when the draft leaves it out.
    pub fn from_draft(trade_id: i64, draft: ValidInvestmentDraft, now: NaiveDateTime) -> Self {
        let ValidInvestmentDraft(d) = draft;
        Investment {
            id: 0,
            trade_id,
            amount: d.amount,
            price_at_investment: d.price_at_investment,
            current_value: None,
            profit_loss: None,
            notes: d.notes,
            investment_date: d.investment_date.unwrap_or(now),
            created_at: now,
        }
    }

    /// Replace the editable fields, keeping identity, parent and creation time.
    pub fn apply_draft(self, draft: ValidInvestmentDraft) -> Self {
        let ValidInvestmentDraft(d) = draft;
        Investment {
            amount: d.amount,
            price_at_investment: d.price_at_investment,
            notes: d.notes,
            investment_date: d.investment_date.unwrap_or(self.investment_date),
            current_value: None,
            profit_loss: None,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentDraft {
    pub amount: Decimal,
    pub price_at_investment: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub investment_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidInvestmentDraft(InvestmentDraft);

impl InvestmentDraft {
    pub fn validate(self) -> Result<ValidInvestmentDraft, ValidationError> {
        require_positive("amount", self.amount)?;
        require_positive("priceAtInvestment", self.price_at_investment)?;
        Ok(ValidInvestmentDraft(InvestmentDraft {
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            ..self
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_rejects_non_positive_amount_and_price() {
        let draft = InvestmentDraft {
            amount: Decimal::zero(),
            price_at_investment: d("100"),
            notes: None,
            investment_date: None,
        };
        assert_eq!(draft.clone().validate().unwrap_err().field, "amount");

        let draft = InvestmentDraft {
            amount: d("10"),
            price_at_investment: d("-1"),
            ..draft
        };
        assert_eq!(draft.clone().validate().unwrap_err().field, "priceAtInvestment");

        let draft = InvestmentDraft {
            amount: d("1000000000000001"),
            price_at_investment: d("100"),
            ..draft
        };
        assert_eq!(draft.validate().unwrap_err().field, "amount");
    }

    #[test]
    fn test_investment_date_defaults_to_now() {
        let draft = InvestmentDraft {
            amount: d("250"),
            price_at_investment: d("100"),
            notes: Some("dca".to_string()),
            investment_date: None,
        };
        let investment = Investment::from_draft(3, draft.validate().unwrap(), now());
        assert_eq!(investment.trade_id, 3);
        assert_eq!(investment.investment_date, now());
        assert_eq!(investment.current_value, None);
    }

    #[test]
    fn test_apply_draft_clears_derived_values() {
        let draft = InvestmentDraft {
            amount: d("250"),
            price_at_investment: d("100"),
            notes: None,
            investment_date: None,
        };
        let mut investment = Investment::from_draft(3, draft.clone().validate().unwrap(), now());
        investment.id = 9;
        investment.current_value = Some(d("300"));

        let edited = investment.apply_draft(
            InvestmentDraft {
                amount: d("400"),
                ..draft
            }
            .validate()
            .unwrap(),
        );
        assert_eq!(edited.id, 9);
        assert_eq!(edited.amount, d("400"));
        assert_eq!(edited.current_value, None);
        assert_eq!(edited.investment_date, now());
    }
}
