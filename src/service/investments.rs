use crate::db::repo::{investments, trades};
use crate::db::Repository;
use crate::domain::{Decimal, Investment, InvestmentDraft, Trade};
use crate::engine::{resize, revalue};
use crate::error::AppError;
use crate::service::local_now;
use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteConnection;
use std::sync::Arc;
use tracing::{debug, info};

/// Re-derive `trade`'s size from the investments it owns right now and
/// write it back. Runs on the caller's connection so it joins their
/// transaction.
pub(crate) async fn resize_and_store(
    conn: &mut SqliteConnection,
    trade: Trade,
    now: NaiveDateTime,
) -> Result<Trade, AppError> {
    let owned = investments::investments_for_trade(&mut *conn, trade.id).await?;
    let mut trade = resize(trade, &owned)?;
    trade.updated_at = now;
    trades::update_trade(&mut *conn, &trade).await?;
    debug!(
        trade_id = trade.id,
        investments = owned.len(),
        position_size = ?trade.position_size,
        "Trade resized from investments"
    );
    Ok(trade)
}

/// Refresh every investment of `trade` against its current price.
pub(crate) async fn revalue_all(
    conn: &mut SqliteConnection,
    trade: &Trade,
) -> Result<usize, AppError> {
    let owned = investments::investments_for_trade(&mut *conn, trade.id).await?;
    let count = owned.len();
    for investment in owned {
        investments::update_investment(&mut *conn, &revalue(investment, trade)?).await?;
    }
    Ok(count)
}

#[derive(Clone)]
pub struct InvestmentService {
    repo: Arc<Repository>,
}

impl InvestmentService {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Add capital to a trade. The trade's position size becomes the sum of
    /// all its investments.
    pub async fn add(&self, trade_id: i64, draft: InvestmentDraft) -> Result<Investment, AppError> {
        let valid = draft.validate()?;
        let now = local_now();

        let mut tx = self.repo.begin().await?;
        let trade = trades::fetch_trade(&mut *tx, trade_id)
            .await?
            .ok_or_else(|| AppError::trade_not_found(trade_id))?;

        let investment = revalue(Investment::from_draft(trade_id, valid, now), &trade)?;
        let id = investments::insert_investment(&mut *tx, &investment).await?;
        let trade = resize_and_store(&mut *tx, trade, now).await?;
        tx.commit().await?;

        info!(
            trade_id,
            investment_id = id,
            amount = %investment.amount,
            position_size = ?trade.position_size,
            "Investment added"
        );
        Ok(Investment { id, ..investment })
    }

    pub async fn list(&self, trade_id: i64) -> Result<Vec<Investment>, AppError> {
        self.require_trade(trade_id).await?;
        Ok(self.repo.list_investments(trade_id).await?)
    }

    pub async fn total(&self, trade_id: i64) -> Result<Decimal, AppError> {
        self.require_trade(trade_id).await?;
        Ok(self.repo.total_invested(trade_id).await?)
    }

    /// Edit an investment that belongs to `trade_id`, then resize the trade.
    pub async fn update(
        &self,
        trade_id: i64,
        investment_id: i64,
        draft: InvestmentDraft,
    ) -> Result<Investment, AppError> {
        let valid = draft.validate()?;
        let now = local_now();

        let mut tx = self.repo.begin().await?;
        let trade = trades::fetch_trade(&mut *tx, trade_id)
            .await?
            .ok_or_else(|| AppError::trade_not_found(trade_id))?;
        let existing = investments::fetch_investment(&mut *tx, trade_id, investment_id)
            .await?
            .ok_or_else(|| AppError::investment_not_found(trade_id, investment_id))?;

        let investment = revalue(existing.apply_draft(valid), &trade)?;
        investments::update_investment(&mut *tx, &investment).await?;
        resize_and_store(&mut *tx, trade, now).await?;
        tx.commit().await?;

        info!(trade_id, investment_id, "Investment updated");
        Ok(investment)
    }

    /// Remove an investment. Removing the last one returns the trade to
    /// entry-price sizing.
    pub async fn delete(&self, trade_id: i64, investment_id: i64) -> Result<(), AppError> {
        let now = local_now();

        let mut tx = self.repo.begin().await?;
        let trade = trades::fetch_trade(&mut *tx, trade_id)
            .await?
            .ok_or_else(|| AppError::trade_not_found(trade_id))?;
        if !investments::delete_investment(&mut *tx, trade_id, investment_id).await? {
            return Err(AppError::investment_not_found(trade_id, investment_id));
        }
        resize_and_store(&mut *tx, trade, now).await?;
        tx.commit().await?;

        info!(trade_id, investment_id, "Investment deleted");
        Ok(())
    }

    async fn require_trade(&self, trade_id: i64) -> Result<Trade, AppError> {
        self.repo
            .get_trade(trade_id)
            .await?
            .ok_or_else(|| AppError::trade_not_found(trade_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repo::tests::setup_test_db;
    use crate::domain::trade::tests::{d, draft};
    use crate::domain::TradeType;
    use crate::service::TradeService;

    fn investment(amount: &str) -> InvestmentDraft {
        InvestmentDraft {
            amount: d(amount),
            price_at_investment: d("100"),
            notes: None,
            investment_date: None,
        }
    }

    #[tokio::test]
    async fn test_position_size_follows_investments() {
        let (repo, _temp) = setup_test_db().await;
        let repo = Arc::new(repo);
        let trades = TradeService::new(repo.clone());
        let service = InvestmentService::new(repo.clone());

        let trade = trades
            .create(draft(TradeType::Long, "100", "1", 1))
            .await
            .unwrap();
        assert_eq!(trade.position_size, Some(d("100")));

        let first = service.add(trade.id, investment("100")).await.unwrap();
        service.add(trade.id, investment("250")).await.unwrap();
        let sized = repo.get_trade(trade.id).await.unwrap().unwrap();
        assert_eq!(sized.position_size, Some(d("350")));
        assert_eq!(service.total(trade.id).await.unwrap(), d("350"));

        service.delete(trade.id, first.id).await.unwrap();
        let sized = repo.get_trade(trade.id).await.unwrap().unwrap();
        assert_eq!(sized.position_size, Some(d("250")));
    }

    #[tokio::test]
    async fn test_investment_under_wrong_trade_is_not_found() {
        let (repo, _temp) = setup_test_db().await;
        let repo = Arc::new(repo);
        let trades = TradeService::new(repo.clone());
        let service = InvestmentService::new(repo);

        let owner = trades
            .create(draft(TradeType::Long, "100", "1", 1))
            .await
            .unwrap();
        let other = trades
            .create(draft(TradeType::Short, "100", "1", 1))
            .await
            .unwrap();
        let inv = service.add(owner.id, investment("10")).await.unwrap();

        let err = service
            .update(other.id, inv.id, investment("20"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.delete(other.id, inv.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_to_missing_trade() {
        let (repo, _temp) = setup_test_db().await;
        let service = InvestmentService::new(Arc::new(repo));
        let err = service.add(404, investment("10")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_amount_rejected_before_store() {
        let (repo, _temp) = setup_test_db().await;
        let service = InvestmentService::new(Arc::new(repo));
        let err = service.add(1, investment("0")).await.unwrap_err();
        match err {
            AppError::Validation(v) => assert_eq!(v.field, "amount"),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_mark_rolls_back() {
        let (repo, _temp) = setup_test_db().await;
        let repo = Arc::new(repo);
        let trades = TradeService::new(repo.clone());
        let service = InvestmentService::new(repo.clone());

        let trade = trades
            .create(draft(TradeType::Long, "1", "1", 125))
            .await
            .unwrap();
        trades
            .set_current_price(trade.id, d("1000000"))
            .await
            .unwrap();

        let err = service
            .add(
                trade.id,
                InvestmentDraft {
                    amount: d("1000000000000000"),
                    price_at_investment: d("1"),
                    notes: None,
                    investment_date: None,
                },
            )
            .await
            .unwrap_err();
        match err {
            AppError::Validation(v) => assert_eq!(v.field, "amount"),
            other => panic!("Expected validation error, got {other:?}"),
        }

        assert!(service.list(trade.id).await.unwrap().is_empty());
        let stored = repo.get_trade(trade.id).await.unwrap().unwrap();
        assert_eq!(stored.position_size, Some(d("1")));
    }
}
