use crate::db::repo::{investments, trades};
use crate::db::Repository;
use crate::domain::validation::require_positive;
use crate::domain::{
    CloseReason, Decimal, Trade, TradeDraft, TradeStatus, TradeType, ValidationError,
};
use crate::engine::{
    close, invested_total, realized_between, recompute, resize, summarize, CloseWindow,
    SummaryWindows, TradeSummary,
};
use crate::error::AppError;
use crate::service::investments::revalue_all;
use crate::service::{local_now, local_today};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct TradeService {
    repo: Arc<Repository>,
}

impl TradeService {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Validate, value and store a new trade.
    pub async fn create(&self, draft: TradeDraft) -> Result<Trade, AppError> {
        let valid = draft.validate()?;
        let trade = recompute(Trade::from_draft(valid, local_now()), None)?;
        let id = self.repo.insert_trade(&trade).await?;

        info!(
            trade_id = id,
            coin = %trade.coin,
            trade_type = %trade.trade_type,
            status = %trade.status,
            "Trade created"
        );
        Ok(Trade { id, ..trade })
    }

    pub async fn get(&self, id: i64) -> Result<Trade, AppError> {
        self.repo
            .get_trade(id)
            .await?
            .ok_or_else(|| AppError::trade_not_found(id))
    }

    pub async fn list(&self) -> Result<Vec<Trade>, AppError> {
        Ok(self.repo.list_trades().await?)
    }

    /// Replace a trade's editable fields.
    ///
    /// Position size keeps following the investments when the trade has any,
    /// and every investment is re-valued against the edited trade.
    pub async fn update(&self, id: i64, draft: TradeDraft) -> Result<Trade, AppError> {
        let valid = draft.validate()?;

        let mut tx = self.repo.begin().await?;
        let existing = trades::fetch_trade(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::trade_not_found(id))?;
        let owned = investments::investments_for_trade(&mut *tx, id).await?;

        let trade = resize(existing.apply_draft(valid, local_now()), &owned)?;
        trades::update_trade(&mut *tx, &trade).await?;
        let revalued = revalue_all(&mut *tx, &trade).await?;
        tx.commit().await?;

        info!(trade_id = id, revalued, "Trade updated");
        Ok(trade)
    }

    /// Close a trade at `exit_price`. Closing a closed trade overwrites the
    /// previous exit.
    pub async fn close(
        &self,
        id: i64,
        exit_price: Decimal,
        reason: CloseReason,
    ) -> Result<Trade, AppError> {
        require_positive("exitPrice", exit_price)?;

        let mut tx = self.repo.begin().await?;
        let existing = trades::fetch_trade(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::trade_not_found(id))?;
        let owned = investments::investments_for_trade(&mut *tx, id).await?;

        let was_closed = existing.is_closed();
        let trade = close(
            existing,
            exit_price,
            reason,
            local_now(),
            invested_total(&owned),
        )?;
        trades::update_trade(&mut *tx, &trade).await?;
        tx.commit().await?;

        info!(
            trade_id = id,
            exit_price = %exit_price,
            reason = %reason,
            profit_loss = ?trade.profit_loss,
            reclosed = was_closed,
            "Trade closed"
        );
        Ok(trade)
    }

    /// Record a manually observed market price and re-value the trade's
    /// investments against it.
    pub async fn set_current_price(&self, id: i64, price: Decimal) -> Result<Trade, AppError> {
        require_positive("currentPrice", price)?;

        let mut tx = self.repo.begin().await?;
        let mut trade = trades::fetch_trade(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::trade_not_found(id))?;
        let owned = investments::investments_for_trade(&mut *tx, id).await?;

        trade.current_price = Some(price);
        trade.updated_at = local_now();
        let trade = resize(trade, &owned)?;
        trades::update_trade(&mut *tx, &trade).await?;
        let revalued = revalue_all(&mut *tx, &trade).await?;
        tx.commit().await?;

        info!(trade_id = id, current_price = %price, revalued, "Trade price updated");
        Ok(trade)
    }

    /// Delete a trade together with its investments.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.repo.begin().await?;
        let removed = investments::delete_investments_for_trade(&mut *tx, id).await?;
        if !trades::delete_trade(&mut *tx, id).await? {
            return Err(AppError::trade_not_found(id));
        }
        tx.commit().await?;

        info!(trade_id = id, investments_removed = removed, "Trade deleted");
        Ok(())
    }

    pub async fn by_coin(&self, coin: &str) -> Result<Vec<Trade>, AppError> {
        Ok(self.repo.trades_by_coin(coin).await?)
    }

    pub async fn by_status(&self, status: TradeStatus) -> Result<Vec<Trade>, AppError> {
        Ok(self.repo.trades_by_status(status).await?)
    }

    pub async fn by_type(&self, trade_type: TradeType) -> Result<Vec<Trade>, AppError> {
        Ok(self.repo.trades_by_type(trade_type).await?)
    }

    /// Trades opened on any day in `[start_date, end_date]`.
    pub async fn by_trade_date(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Trade>, AppError> {
        if start_date > end_date {
            return Err(ValidationError::new("endDate", "must not be before startDate").into());
        }
        let window = CloseWindow::days(start_date, end_date);
        Ok(self
            .repo
            .trades_opened_between(window.start, window.end)
            .await?)
    }

    /// Portfolio statistics as of the server's local today.
    pub async fn summary(&self) -> Result<TradeSummary, AppError> {
        let all = self.repo.list_trades().await?;
        Ok(summarize(&all, &SummaryWindows::ending_on(local_today())))
    }

    /// Realized P&L of trades closed within `[start, end]`.
    pub async fn realized_pnl(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Decimal, AppError> {
        if start > end {
            return Err(ValidationError::new("end", "must not be before start").into());
        }
        let closed = self.repo.trades_closed_between(start, end).await?;
        Ok(realized_between(&closed, CloseWindow::new(start, end)))
    }

    pub async fn coins(&self) -> Result<Vec<String>, AppError> {
        Ok(self.repo.distinct_coins().await?)
    }

    pub async fn exchanges(&self) -> Result<Vec<String>, AppError> {
        Ok(self.repo.distinct_exchanges().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repo::tests::setup_test_db;
    use crate::domain::trade::tests::{d, draft};
    use crate::domain::InvestmentDraft;
    use crate::service::InvestmentService;

    async fn setup() -> (TradeService, InvestmentService, tempfile::TempDir) {
        let (repo, temp) = setup_test_db().await;
        let repo = Arc::new(repo);
        (
            TradeService::new(repo.clone()),
            InvestmentService::new(repo),
            temp,
        )
    }

    #[tokio::test]
    async fn test_create_derives_position_size() {
        let (service, _, _temp) = setup().await;
        let trade = service
            .create(draft(TradeType::Long, "50000", "0.1", 10))
            .await
            .unwrap();

        assert!(trade.id > 0);
        assert_eq!(trade.position_size, Some(d("5000")));
        assert_eq!(trade.profit_loss, None);
        assert_eq!(service.get(trade.id).await.unwrap(), trade);
    }

    #[tokio::test]
    async fn test_close_liquidated() {
        let (service, _, _temp) = setup().await;
        let trade = service
            .create(draft(TradeType::Long, "100", "2", 5))
            .await
            .unwrap();

        let closed = service
            .close(trade.id, d("90"), CloseReason::Liquidated)
            .await
            .unwrap();
        assert_eq!(closed.status, TradeStatus::Closed);
        assert!(closed.liquidated);
        assert!(!closed.tp_hit);
        assert!(closed.close_date.is_some());
        assert_eq!(closed.profit_loss, Some(d("-100")));
        assert_eq!(closed.profit_loss_percentage, Some(d("-50")));
    }

    #[tokio::test]
    async fn test_close_rejects_non_positive_exit() {
        let (service, _, _temp) = setup().await;
        let err = service
            .close(1, Decimal::zero(), CloseReason::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_set_current_price_revalues_investments() {
        let (service, investments, _temp) = setup().await;
        let trade = service
            .create(draft(TradeType::Long, "100", "10", 5))
            .await
            .unwrap();
        investments
            .add(
                trade.id,
                InvestmentDraft {
                    amount: d("1000"),
                    price_at_investment: d("100"),
                    notes: None,
                    investment_date: None,
                },
            )
            .await
            .unwrap();

        let priced = service.set_current_price(trade.id, d("110")).await.unwrap();
        assert_eq!(priced.current_price, Some(d("110")));
        assert_eq!(priced.position_size, Some(d("1000")));

        let listed = investments.list(trade.id).await.unwrap();
        assert_eq!(listed[0].current_value, Some(d("1500")));
        assert_eq!(listed[0].profit_loss, Some(d("500")));
    }

    #[tokio::test]
    async fn test_update_keeps_investment_sizing() {
        let (service, investments, _temp) = setup().await;
        let trade = service
            .create(draft(TradeType::Short, "100", "1", 1))
            .await
            .unwrap();
        investments
            .add(
                trade.id,
                InvestmentDraft {
                    amount: d("400"),
                    price_at_investment: d("100"),
                    notes: None,
                    investment_date: None,
                },
            )
            .await
            .unwrap();

        let mut edit = draft(TradeType::Short, "120", "3", 2);
        edit.notes = Some("scaled in".to_string());
        let updated = service.update(trade.id, edit).await.unwrap();
        assert_eq!(updated.entry_price, d("120"));
        assert_eq!(updated.position_size, Some(d("400")));
        assert_eq!(updated.created_at, trade.created_at);
    }

    #[tokio::test]
    async fn test_delete_missing_trade() {
        let (service, _, _temp) = setup().await;
        assert!(matches!(
            service.delete(99).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_reversed_ranges_rejected() {
        let (service, _, _temp) = setup().await;
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();

        assert!(matches!(
            service.by_trade_date(day(5), day(1)).await.unwrap_err(),
            AppError::Validation(_)
        ));
        let start = day(5).and_hms_opt(0, 0, 0).unwrap();
        let end = day(1).and_hms_opt(0, 0, 0).unwrap();
        assert!(matches!(
            service.realized_pnl(start, end).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }
}
