use crate::db::repo::wallets;
use crate::db::Repository;
use crate::domain::{Decimal, ExchangeWallet, TradeStatus, ValidationError, WalletDraft};
use crate::engine::{wallet_summary, WalletSummary};
use crate::error::AppError;
use crate::service::local_now;
use std::sync::Arc;
use tracing::{info, warn};

fn duplicate_name(name: &str) -> AppError {
    ValidationError::new("exchangeName", format!("wallet for {} already exists", name)).into()
}

#[derive(Clone)]
pub struct WalletService {
    repo: Arc<Repository>,
}

impl WalletService {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, draft: WalletDraft) -> Result<ExchangeWallet, AppError> {
        let valid = draft.validate()?;

        let mut tx = self.repo.begin().await?;
        if wallets::exchange_name_taken(&mut *tx, valid.exchange_name(), None).await? {
            return Err(duplicate_name(valid.exchange_name()));
        }
        let wallet = ExchangeWallet::from_draft(valid, local_now());
        let id = wallets::insert_wallet(&mut *tx, &wallet).await?;
        tx.commit().await?;

        info!(wallet_id = id, exchange = %wallet.exchange_name, "Wallet created");
        Ok(ExchangeWallet { id, ..wallet })
    }

    pub async fn get(&self, id: i64) -> Result<ExchangeWallet, AppError> {
        self.repo
            .get_wallet(id)
            .await?
            .ok_or_else(|| AppError::wallet_not_found(id))
    }

    pub async fn list(&self) -> Result<Vec<ExchangeWallet>, AppError> {
        Ok(self.repo.list_wallets().await?)
    }

    pub async fn by_exchange_name(&self, name: &str) -> Result<ExchangeWallet, AppError> {
        self.repo
            .wallet_by_exchange_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no wallet for exchange {}", name.trim())))
    }

    /// Edit a wallet.
    ///
    /// Trades reference wallets by exchange name only, so a rename leaves
    /// open trades on the old name without a wallet. They are reported, not
    /// rewritten.
    pub async fn update(&self, id: i64, draft: WalletDraft) -> Result<ExchangeWallet, AppError> {
        let valid = draft.validate()?;

        let mut tx = self.repo.begin().await?;
        let existing = wallets::fetch_wallet(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::wallet_not_found(id))?;
        if wallets::exchange_name_taken(&mut *tx, valid.exchange_name(), Some(id)).await? {
            return Err(duplicate_name(valid.exchange_name()));
        }
        let old_name = existing.exchange_name.clone();
        let wallet = existing.apply_draft(valid, local_now());
        wallets::update_wallet(&mut *tx, &wallet).await?;
        tx.commit().await?;

        if !old_name.eq_ignore_ascii_case(&wallet.exchange_name) {
            let stranded = self
                .repo
                .trades_by_exchange_and_status(&old_name, TradeStatus::Open)
                .await?
                .len();
            if stranded > 0 {
                warn!(
                    wallet_id = id,
                    old_name = %old_name,
                    new_name = %wallet.exchange_name,
                    open_trades = stranded,
                    "Wallet renamed; open trades still reference the old exchange name"
                );
            }
        }

        info!(wallet_id = id, exchange = %wallet.exchange_name, "Wallet updated");
        Ok(wallet)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete_wallet(id).await? {
            return Err(AppError::wallet_not_found(id));
        }
        info!(wallet_id = id, "Wallet deleted");
        Ok(())
    }

    /// Used and available balance for one wallet.
    pub async fn summary(&self, id: i64) -> Result<WalletSummary, AppError> {
        let wallet = self.get(id).await?;
        let open = self
            .repo
            .trades_by_exchange_and_status(&wallet.exchange_name, TradeStatus::Open)
            .await?;
        Ok(wallet_summary(&wallet, &open))
    }

    pub async fn summaries(&self) -> Result<Vec<WalletSummary>, AppError> {
        let all = self.repo.list_wallets().await?;
        let open = self.repo.trades_by_status(TradeStatus::Open).await?;
        Ok(all.iter().map(|w| wallet_summary(w, &open)).collect())
    }

    pub async fn total_balance(&self) -> Result<Decimal, AppError> {
        Ok(self.repo.total_wallet_balance().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repo::tests::setup_test_db;
    use crate::domain::trade::tests::{d, draft};
    use crate::domain::TradeType;
    use crate::service::TradeService;

    fn wallet(name: &str, balance: &str) -> WalletDraft {
        WalletDraft {
            exchange_name: name.to_string(),
            total_balance: d(balance),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected_ignoring_case() {
        let (repo, _temp) = setup_test_db().await;
        let service = WalletService::new(Arc::new(repo));

        service.create(wallet("Binance", "100")).await.unwrap();
        let err = service.create(wallet("BINANCE", "5")).await.unwrap_err();
        match err {
            AppError::Validation(v) => assert_eq!(v.field, "exchangeName"),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_may_keep_own_name() {
        let (repo, _temp) = setup_test_db().await;
        let service = WalletService::new(Arc::new(repo));

        let created = service.create(wallet("Bybit", "100")).await.unwrap();
        let updated = service
            .update(created.id, wallet("bybit", "250"))
            .await
            .unwrap();
        assert_eq!(updated.exchange_name, "bybit");
        assert_eq!(updated.total_balance, d("250"));
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_summary_counts_open_trades_on_exchange() {
        let (repo, _temp) = setup_test_db().await;
        let repo = Arc::new(repo);
        let trades = TradeService::new(repo.clone());
        let service = WalletService::new(repo);

        let created = service.create(wallet("Binance", "10000")).await.unwrap();
        for (entry, qty) in [("3000", "1"), ("750", "2")] {
            let mut t = draft(TradeType::Long, entry, qty, 3);
            t.exchange = Some("binance".to_string());
            trades.create(t).await.unwrap();
        }

        let summary = service.summary(created.id).await.unwrap();
        assert_eq!(summary.used_balance, d("4500"));
        assert_eq!(summary.available_balance, d("5500"));
        assert_eq!(summary.open_trades_count, 2);
        assert_eq!(service.summaries().await.unwrap(), vec![summary]);
    }

    #[tokio::test]
    async fn test_missing_wallet() {
        let (repo, _temp) = setup_test_db().await;
        let service = WalletService::new(Arc::new(repo));
        assert!(matches!(
            service.delete(3).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.by_exchange_name("okx").await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert_eq!(service.total_balance().await.unwrap(), Decimal::zero());
    }
}
