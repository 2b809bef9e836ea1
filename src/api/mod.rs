pub mod health;
pub mod investments;
pub mod trades;
pub mod wallets;

use crate::config::Config;
use crate::db::Repository;
use crate::service::{InvestmentService, TradeService, WalletService};
use axum::http::HeaderValue;
use axum::{
    routing::{get, patch, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub trades: TradeService,
    pub investments: InvestmentService,
    pub wallets: WalletService,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self {
            trades: TradeService::new(repo.clone()),
            investments: InvestmentService::new(repo.clone()),
            wallets: WalletService::new(repo.clone()),
            repo,
            config,
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match config.cors_allowed_origin.as_deref() {
        None => AllowOrigin::from(Any),
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(e) => {
                warn!(origin, error = %e, "Ignoring unparsable CORS origin; allowing any");
                AllowOrigin::from(Any)
            }
        },
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/api/trades",
            get(trades::list_trades).post(trades::create_trade),
        )
        .route("/api/trades/summary", get(trades::get_summary))
        .route("/api/trades/pnl", get(trades::get_realized_pnl))
        .route("/api/trades/coins", get(trades::get_coins))
        .route("/api/trades/exchanges", get(trades::get_exchanges))
        .route("/api/trades/date-range", get(trades::get_trades_by_date_range))
        .route("/api/trades/coin/:coin", get(trades::get_trades_by_coin))
        .route("/api/trades/status/:status", get(trades::get_trades_by_status))
        .route("/api/trades/type/:trade_type", get(trades::get_trades_by_type))
        .route(
            "/api/trades/:id",
            get(trades::get_trade)
                .put(trades::update_trade)
                .delete(trades::delete_trade),
        )
        .route("/api/trades/:id/close", patch(trades::close_trade))
        .route("/api/trades/:id/price", patch(trades::set_current_price))
        .route(
            "/api/trades/:id/investments",
            get(investments::list_investments).post(investments::add_investment),
        )
        .route(
            "/api/trades/:id/investments/total",
            get(investments::get_total_invested),
        )
        .route(
            "/api/trades/:id/investments/:investment_id",
            put(investments::update_investment).delete(investments::delete_investment),
        )
        .route(
            "/api/wallets",
            get(wallets::list_wallets).post(wallets::create_wallet),
        )
        .route("/api/wallets/summaries", get(wallets::get_wallet_summaries))
        .route("/api/wallets/total-balance", get(wallets::get_total_balance))
        .route(
            "/api/wallets/exchange/:name",
            get(wallets::get_wallet_by_exchange),
        )
        .route(
            "/api/wallets/:id",
            get(wallets::get_wallet)
                .put(wallets::update_wallet)
                .delete(wallets::delete_wallet),
        )
        .route("/api/wallets/:id/summary", get(wallets::get_wallet_summary))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
