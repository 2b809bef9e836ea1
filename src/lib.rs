pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod service;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    CloseReason, Coin, Decimal, ExchangeWallet, Investment, Trade, TradeStatus, TradeType,
    ValidationError,
};
pub use error::AppError;
pub use service::{InvestmentService, TradeService, WalletService};
