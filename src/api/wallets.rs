use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::domain::{Decimal, ExchangeWallet, WalletDraft};
use crate::engine::WalletSummary;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalBalanceResponse {
    pub total_balance: Decimal,
}

pub async fn create_wallet(
    State(state): State<AppState>,
    Json(draft): Json<WalletDraft>,
) -> Result<(StatusCode, Json<ExchangeWallet>), AppError> {
    let wallet = state.wallets.create(draft).await?;
    Ok((StatusCode::CREATED, Json(wallet)))
}

pub async fn list_wallets(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExchangeWallet>>, AppError> {
    Ok(Json(state.wallets.list().await?))
}

pub async fn get_wallet(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ExchangeWallet>, AppError> {
    Ok(Json(state.wallets.get(id).await?))
}

pub async fn get_wallet_by_exchange(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ExchangeWallet>, AppError> {
    Ok(Json(state.wallets.by_exchange_name(&name).await?))
}

pub async fn update_wallet(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(draft): Json<WalletDraft>,
) -> Result<Json<ExchangeWallet>, AppError> {
    Ok(Json(state.wallets.update(id, draft).await?))
}

pub async fn delete_wallet(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.wallets.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_wallet_summary(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<WalletSummary>, AppError> {
    Ok(Json(state.wallets.summary(id).await?))
}

pub async fn get_wallet_summaries(
    State(state): State<AppState>,
) -> Result<Json<Vec<WalletSummary>>, AppError> {
    Ok(Json(state.wallets.summaries().await?))
}

pub async fn get_total_balance(
    State(state): State<AppState>,
) -> Result<Json<TotalBalanceResponse>, AppError> {
    Ok(Json(TotalBalanceResponse {
        total_balance: state.wallets.total_balance().await?,
    }))
}
