use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::AppState;
use crate::domain::{CloseReason, Decimal, Trade, TradeDraft, TradeStatus, TradeType};
use crate::engine::TradeSummary;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseRequest {
    pub exit_price: Decimal,
    pub close_reason: CloseReason,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    pub current_price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct PnlQuery {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct RealizedPnlResponse {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(rename = "realizedPnL")]
    pub realized_pnl: Decimal,
}

pub async fn create_trade(
    State(state): State<AppState>,
    Json(draft): Json<TradeDraft>,
) -> Result<(StatusCode, Json<Trade>), AppError> {
    let trade = state.trades.create(draft).await?;
    Ok((StatusCode::CREATED, Json(trade)))
}

pub async fn list_trades(State(state): State<AppState>) -> Result<Json<Vec<Trade>>, AppError> {
    Ok(Json(state.trades.list().await?))
}

pub async fn get_trade(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Trade>, AppError> {
    Ok(Json(state.trades.get(id).await?))
}

pub async fn update_trade(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(draft): Json<TradeDraft>,
) -> Result<Json<Trade>, AppError> {
    Ok(Json(state.trades.update(id, draft).await?))
}

pub async fn delete_trade(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.trades.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn close_trade(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(req): Json<CloseRequest>,
) -> Result<Json<Trade>, AppError> {
    Ok(Json(
        state
            .trades
            .close(id, req.exit_price, req.close_reason)
            .await?,
    ))
}

pub async fn set_current_price(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(req): Json<PriceRequest>,
) -> Result<Json<Trade>, AppError> {
    Ok(Json(
        state
            .trades
            .set_current_price(id, req.current_price)
            .await?,
    ))
}

pub async fn get_trades_by_coin(
    Path(coin): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Trade>>, AppError> {
    Ok(Json(state.trades.by_coin(&coin).await?))
}

pub async fn get_trades_by_status(
    Path(status): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Trade>>, AppError> {
    let status = TradeStatus::from_str(&status)?;
    Ok(Json(state.trades.by_status(status).await?))
}

pub async fn get_trades_by_type(
    Path(trade_type): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Trade>>, AppError> {
    let trade_type = TradeType::from_str(&trade_type)?;
    Ok(Json(state.trades.by_type(trade_type).await?))
}

pub async fn get_trades_by_date_range(
    Query(params): Query<DateRangeQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Trade>>, AppError> {
    Ok(Json(
        state
            .trades
            .by_trade_date(params.start_date, params.end_date)
            .await?,
    ))
}

pub async fn get_summary(State(state): State<AppState>) -> Result<Json<TradeSummary>, AppError> {
    Ok(Json(state.trades.summary().await?))
}

pub async fn get_realized_pnl(
    Query(params): Query<PnlQuery>,
    State(state): State<AppState>,
) -> Result<Json<RealizedPnlResponse>, AppError> {
    let realized_pnl = state.trades.realized_pnl(params.start, params.end).await?;
    Ok(Json(RealizedPnlResponse {
        start: params.start,
        end: params.end,
        realized_pnl,
    }))
}

pub async fn get_coins(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.trades.coins().await?))
}

pub async fn get_exchanges(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.trades.exchanges().await?))
}
