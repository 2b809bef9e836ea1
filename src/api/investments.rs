use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::domain::{Decimal, Investment, InvestmentDraft};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalInvestedResponse {
    pub trade_id: i64,
    pub total_invested: Decimal,
}

pub async fn add_investment(
    Path(trade_id): Path<i64>,
    State(state): State<AppState>,
    Json(draft): Json<InvestmentDraft>,
) -> Result<(StatusCode, Json<Investment>), AppError> {
    let investment = state.investments.add(trade_id, draft).await?;
    Ok((StatusCode::CREATED, Json(investment)))
}

pub async fn list_investments(
    Path(trade_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Investment>>, AppError> {
    Ok(Json(state.investments.list(trade_id).await?))
}

pub async fn get_total_invested(
    Path(trade_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<TotalInvestedResponse>, AppError> {
    let total_invested = state.investments.total(trade_id).await?;
    Ok(Json(TotalInvestedResponse {
        trade_id,
        total_invested,
    }))
}

pub async fn update_investment(
    Path((trade_id, investment_id)): Path<(i64, i64)>,
    State(state): State<AppState>,
    Json(draft): Json<InvestmentDraft>,
) -> Result<Json<Investment>, AppError> {
    Ok(Json(
        state
            .investments
            .update(trade_id, investment_id, draft)
            .await?,
    ))
}

pub async fn delete_investment(
    Path((trade_id, investment_id)): Path<(i64, i64)>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.investments.delete(trade_id, investment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
