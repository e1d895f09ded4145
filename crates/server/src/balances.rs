//! Balance and stats API endpoints

use api_types::balance::{BalanceResponse, GrantMana, ManaStatsResponse};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};

pub async fn get(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<BalanceResponse>, ServerError> {
    let balance = state.engine.balance_cached(&user_id).await?;

    Ok(Json(BalanceResponse { user_id, balance }))
}

pub async fn stats(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<ManaStatsResponse>, ServerError> {
    let stats = state.engine.mana_stats(&user_id).await?;

    Ok(Json(ManaStatsResponse {
        user_id,
        balance: stats.balance,
        total_earned: stats.total_earned,
        total_spent: stats.total_spent,
    }))
}

pub async fn grant(
    State(state): State<ServerState>,
    Json(payload): Json<GrantMana>,
) -> Result<Json<BalanceResponse>, ServerError> {
    let balance = state
        .engine
        .credit(engine::CreditCmd::new(
            payload.user_id.clone(),
            payload.amount,
            payload.reason,
        ))
        .await?;

    Ok(Json(BalanceResponse {
        user_id: payload.user_id,
        balance,
    }))
}
