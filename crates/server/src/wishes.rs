//! Wish API endpoints

use api_types::wish::{WishCreated, WishNew};
use axum::{Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<WishNew>,
) -> Result<(StatusCode, Json<WishCreated>), ServerError> {
    let id = state
        .engine
        .new_wish(&payload.owner_id, &payload.title)
        .await?;

    Ok((StatusCode::CREATED, Json(WishCreated { id })))
}
