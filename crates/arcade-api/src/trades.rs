use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use arcade_types::api::{Claims, ProposeTradeRequest, TradeActionRequest};

use crate::AppState;
use crate::auth::acting_user;
use crate::error::{ApiError, blocking};

/// POST /trades/propose — the caller offers cosmetics to `receiverId`.
pub async fn propose(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ProposeTradeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let sender = acting_user(&state, &claims, req.username.as_deref()).await?;

    let db = state.clone();
    let sender_id = sender.id.to_string();
    let trade = blocking(move || {
        db.db.propose_trade(
            req.group_id,
            &sender_id,
            &req.receiver_id.to_string(),
            &req.sender_cosmetic_ids,
            &req.receiver_cosmetic_ids,
        )
    })
    .await?;

    Ok((StatusCode::CREATED, Json(trade)))
}

/// GET /trades — pending requests addressed to the caller.
pub async fn list_trades(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, None).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let trades = blocking(move || db.db.list_trades_for_user(&uid)).await?;

    Ok(Json(trades))
}

pub async fn accept(
    State(state): State<AppState>,
    Path(trade_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<TradeActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, req.username.as_deref()).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let trade = blocking(move || db.db.accept_trade(trade_id, &uid)).await?;

    Ok(Json(trade))
}

pub async fn reject(
    State(state): State<AppState>,
    Path(trade_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<TradeActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, req.username.as_deref()).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let trade = blocking(move || db.db.reject_trade(trade_id, &uid)).await?;

    Ok(Json(trade))
}
