use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use arcade_types::api::{Claims, DifficultyVoteRequest};

use crate::AppState;
use crate::auth::acting_user;
use crate::cache::difficulty_key;
use crate::error::{ApiError, blocking};

/// GET /games/{game_id}/difficulty — `{average, totalVotes}`.
pub async fn get_difficulty(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let key = difficulty_key(game_id);
    if let Some(cached) = state.cache.get(&key).await {
        return Ok(Json(cached));
    }

    let db = state.clone();
    let summary = blocking(move || db.db.difficulty_summary(game_id)).await?;
    let value = serde_json::to_value(summary).map_err(|e| {
        error!("Failed to serialize difficulty summary: {}", e);
        ApiError::internal()
    })?;
    state.cache.insert(key, value.clone()).await;

    Ok(Json(value))
}

pub async fn vote(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<DifficultyVoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, req.username.as_deref()).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let vote = blocking(move || db.db.vote_difficulty(game_id, &uid, req.difficulty)).await?;
    state.cache.invalidate(&difficulty_key(game_id)).await;

    Ok((StatusCode::CREATED, Json(vote)))
}

pub async fn purchase(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, None).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let receipt = blocking(move || db.db.purchase_game(&uid, game_id)).await?;

    Ok(Json(receipt))
}

pub async fn list_owned(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, None).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let games = blocking(move || db.db.owned_games(&uid)).await?;

    Ok(Json(games))
}
