use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use arcade_types::api::{BanRequest, Claims, CreateCosmeticRequest, CreateGameRequest, UpsertTierRequest};

use crate::AppState;
use crate::auth::require_admin;
use crate::cache::COSMETICS_KEY;
use crate::error::{ApiError, blocking};

pub async fn create_cosmetic(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCosmeticRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &claims).await?;

    let db = state.clone();
    let cosmetic = blocking(move || {
        db.db
            .create_cosmetic(&req.name, req.cosmetic_type, req.price, &req.value)
    })
    .await?;
    state.cache.invalidate(COSMETICS_KEY).await;

    Ok((StatusCode::CREATED, Json(cosmetic)))
}

pub async fn create_game(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateGameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &claims).await?;

    let db = state.clone();
    let game = blocking(move || db.db.create_game(&req.name, req.price)).await?;

    Ok((StatusCode::CREATED, Json(game)))
}

pub async fn upsert_tier(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpsertTierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &claims).await?;

    let db = state.clone();
    let tier = blocking(move || {
        db.db.upsert_tier(
            req.season,
            req.tier,
            req.free_cosmetic_id,
            req.premium_cosmetic_id,
            req.free_game_id,
            req.premium_game_id,
        )
    })
    .await?;

    Ok(Json(tier))
}

pub async fn set_ban(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let admin = require_admin(&state, &claims).await?;
    if admin.username == username {
        return Err(ApiError::bad_request("admins cannot change their own ban state"));
    }

    let db = state.clone();
    let user = blocking(move || db.db.set_banned(&username, req.banned)).await?;

    Ok(Json(user))
}
