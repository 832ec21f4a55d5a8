use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use arcade_db::EconomyError;
use arcade_types::api::{AddExperienceRequest, BattlePassResponse, Claims};

use crate::AppState;
use crate::auth::acting_user;
use crate::error::{ApiError, blocking};

/// GET /battlepass/{username} — progress plus the reward table of its season.
pub async fn get_battle_pass(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let response = blocking(move || {
        let user = db
            .db
            .get_user_by_username(&username)?
            .ok_or_else(|| EconomyError::UserNotFound(username.clone()))?;
        let progress = db.db.get_progress(&user.id)?;
        let tiers = db.db.list_tiers(progress.current_season)?;
        Ok(BattlePassResponse { progress, tiers })
    })
    .await?;

    Ok(Json(response))
}

pub async fn purchase_premium(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, Some(username.as_str())).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let price = state.premium_pass_price;
    let progress = blocking(move || db.db.purchase_premium_pass(&uid, price)).await?;

    Ok(Json(progress))
}

pub async fn add_experience(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddExperienceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, Some(username.as_str())).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let progress = blocking(move || db.db.add_experience(&uid, req.amount)).await?;

    Ok(Json(progress))
}
