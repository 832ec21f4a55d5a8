use axum::{Extension, Json, extract::State, response::IntoResponse};

use arcade_types::api::{AddCoinsRequest, Claims};

use crate::AppState;
use crate::auth::acting_user;
use crate::error::{ApiError, blocking};

/// POST /coins/add — apply a signed coin delta to the caller's balance.
pub async fn add_coins(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddCoinsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, req.username.as_deref()).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let updated = blocking(move || db.db.add_coins(&uid, req.amount)).await?;

    Ok(Json(updated))
}
