use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;

use arcade_db::EconomyError;

use crate::AppState;
use crate::error::{ApiError, blocking};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /users/{username} — public profile including the coin balance.
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user = blocking(move || {
        let row = db
            .db
            .get_user_by_username(&username)?
            .ok_or_else(|| EconomyError::UserNotFound(username.clone()))?;
        Ok(row.to_public()?)
    })
    .await?;

    Ok(Json(user))
}
