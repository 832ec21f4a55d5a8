use axum::{Extension, Json, extract::State, response::IntoResponse};
use tracing::error;

use arcade_types::api::{ActivateCosmeticRequest, Claims, PurchaseCosmeticRequest};

use crate::AppState;
use crate::auth::acting_user;
use crate::cache::COSMETICS_KEY;
use crate::error::{ApiError, blocking};

/// GET /cosmetics — full catalog, served from the read cache when warm.
pub async fn list_cosmetics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    if let Some(cached) = state.cache.get(COSMETICS_KEY).await {
        return Ok(Json(cached));
    }

    let db = state.clone();
    let cosmetics = blocking(move || db.db.list_cosmetics()).await?;
    let value = serde_json::to_value(&cosmetics).map_err(|e| {
        error!("Failed to serialize catalog: {}", e);
        ApiError::internal()
    })?;
    state.cache.insert(COSMETICS_KEY, value.clone()).await;

    Ok(Json(value))
}

pub async fn purchase(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PurchaseCosmeticRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, req.username.as_deref()).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let receipt = blocking(move || db.db.purchase_cosmetic(&uid, req.cosmetic_id)).await?;

    Ok(Json(receipt))
}

/// POST /cosmetics/activate — equip an owned cosmetic, or clear with `null`.
pub async fn activate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ActivateCosmeticRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, req.username.as_deref()).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let active = blocking(move || db.db.set_active_cosmetic(&uid, req.cosmetic_id)).await?;

    Ok(Json(active))
}

pub async fn get_active(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, None).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let active = blocking(move || db.db.get_active_cosmetic(&uid)).await?;

    Ok(Json(active))
}

pub async fn list_owned(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = acting_user(&state, &claims, None).await?;

    let db = state.clone();
    let uid = user.id.to_string();
    let owned = blocking(move || db.db.owned_cosmetics(&uid)).await?;

    Ok(Json(owned))
}
