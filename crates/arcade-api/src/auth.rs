use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};
use uuid::Uuid;

use arcade_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};
use arcade_types::models::User;

use crate::AppState;
use crate::error::{ApiError, blocking};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::bad_request("username must be 3 to 32 characters"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::bad_request("password must be at least 8 characters"));
    }

    // Check if username is taken
    let db = state.clone();
    let name = req.username.clone();
    if blocking(move || Ok(db.db.get_user_by_username(&name)?))
        .await?
        .is_some()
    {
        return Err(ApiError::new(StatusCode::CONFLICT, "conflict", "username is taken"));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| ApiError::internal())?
        .to_string();

    let user_id = Uuid::new_v4();
    let is_admin = state.admin_usernames.contains(&req.username);

    let db = state.clone();
    let name = req.username.clone();
    blocking(move || Ok(db.db.create_user(&user_id.to_string(), &name, &password_hash, is_admin)?))
        .await?;
    info!(username = %req.username, is_admin, "User registered");

    let token = create_token(&state.jwt_secret, user_id, &req.username)
        .map_err(|_| ApiError::internal())?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user_id,
            username: req.username,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let name = req.username.clone();
    let user = blocking(move || Ok(db.db.get_user_by_username(&name)?))
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password).map_err(|_| ApiError::internal())?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::unauthorized())?;

    if user.is_banned {
        warn!(username = %user.username, "Login refused for banned user");
        return Err(ApiError::forbidden("account is banned"));
    }

    let user_id: Uuid = user.id.parse().map_err(|_| ApiError::internal())?;

    let token = create_token(&state.jwt_secret, user_id, &user.username)
        .map_err(|_| ApiError::internal())?;

    Ok(Json(AuthResponse {
        user_id,
        username: user.username,
        token,
    }))
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Resolve the user behind `claims`.
///
/// `claimed_username` is the `username` a request body may carry; it must
/// name the token holder. Banned accounts are refused.
pub async fn acting_user(
    state: &AppState,
    claims: &Claims,
    claimed_username: Option<&str>,
) -> Result<User, ApiError> {
    if let Some(name) = claimed_username {
        if name != claims.username {
            warn!(token_user = %claims.username, body_user = name, "Username does not match session");
            return Err(ApiError::forbidden("username does not match the authenticated session"));
        }
    }

    let db = state.clone();
    let id = claims.sub.to_string();
    let row = blocking(move || Ok(db.db.get_user_by_id(&id)?))
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    if row.is_banned {
        return Err(ApiError::forbidden("account is banned"));
    }
    row.to_public().map_err(|e| arcade_db::EconomyError::from(e).into())
}

pub async fn require_admin(state: &AppState, claims: &Claims) -> Result<User, ApiError> {
    let user = acting_user(state, claims, None).await?;
    if !user.is_admin {
        warn!(username = %user.username, "Admin endpoint refused");
        return Err(ApiError::forbidden("admin privileges required"));
    }
    Ok(user)
}
