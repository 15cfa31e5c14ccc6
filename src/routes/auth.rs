use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::users::{self, NewUser};
use crate::error::{AppError, Result};
use crate::models::{User, UserResponse, UserRole};
use crate::{security, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: i64,
}

/// Register a new user
///
/// Validates the input fields, hashes the password, and creates the user
/// record. Duplicate username/email/phone returns 409 Conflict.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserResponse>> {
    if !User::validate_username(&payload.username) {
        return Err(AppError::Validation(
            "Username must be 3-32 characters of letters, digits, '_' or '-'".to_string(),
        ));
    }
    if !User::validate_email(&payload.email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if !User::validate_password(&payload.password) {
        return Err(AppError::Validation(
            "Password must be at least 8 characters and contain a letter and a digit".to_string(),
        ));
    }
    if let Some(phone) = &payload.phone_number {
        if !User::validate_phone_number(phone) {
            return Err(AppError::Validation("Invalid phone number".to_string()));
        }
    }

    let password_hash = security::hash_password(&payload.password)?;

    let user = users::create_user(
        &state.pool,
        &NewUser {
            username: payload.username,
            email: payload.email,
            phone_number: payload.phone_number,
            password_hash,
            full_name: payload.full_name,
            role: payload.role,
        },
    )
    .await?;

    tracing::info!("New {:?} user registered: {}", user.role, user.id);

    Ok(Json(user.into()))
}

/// Log in with email and password, returning a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let user = users::get_user_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !security::verify_password(&payload.password, &user.password_hash)? {
        tracing::warn!("Failed login attempt for user {}", user.id);
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let access_token = security::create_access_token(
        user.id,
        &state.config.jwt_secret,
        state.config.token_expire_minutes,
    )?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user_id: user.id,
    }))
}

/// Log out. Tokens are stateless, so the client just discards its copy.
pub async fn logout() -> Json<Value> {
    Json(json!({ "message": "Logged out; discard the token client-side" }))
}
