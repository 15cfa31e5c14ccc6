use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::db::users::{self, UserChanges};
use crate::error::{AppError, Result};
use crate::models::{User, UserResponse, UserRole};
use crate::{security, AppState};

#[derive(Debug, Deserialize)]
pub struct ListUsersParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    /// Unknown role strings are rejected at deserialization, before any
    /// store access
    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub success: bool,
    pub message: String,
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>> {
    let user = users::get_user(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<Vec<UserResponse>>> {
    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);

    let users = users::list_users(&state.pool, skip, limit, params.role).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Partial update: only the provided fields change
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    if let Some(username) = &payload.username {
        if !User::validate_username(username) {
            return Err(AppError::Validation(
                "Username must be 3-32 characters of letters, digits, '_' or '-'".to_string(),
            ));
        }
    }
    if let Some(email) = &payload.email {
        if !User::validate_email(email) {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }
    }
    if let Some(phone) = &payload.phone_number {
        if !User::validate_phone_number(phone) {
            return Err(AppError::Validation("Invalid phone number".to_string()));
        }
    }
    let password_hash = match &payload.password {
        Some(password) => {
            if !User::validate_password(password) {
                return Err(AppError::Validation(
                    "Password must be at least 8 characters and contain a letter and a digit"
                        .to_string(),
                ));
            }
            Some(security::hash_password(password)?)
        }
        None => None,
    };

    let changes = UserChanges {
        username: payload.username,
        email: payload.email,
        phone_number: payload.phone_number,
        password_hash,
        full_name: payload.full_name,
        role: payload.role,
    };

    let user = users::update_user(&state.pool, user_id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!("User {} updated", user.id);

    Ok(Json(user.into()))
}

/// Delete a user and, via cascade, every relationship and invitation
/// referencing them
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<DeleteUserResponse>> {
    let deleted = users::delete_user(&state.pool, user_id).await?;
    if !deleted {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!("User {} deleted", user_id);

    Ok(Json(DeleteUserResponse {
        success: true,
        message: "User and all associated data deleted".to_string(),
    }))
}
