use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::AppError;
use crate::models::User;
use crate::{db, security, AppState};

/// Authenticated caller, resolved from the bearer token.
///
/// The `sub` claim is looked up against the user directory on every request;
/// a valid token whose user has since been deleted yields 404.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let mut pieces = header_value.split_whitespace();
        let token = match (pieces.next(), pieces.next(), pieces.next()) {
            (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => token,
            _ => {
                return Err(AppError::Unauthorized(
                    "Authorization header must be of the form 'Bearer <token>'".to_string(),
                ))
            }
        };

        let user_id = security::decode_access_token(token, &state.config.jwt_secret)?;

        let user = db::users::get_user(&state.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(CurrentUser(user))
    }
}
