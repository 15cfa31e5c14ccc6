use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// JWT claims carried by every bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id, stringified
    pub sub: String,
    /// Expiry as Unix timestamp
    pub exp: usize,
}

/// Hash a plaintext password with argon2 (PHC string format)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Issue a bearer token for the given user id
pub fn create_access_token(user_id: i64, secret: &str, expire_minutes: i64) -> Result<String> {
    let expiration = Utc::now() + Duration::minutes(expire_minutes);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Decode and validate a bearer token, returning the user id from the `sub` claim
pub fn decode_access_token(token: &str, secret: &str) -> Result<i64> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    data.claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::Unauthorized("Token subject is not a valid user id".to_string()))
}
