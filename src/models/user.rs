use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User role: seniors issue invitation codes, guardians redeem them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Senior,
    Guardian,
}

/// User record as stored in the database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// User view for API responses (never exposes the password hash)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            full_name: user.full_name,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl User {
    /// Display name shown to other family members: full name, falling back
    /// to the username
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }

    /// Validate username: 3-32 characters, alphanumeric plus `_` and `-`
    pub fn validate_username(username: &str) -> bool {
        (3..=32).contains(&username.len())
            && username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    /// Validate email shape: one `@`, non-empty local part, dotted domain
    pub fn validate_email(email: &str) -> bool {
        if email.is_empty() || email.len() > 254 {
            return false;
        }
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        !local.is_empty()
            && !domain.is_empty()
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && domain.contains('.')
            && !email.chars().any(char::is_whitespace)
    }

    /// Validate phone number: optional leading `+`, then 9-15 digits
    /// (separators `-` and spaces allowed)
    pub fn validate_phone_number(phone: &str) -> bool {
        let rest = phone.strip_prefix('+').unwrap_or(phone);
        let digits = rest.chars().filter(char::is_ascii_digit).count();
        (9..=15).contains(&digits)
            && rest
                .chars()
                .all(|c| c.is_ascii_digit() || c == '-' || c == ' ')
    }

    /// Validate password complexity: at least 8 characters with at least one
    /// letter and one digit
    pub fn validate_password(password: &str) -> bool {
        password.len() >= 8
            && password.chars().any(|c| c.is_ascii_alphabetic())
            && password.chars().any(|c| c.is_ascii_digit())
    }
}
