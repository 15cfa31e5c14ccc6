use sqlx::PgPool;

use crate::db::{is_unique_violation, with_retry};
use crate::error::{AppError, Result};
use crate::models::{User, UserRole};

/// Fields for a new user row; the password arrives already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: UserRole,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
}

/// Insert a new user. Uniqueness violations on username/email/phone surface
/// as `Conflict`.
pub async fn create_user(pool: &PgPool, new_user: &NewUser) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, phone_number, password_hash, full_name, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, username, email, phone_number, password_hash, full_name, role, created_at, updated_at
        "#,
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.phone_number)
    .bind(&new_user.password_hash)
    .bind(&new_user.full_name)
    .bind(new_user.role)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Username, email, or phone number already in use".to_string())
        } else {
            e.into()
        }
    })?;

    Ok(user)
}

pub async fn get_user(pool: &PgPool, user_id: i64) -> Result<Option<User>> {
    with_retry(|| {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, phone_number, password_hash, full_name, role, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
    })
    .await
}

pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    with_retry(|| {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, phone_number, password_hash, full_name, role, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(pool)
    })
    .await
}

/// Paged listing, optionally filtered by role
pub async fn list_users(
    pool: &PgPool,
    skip: i64,
    limit: i64,
    role: Option<UserRole>,
) -> Result<Vec<User>> {
    let users = match role {
        Some(role) => {
            sqlx::query_as::<_, User>(
                "SELECT id, username, email, phone_number, password_hash, full_name, role, created_at, updated_at FROM users WHERE role = $1 ORDER BY id LIMIT $2 OFFSET $3",
            )
            .bind(role)
            .bind(limit)
            .bind(skip)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, User>(
                "SELECT id, username, email, phone_number, password_hash, full_name, role, created_at, updated_at FROM users ORDER BY id LIMIT $1 OFFSET $2",
            )
            .bind(limit)
            .bind(skip)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(users)
}

/// Apply a partial update, field by field. Returns the updated row, or
/// `None` if the id does not resolve.
pub async fn update_user(
    pool: &PgPool,
    user_id: i64,
    changes: &UserChanges,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            username = COALESCE($2, username),
            email = COALESCE($3, email),
            phone_number = COALESCE($4, phone_number),
            password_hash = COALESCE($5, password_hash),
            full_name = COALESCE($6, full_name),
            role = COALESCE($7, role),
            updated_at = now()
        WHERE id = $1
        RETURNING id, username, email, phone_number, password_hash, full_name, role, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&changes.username)
    .bind(&changes.email)
    .bind(&changes.phone_number)
    .bind(&changes.password_hash)
    .bind(&changes.full_name)
    .bind(changes.role)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Username, email, or phone number already in use".to_string())
        } else {
            e.into()
        }
    })?;

    Ok(user)
}

/// Delete a user. Family relationships and invitations referencing the user
/// are removed by the store's cascade rules.
pub async fn delete_user(pool: &PgPool, user_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
