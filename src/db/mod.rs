pub mod invitations;
pub mod relationships;
pub mod users;

use std::future::Future;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::constants::{DB_RETRY_BACKOFF_MS, MAX_DB_RETRIES};
use crate::error::{AppError, Result};

/// Create a PostgreSQL connection pool
pub async fn create_pool(database_url: &str) -> std::result::Result<PgPool, sqlx::Error> {
    tracing::info!("Creating database connection pool...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");

    Ok(pool)
}

/// Whether an error is a transient connectivity failure worth retrying
fn is_transient(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
    )
}

/// Whether an error is a Postgres unique-constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Run a store operation, retrying transient connectivity errors with fixed
/// backoff. Validation failures never reach this path; anything still failing
/// after the final attempt surfaces as `Unavailable`.
pub async fn with_retry<T, F, Fut>(mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    let mut attempts = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if is_transient(&err) => {
                attempts += 1;
                if attempts > MAX_DB_RETRIES {
                    tracing::error!("Database unavailable after {} retries: {}", MAX_DB_RETRIES, err);
                    return Err(AppError::Unavailable);
                }
                tracing::warn!(
                    "Transient database error (attempt {}/{}): {}",
                    attempts,
                    MAX_DB_RETRIES,
                    err
                );
                tokio::time::sleep(Duration::from_millis(DB_RETRY_BACKOFF_MS)).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}
