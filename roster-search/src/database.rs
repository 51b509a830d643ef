//! Database connection pool management

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::time::Duration;

use crate::{
    config::DatabaseConfig,
    error::{sanitize_url, DatabaseError, DatabaseErrorKind, Result},
    store::SqliteStore,
};

/// Create a SQLite connection pool with retry logic
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    create_pool_with_retries(config, config.max_retries).await
}

/// Connect and wrap the pool in a store, creating the schema when configured to
pub async fn connect(config: &DatabaseConfig) -> Result<SqliteStore> {
    let store = SqliteStore::new(create_pool(config).await?);
    if config.create_schema {
        store.ensure_schema().await?;
    }
    Ok(store)
}

/// Create a SQLite connection pool with configurable retries
///
/// Uses exponential backoff strategy for retries
async fn create_pool_with_retries(config: &DatabaseConfig, max_retries: u32) -> Result<SqlitePool> {
    let mut attempt = 0;
    let base_delay = config.retry_delay();

    loop {
        match try_create_pool(config).await {
            Ok(pool) => {
                if attempt > 0 {
                    tracing::info!(
                        "Database connection established after {} attempt(s)",
                        attempt + 1
                    );
                } else {
                    tracing::info!(
                        "Database connection pool created: max={}, min={}",
                        config.max_connections,
                        config.min_connections
                    );
                }
                return Ok(pool);
            }
            Err(e) => {
                attempt += 1;

                if attempt > max_retries || !worth_retrying(&e) {
                    tracing::error!(
                        "Failed to connect to database after {} attempt(s): {}",
                        attempt,
                        e
                    );
                    return Err(e.into());
                }

                let delay = backoff_delay(base_delay, attempt);

                tracing::warn!(
                    "Database connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Delay before retry number `attempt` (1-based): the base delay doubled per prior retry
fn backoff_delay(base_delay: Duration, attempt: u32) -> Duration {
    let delay_multiplier = 2_u32.saturating_pow(attempt.saturating_sub(1));
    base_delay.saturating_mul(delay_multiplier)
}

/// Attempt to create a database pool (single try)
async fn try_create_pool(config: &DatabaseConfig) -> std::result::Result<SqlitePool, DatabaseError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connection_timeout())
        .connect(&config.url)
        .await
        .map_err(|e| {
            let reason = categorize_db_error(&e);
            DatabaseError::from(e).add_context(format!(
                "{} at '{}' (url format: sqlite://path/to/file.db?mode=rwc or sqlite::memory:)",
                reason,
                sanitize_url(&config.url)
            ))
        })?;

    Ok(pool)
}

/// Categorize database error for better user guidance
fn categorize_db_error(err: &sqlx::Error) -> &'static str {
    use sqlx::Error;
    match err {
        Error::Configuration(_) => "Configuration error",
        Error::Database(_) => "Database open error",
        Error::Io(_) => "File I/O error - check the path and its permissions",
        Error::PoolTimedOut => "Connection pool timeout - database may be locked",
        Error::PoolClosed => "Connection pool closed",
        Error::WorkerCrashed => "Database worker crashed",
        _ => "Connection error",
    }
}

/// A malformed URL fails the same way on every attempt
fn worth_retrying(err: &DatabaseError) -> bool {
    !matches!(err.kind, DatabaseErrorKind::Configuration)
}
