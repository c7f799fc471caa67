//! Database migration utilities

use crate::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use std::time::Duration;

const MAX_CONNECT_ATTEMPTS: u32 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Run all pending database migrations
///
/// # Errors
/// Returns `DatabaseError::MigrationFailed` if any migration cannot be applied
pub async fn run_migrations(pool: &PgPool) -> DatabaseResult<()> {
    tracing::info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|source| DatabaseError::MigrationFailed {
            message: source.to_string(),
            source,
        })?;

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Wait for the database to accept connections, then migrate
///
/// # Errors
/// Returns the last connection error once all attempts are exhausted, or the
/// migration error if migrating fails
pub async fn wait_for_migrations(
    config: &tariftriever_config::DatabaseConfig,
) -> DatabaseResult<PgPool> {
    let mut attempt = 1_u32;
    let pool = loop {
        match config.create_pool().await {
            Ok(pool) => break pool,
            Err(e) if attempt < MAX_CONNECT_ATTEMPTS => {
                tracing::warn!(
                    attempt,
                    max_attempts = MAX_CONNECT_ATTEMPTS,
                    error = %e,
                    "Database not ready"
                );
                attempt = attempt.saturating_add(1);
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(e) => return Err(DatabaseError::pool_creation_failed(e)),
        }
    };

    run_migrations(&pool).await?;
    Ok(pool)
}
