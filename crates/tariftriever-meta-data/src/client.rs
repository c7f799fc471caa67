//! Database client bundling the pool with the repositories built on it

use crate::{DatabaseError, DatabaseResult, PgCatalogProvider, PgMissSink, run_migrations};
use sqlx::PgPool;
use tariftriever_config::DatabaseConfig;

/// Shared handle to the `PostgreSQL` layer
#[derive(Clone)]
pub struct DataClient {
    pool: PgPool,
}

impl DataClient {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using `config` and apply migrations when `auto_migrate` is set
    ///
    /// # Errors
    /// Returns `DatabaseError::PoolCreationFailed` if the pool cannot be
    /// created, or `DatabaseError::MigrationFailed` if migrating fails
    pub async fn initialize(config: &DatabaseConfig) -> DatabaseResult<Self> {
        tracing::info!(
            database = %config.safe_connection_string(),
            "Connecting to PostgreSQL"
        );

        let pool = config
            .create_pool()
            .await
            .map_err(DatabaseError::pool_creation_failed)?;

        if config.auto_migrate {
            run_migrations(&pool).await?;
        }

        Ok(Self::new(pool))
    }

    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn catalog_provider(&self) -> PgCatalogProvider {
        PgCatalogProvider::new(self.pool.clone())
    }

    pub fn miss_sink(&self) -> PgMissSink {
        PgMissSink::new(self.pool.clone())
    }
}
