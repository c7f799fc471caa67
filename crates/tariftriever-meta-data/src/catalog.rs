//! `PostgreSQL` backed catalog provider

use crate::{DatabaseErrorExt, DatabaseOperation, DatabaseResult};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tariftriever_catalog::{CatalogEntry, CatalogError, CatalogProvider, CatalogResult};

const PROVIDER_NAME: &str = "postgres:tariff_codes";

/// Loads catalog rows from the `tariff_codes` table in insertion order
#[derive(Clone)]
pub struct PgCatalogProvider {
    pool: PgPool,
}

impl PgCatalogProvider {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch every row ordered by insertion position
    ///
    /// # Errors
    /// Returns `DatabaseError` if the query fails
    pub async fn fetch_entries(&self) -> DatabaseResult<Vec<CatalogEntry>> {
        let rows = sqlx::query(
            "SELECT code, description, embedding FROM tariff_codes ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await
        .map_db_err(DatabaseOperation::LoadCatalog)?;

        rows.iter()
            .map(|row| {
                let embedding: Option<Vec<f32>> = row.try_get("embedding")?;
                Ok(CatalogEntry {
                    code: row.try_get("code")?,
                    description: row.try_get("description")?,
                    embedding,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_db_err(DatabaseOperation::LoadCatalog)
    }

    /// Number of rows currently stored
    ///
    /// # Errors
    /// Returns `DatabaseError` if the query fails
    pub async fn count(&self) -> DatabaseResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM tariff_codes")
            .fetch_one(&self.pool)
            .await
            .map_db_err(DatabaseOperation::CountCatalog)?;

        row.try_get("count")
            .map_db_err(DatabaseOperation::CountCatalog)
    }
}

#[async_trait]
impl CatalogProvider for PgCatalogProvider {
    async fn load(&self) -> CatalogResult<Vec<CatalogEntry>> {
        self.fetch_entries()
            .await
            .map_err(|e| CatalogError::unavailable(PROVIDER_NAME, e))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}
