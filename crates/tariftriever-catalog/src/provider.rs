//! Catalog provider capability and the JSON file implementation

use crate::{CatalogEntry, CatalogError, CatalogResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Anything that can produce the full set of catalog rows.
///
/// Providers are read-only; validation and deduplication happen when the
/// rows are turned into a [`crate::Catalog`].
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Load every catalog row
    ///
    /// # Errors
    /// Returns `CatalogError::Unavailable` when the backing store cannot be read
    async fn load(&self) -> CatalogResult<Vec<CatalogEntry>>;

    /// Human readable source name for logs and reports
    fn name(&self) -> &str;
}

/// Reads a JSON array of `{"code", "description", "embedding"?}` objects
pub struct JsonFileCatalogProvider {
    path: PathBuf,
    name: String,
}

impl JsonFileCatalogProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = format!("json_file:{}", path.display());
        Self { path, name }
    }
}

#[async_trait]
impl CatalogProvider for JsonFileCatalogProvider {
    async fn load(&self) -> CatalogResult<Vec<CatalogEntry>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CatalogError::unavailable(&self.name, e))?;

        serde_json::from_str(&content).map_err(|e| CatalogError::unavailable(&self.name, e))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
