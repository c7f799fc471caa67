//! Atomic snapshot holder

use crate::{Catalog, CatalogEntry, CatalogError, CatalogProvider, CatalogResult, LoadReport};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Shared owner of the current catalog snapshot.
///
/// `snapshot()` hands out the current `Arc<Catalog>`; a swap replaces the
/// pointer in one step, so a reader holds either the old or the new catalog
/// for as long as it keeps its `Arc`.
#[derive(Debug, Default)]
pub struct CatalogHandle {
    current: RwLock<Option<Arc<Catalog>>>,
    generation: AtomicU64,
}

impl CatalogHandle {
    /// Empty handle; `snapshot()` fails until something is installed
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle with an initial catalog built from `entries`
    ///
    /// # Errors
    /// Returns `CatalogError::Empty` if none of the entries are valid
    pub fn from_entries(
        entries: impl IntoIterator<Item = CatalogEntry>,
        source_name: &str,
    ) -> CatalogResult<Self> {
        let handle = Self::new();
        handle.install(entries, source_name)?;
        Ok(handle)
    }

    /// Current snapshot
    ///
    /// # Errors
    /// Returns `CatalogError::NotLoaded` before the first successful install
    pub fn snapshot(&self) -> CatalogResult<Arc<Catalog>> {
        let guard = match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.as_ref().map(Arc::clone).ok_or(CatalogError::NotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_ok()
    }

    /// Build a new snapshot from `entries` and swap it in
    ///
    /// # Errors
    /// Returns `CatalogError::Empty` when no entry survives validation; the
    /// previous snapshot is left untouched in that case.
    pub fn install(
        &self,
        entries: impl IntoIterator<Item = CatalogEntry>,
        source_name: &str,
    ) -> CatalogResult<(Arc<Catalog>, LoadReport)> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst).wrapping_add(1);
        let (catalog, report) = Catalog::from_entries(entries, source_name, generation);

        if catalog.is_empty() {
            return Err(CatalogError::Empty {
                source_name: source_name.to_string(),
            });
        }

        let catalog = Arc::new(catalog);
        {
            let mut guard = match self.current.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *guard = Some(Arc::clone(&catalog));
        }

        tracing::info!(
            source = %source_name,
            generation,
            entries = report.accepted,
            with_embeddings = catalog.embedded_count(),
            skipped_invalid = report.invalid_codes,
            skipped_duplicates = report.duplicate_codes,
            dropped_embeddings = report.dropped_embeddings,
            "Catalog snapshot installed"
        );

        Ok((catalog, report))
    }

    /// Load from `provider` and swap the result in
    ///
    /// # Errors
    /// Returns the provider error or `CatalogError::Empty`; on error the
    /// previous snapshot remains active.
    pub async fn reload(&self, provider: &dyn CatalogProvider) -> CatalogResult<Arc<Catalog>> {
        let entries = provider.load().await.inspect_err(|e| {
            tracing::error!(source = provider.name(), error = %e, "Catalog load failed");
        })?;

        let (catalog, _) = self.install(entries, provider.name())?;
        Ok(catalog)
    }
}
