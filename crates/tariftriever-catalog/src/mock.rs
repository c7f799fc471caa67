//! In-memory catalog provider for tests

use crate::{CatalogEntry, CatalogError, CatalogProvider, CatalogResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Provider serving a fixed list of entries
#[derive(Clone, Default)]
pub struct MockCatalogProvider {
    entries: Arc<Mutex<Vec<CatalogEntry>>>,
    fail: Arc<AtomicBool>,
    loads: Arc<AtomicUsize>,
}

impl MockCatalogProvider {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
            ..Self::default()
        }
    }

    /// Every load fails until `set_failing(false)`
    #[must_use]
    pub fn with_failure(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Replace what the next load returns
    pub fn set_entries(&self, entries: Vec<CatalogEntry>) {
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = entries;
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogProvider for MockCatalogProvider {
    async fn load(&self) -> CatalogResult<Vec<CatalogEntry>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(CatalogError::unavailable("mock", "simulated failure"));
        }
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
