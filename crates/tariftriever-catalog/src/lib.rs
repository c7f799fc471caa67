//! Tariff catalog snapshots
//!
//! The catalog is loaded once, held as an immutable [`Catalog`] behind an
//! `Arc`, and replaced wholesale through [`CatalogHandle`]. Readers never lock
//! anything beyond cloning the current `Arc`.

pub mod entry;
pub mod error;
pub mod handle;
pub mod provider;
pub mod snapshot;

pub use entry::{CatalogEntry, is_valid_code};
pub use error::{CatalogError, CatalogResult};
pub use handle::CatalogHandle;
pub use provider::{CatalogProvider, JsonFileCatalogProvider};
pub use snapshot::{Catalog, LoadReport};

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockCatalogProvider;
