//! Tariftriever embedding backends
//!
//! The semantic tier only needs `embed(text) -> vector`. The model itself is
//! an external service; this crate wraps it behind [`EmbeddingProvider`] and
//! adds vector validation and usage statistics in [`EmbeddingService`].

pub mod error;
pub mod providers;
pub mod service;
pub mod similarity;
pub mod traits;

pub use error::{EmbeddingError, EmbeddingResult};
pub use providers::{DisabledEmbeddingProvider, RemoteEmbeddingProvider, provider_from_config};
pub use service::DefaultEmbeddingService;
pub use similarity::cosine_similarity;
pub use traits::{EmbeddingProvider, EmbeddingService, EmbeddingStats};

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockEmbeddingProvider;
