//! Application bootstrap and service initialization
//!
//! Builds every backend named by the configuration in dependency order:
//! database, catalog, embeddings, miss sink, then the resolver on top.
//! A catalog that cannot be loaded at startup is fatal.

use crate::AppState;
use std::sync::Arc;
use tariftriever_catalog::{CatalogError, CatalogHandle, CatalogProvider, JsonFileCatalogProvider};
use tariftriever_config::{ApplicationConfig, CatalogSourceKind, MissSinkKind};
use tariftriever_embeddings::{
    DefaultEmbeddingService, EmbeddingError, EmbeddingService, provider_from_config,
};
use tariftriever_meta_data::{DataClient, DatabaseError};
use tariftriever_misses::{InMemoryMissSink, MissRecorder, MissSink, MissStatsSource};
use tariftriever_search::Resolver;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Database initialization failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Initial catalog load failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Embedding backend setup failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("{component} is configured for the database but no connection was set up")]
    MissingDatabase { component: &'static str },
}

pub type BootstrapResult<T> = Result<T, BootstrapError>;

/// Connect to `PostgreSQL` when any backend needs it
///
/// # Errors
/// Returns an error if the pool cannot be created or migrations fail
pub async fn setup_database(config: &ApplicationConfig) -> BootstrapResult<Option<DataClient>> {
    if !config.needs_database() {
        return Ok(None);
    }
    info!("Initializing database connection pool...");
    Ok(Some(DataClient::initialize(&config.database).await?))
}

/// # Errors
/// Returns `MissingDatabase` for a database source without a connection
pub fn setup_catalog_provider(
    config: &ApplicationConfig,
    db: Option<&DataClient>,
) -> BootstrapResult<Arc<dyn CatalogProvider>> {
    match (config.catalog.source, db) {
        (CatalogSourceKind::File, _) => {
            info!(path = %config.catalog.path.display(), "Using JSON catalog file");
            Ok(Arc::new(JsonFileCatalogProvider::new(&config.catalog.path)))
        }
        (CatalogSourceKind::Database, Some(db)) => Ok(Arc::new(db.catalog_provider())),
        (CatalogSourceKind::Database, None) => Err(BootstrapError::MissingDatabase {
            component: "catalog",
        }),
    }
}

/// Load the first catalog snapshot
///
/// # Errors
/// Returns the provider error; the service cannot start without a catalog
pub async fn setup_catalog(provider: &dyn CatalogProvider) -> BootstrapResult<Arc<CatalogHandle>> {
    let handle = CatalogHandle::new();
    handle.reload(provider).await?;
    Ok(Arc::new(handle))
}

/// # Errors
/// Returns an error if the embedding provider cannot be constructed
pub fn setup_embedding_service(
    config: &ApplicationConfig,
) -> BootstrapResult<Arc<dyn EmbeddingService>> {
    let provider = provider_from_config(&config.embedding)?;
    info!(
        model = provider.model_name(),
        dimension = provider.embedding_dimension(),
        "Embedding provider configured"
    );
    Ok(Arc::new(DefaultEmbeddingService::with_provider(provider)))
}

/// Sink that receives misses and the source that reports on them
pub struct MissBackend {
    pub sink: Arc<dyn MissSink>,
    pub stats: Arc<dyn MissStatsSource>,
}

/// # Errors
/// Returns `MissingDatabase` for a database sink without a connection
pub fn setup_miss_backend(
    config: &ApplicationConfig,
    db: Option<&DataClient>,
) -> BootstrapResult<MissBackend> {
    match (config.misses.sink, db) {
        (MissSinkKind::Memory, _) => {
            let sink = InMemoryMissSink::new();
            Ok(MissBackend {
                sink: Arc::new(sink.clone()),
                stats: Arc::new(sink),
            })
        }
        (MissSinkKind::Database, Some(db)) => {
            let sink = Arc::new(db.miss_sink());
            Ok(MissBackend {
                sink: Arc::clone(&sink) as Arc<dyn MissSink>,
                stats: sink,
            })
        }
        (MissSinkKind::Database, None) => Err(BootstrapError::MissingDatabase {
            component: "miss sink",
        }),
    }
}

/// Build the full application state. Must be called inside a Tokio runtime
/// (the miss recorder spawns its writer task).
///
/// # Errors
/// Returns an error if any backend fails to initialize
pub async fn initialize_app_state(config: &ApplicationConfig) -> BootstrapResult<AppState> {
    // 1. Database, when the catalog or the miss sink lives there
    let db = setup_database(config).await?;

    // 2. Catalog; the first load must succeed
    let catalog_provider = setup_catalog_provider(config, db.as_ref())?;
    let catalog = setup_catalog(catalog_provider.as_ref()).await?;

    // 3. Embedding backend
    let embeddings = setup_embedding_service(config)?;

    // 4. Miss recording
    let misses = setup_miss_backend(config, db.as_ref())?;
    let (recorder, _worker) = MissRecorder::spawn(misses.sink);

    // 5. Resolver
    let resolver = Resolver::new(
        &config.resolver,
        catalog,
        Arc::clone(&embeddings),
        recorder,
    );

    let state = AppState::new(Arc::new(resolver), catalog_provider, misses.stats, embeddings)
        .with_limits(config.api.max_query_chars, config.misses.stats_recent_limit);

    info!("Application state initialized successfully");
    Ok(state)
}
