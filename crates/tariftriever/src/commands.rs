//! Subcommand implementations

use crate::output;
use anyhow::Context;
use tariftriever_api::bootstrap::{
    setup_catalog, setup_catalog_provider, setup_database, setup_embedding_service,
    setup_miss_backend,
};
use tariftriever_common::Language;
use tariftriever_config::{ApplicationConfig, MissSinkKind};
use tariftriever_meta_data::run_migrations;
use tariftriever_misses::MissRecorder;
use tariftriever_search::{Query, Resolver};
use tracing::{info, warn};

/// # Errors
/// Returns an error if startup fails or the listener cannot be bound
pub async fn serve(config: &ApplicationConfig, addr: Option<String>) -> anyhow::Result<()> {
    let state = tariftriever_api::initialize_app_state(config)
        .await
        .context("Failed to initialize application state")?;

    let address = addr.unwrap_or_else(|| config.api.bind_address());
    tariftriever_api::serve(state, &address)
        .await
        .with_context(|| format!("API server on {address} failed"))
}

/// Resolve one query, print the candidates and flush a miss before exiting
///
/// # Errors
/// Returns an error if the catalog or a configured backend cannot be set up
pub async fn resolve(
    config: &ApplicationConfig,
    text: String,
    language: Language,
    user_id: Option<i64>,
) -> anyhow::Result<()> {
    let db = setup_database(config).await?;
    let provider = setup_catalog_provider(config, db.as_ref())?;
    let catalog = setup_catalog(provider.as_ref()).await?;
    let embeddings = setup_embedding_service(config)?;
    let misses = setup_miss_backend(config, db.as_ref())?;
    let (recorder, miss_writer) = MissRecorder::spawn(misses.sink);

    let resolver = Resolver::new(&config.resolver, catalog, embeddings, recorder);
    let query = Query::new(text, language)
        .with_user(user_id)
        .with_source("cli");
    let resolution = resolver.resolve(&query).await?;

    print!("{}", output::render_resolution(&query.raw_text, &resolution));

    // Closing the recorder lets the writer drain the queue and stop
    drop(resolver);
    miss_writer.await.context("Miss writer task failed")?;
    Ok(())
}

/// # Errors
/// Returns an error if the miss store cannot be reached or queried
pub async fn stats(config: &ApplicationConfig, recent: Option<usize>) -> anyhow::Result<()> {
    if config.misses.sink == MissSinkKind::Memory {
        warn!("Miss sink is in-memory; this process has no recorded history");
    }

    let db = setup_database(config).await?;
    let misses = setup_miss_backend(config, db.as_ref())?;
    let stats = misses
        .stats
        .stats(recent.unwrap_or(config.misses.stats_recent_limit))
        .await
        .context("Failed to compute miss statistics")?;

    print!("{}", output::render_stats(&stats));
    Ok(())
}

/// # Errors
/// Returns an error if the database is unreachable or a migration fails
pub async fn migrate(config: &ApplicationConfig) -> anyhow::Result<()> {
    info!(
        database = %config.database.safe_connection_string(),
        "Applying migrations"
    );
    let pool = config
        .database
        .create_pool()
        .await
        .context("Failed to connect to PostgreSQL")?;
    run_migrations(&pool).await?;
    println!("Migrations applied");
    Ok(())
}
