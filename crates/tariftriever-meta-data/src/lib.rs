//! Tariftriever `PostgreSQL` layer
//!
//! Hosts the catalog table provider, the miss log sink and the migrations
//! that create both tables.

pub mod catalog;
pub mod client;
pub mod error;
pub mod migrations;
pub mod misses;

pub use catalog::PgCatalogProvider;
pub use client::DataClient;
pub use error::{DatabaseError, DatabaseErrorExt, DatabaseOperation, DatabaseResult};
pub use migrations::{run_migrations, wait_for_migrations};
pub use misses::PgMissSink;
pub use tariftriever_config::DatabaseConfig;
