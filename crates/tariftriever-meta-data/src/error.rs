//! Structured error handling for the `PostgreSQL` layer
//!
//! Every failure carries the operation that produced it, so a log line says
//! which table and statement broke.

use std::fmt;
use thiserror::Error;

/// Result type alias for database operations
pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

/// Database operation type for error context
#[derive(Debug, Clone)]
pub enum DatabaseOperation {
    /// Catalog operations
    LoadCatalog,
    CountCatalog,

    /// Miss log operations
    AppendMiss { language: String, source: String },
    MissStats { recent_limit: usize },

    /// Generic operations
    Query { description: String },
    Migration,
}

impl fmt::Display for DatabaseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadCatalog => write!(f, "load_catalog"),
            Self::CountCatalog => write!(f, "count_catalog"),
            Self::AppendMiss { language, source } => {
                write!(f, "append_miss(lang={language}, source={source})")
            }
            Self::MissStats { recent_limit } => write!(f, "miss_stats(recent={recent_limit})"),
            Self::Query { description } => write!(f, "query({description})"),
            Self::Migration => write!(f, "migration"),
        }
    }
}

/// Database error with operation context
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection pool creation failed
    #[error("Failed to create connection pool: {message}")]
    PoolCreationFailed {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    /// Query timeout
    #[error("Query timeout for operation '{operation}'")]
    QueryTimeout {
        operation: Box<DatabaseOperation>,
        #[source]
        source: sqlx::Error,
    },

    /// Query execution error
    #[error("Query failed for operation '{operation}': {message}")]
    QueryFailed {
        operation: Box<DatabaseOperation>,
        message: String,
        #[source]
        source: sqlx::Error,
    },

    /// Constraint violation
    #[error("Database constraint violation: {constraint} (operation='{operation}')")]
    ConstraintViolation {
        constraint: String,
        operation: Box<DatabaseOperation>,
        #[source]
        source: sqlx::Error,
    },

    /// Migration error
    #[error("Database migration failed: {message}")]
    MigrationFailed {
        message: String,
        #[source]
        source: sqlx::migrate::MigrateError,
    },

    /// Configuration error
    #[error("Database configuration error: {message}")]
    ConfigurationError { message: String },
}

impl DatabaseError {
    /// Create a query error from `sqlx::Error`, classifying constraint and timeout failures
    pub fn query_failed(operation: DatabaseOperation, source: sqlx::Error) -> Self {
        if let Some(constraint) = source
            .as_database_error()
            .and_then(|db_err| db_err.constraint())
        {
            return Self::ConstraintViolation {
                constraint: constraint.to_string(),
                operation: Box::new(operation),
                source,
            };
        }

        if matches!(source, sqlx::Error::PoolTimedOut) {
            return Self::QueryTimeout {
                operation: Box::new(operation),
                source,
            };
        }

        Self::QueryFailed {
            operation: Box::new(operation),
            message: source.to_string(),
            source,
        }
    }

    pub fn pool_creation_failed(source: sqlx::Error) -> Self {
        Self::PoolCreationFailed {
            message: source.to_string(),
            source,
        }
    }
}

/// Extension trait for converting sqlx errors with context
pub trait DatabaseErrorExt<T> {
    /// Convert to `DatabaseError` with operation context
    ///
    /// # Errors
    /// Returns `DatabaseError` with operation context
    fn map_db_err(self, operation: DatabaseOperation) -> DatabaseResult<T>;
}

impl<T> DatabaseErrorExt<T> for std::result::Result<T, sqlx::Error> {
    fn map_db_err(self, operation: DatabaseOperation) -> DatabaseResult<T> {
        self.map_err(|e| DatabaseError::query_failed(operation, e))
    }
}
