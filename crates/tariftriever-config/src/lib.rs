//! Centralized configuration management for tariftriever
//!
//! Configuration follows a simple hierarchy:
//! 1. Safe defaults (defined as constants)
//! 2. Optional profile adjustments
//! 3. Optional TOML/YAML file
//! 4. `TARIFTRIEVER_*` environment variable overrides
//! 5. Runtime validation
//!
//! Every resolver threshold lives here so tuning never needs a code change.

pub mod error;
pub mod profile;
pub mod source;
pub mod validation;
pub mod vocabulary;

pub use error::{ConfigError, ConfigResult};
pub use profile::Profile;

use serde::{Deserialize, Serialize};
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tariftriever_common::LogFormat;

// =============================================================================
// SAFE DEFAULTS - Work for any environment (dev, staging, prod, test)
// =============================================================================

// Query normalisation
const DEFAULT_MIN_CODE_DIGITS: usize = 2;
const DEFAULT_MAX_CODE_DIGITS: usize = 10;

// Exact tier
const DEFAULT_MIN_PREFIX_LEN: usize = 2;
const DEFAULT_MAX_PREFIX_RESULTS: usize = 4;
const DEFAULT_EXACT_CONFIDENCE_THRESHOLD: f32 = 0.9;

// Lexical tier
const DEFAULT_LEXICAL_MIN_OVERLAP: f32 = 0.5;
const DEFAULT_LEXICAL_LENGTH_PIVOT: usize = 8;
const DEFAULT_LEXICAL_MAX_CANDIDATES: usize = 20;
const DEFAULT_LEXICAL_CONFIDENCE_THRESHOLD: f32 = 0.3;

// Semantic tier
const DEFAULT_SEMANTIC_THRESHOLD: f32 = 0.55;
const DEFAULT_SEMANTIC_TOP_K: usize = 10;
const DEFAULT_SEMANTIC_TIMEOUT_MS: u64 = 2000;

// Aggregation
const DEFAULT_TOP_N: usize = 10;
const DEFAULT_RESULT_CACHE_CAPACITY: usize = 1024;

// Embedding backend
const DEFAULT_EMBEDDING_URL: &str = "http://localhost:8081/v1/embeddings";
const DEFAULT_EMBEDDING_MODEL: &str = "intfloat/multilingual-e5-small";
const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
const DEFAULT_EMBEDDING_TIMEOUT_SECONDS: u64 = 10;

// Catalog
const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";

// Misses
const DEFAULT_MISS_STATS_RECENT_LIMIT: usize = 20;

// Database Configuration (safe local defaults)
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_NAME: &str = "tariftriever";
const DEFAULT_DB_USER: &str = "tariftriever";
const DEFAULT_DB_PASSWORD: &str = "localdev123";
const DEFAULT_DB_SSL_MODE: &str = "disable";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DB_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_DB_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_DB_IDLE_TIMEOUT_SECONDS: u64 = 300;
const DEFAULT_AUTO_MIGRATE: bool = true;

// API Server Configuration
const DEFAULT_API_HOST: &str = "127.0.0.1"; // Localhost only for security
const DEFAULT_API_PORT: u16 = 8080;
const DEFAULT_API_MAX_QUERY_CHARS: usize = 512;

// Telemetry Configuration
const DEFAULT_TRACING_LEVEL: &str = "info";
const DEFAULT_TELEMETRY_SERVICE_NAME: &str = "tariftriever";

/// Overwrite `target` when `key` is set and parses; otherwise leave it alone.
fn override_from_env<T: FromStr>(target: &mut T, key: &str) {
    if let Some(value) = std::env::var(key).ok().and_then(|s| s.parse().ok()) {
        *target = value;
    }
}

/// Core configuration for the entire tariftriever application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Tier thresholds and limits for query resolution
    pub resolver: ResolverConfig,

    /// Embedding backend used by the semantic tier
    pub embedding: EmbeddingConfig,

    /// Where the catalog snapshot comes from
    pub catalog: CatalogConfig,

    /// Where miss records go
    pub misses: MissConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// API server configuration
    pub api: ApiConfig,

    /// Logging configuration
    pub telemetry: TelemetryConfig,
}

/// Tunable thresholds for the tiered resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Fewest digits a query needs to be treated as a code
    pub min_code_digits: usize,
    /// Most digits a code query may have
    pub max_code_digits: usize,
    /// Shortest digit string that may match a code family by prefix
    pub min_prefix_len: usize,
    /// Cap on prefix family results
    pub max_prefix_results: usize,
    /// Exact-tier score at which resolution stops immediately
    pub exact_confidence_threshold: f32,
    /// Fraction of query tokens a description must contain
    pub lexical_min_overlap: f32,
    /// Description length (tokens) above which lexical scores are discounted
    pub lexical_length_pivot: usize,
    /// Cap on lexical candidates
    pub lexical_max_candidates: usize,
    /// Lexical score at which the semantic tier is skipped
    pub lexical_confidence_threshold: f32,
    /// Minimum cosine similarity for a semantic candidate
    pub semantic_threshold: f32,
    /// Cap on semantic candidates
    pub semantic_top_k: usize,
    /// Time box for the semantic tier, embedding call included
    pub semantic_timeout_ms: u64,
    /// Cap on the final result list
    pub top_n: usize,
    /// Capacity of the resolved-query cache; zero disables it
    pub cache_capacity: usize,
    /// Phrases dropped from free-text queries before matching
    pub administrative_terms: Vec<String>,
    /// Base form to the inflections and misspellings folded onto it
    pub word_variations: BTreeMap<String, Vec<String>>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_code_digits: DEFAULT_MIN_CODE_DIGITS,
            max_code_digits: DEFAULT_MAX_CODE_DIGITS,
            min_prefix_len: DEFAULT_MIN_PREFIX_LEN,
            max_prefix_results: DEFAULT_MAX_PREFIX_RESULTS,
            exact_confidence_threshold: DEFAULT_EXACT_CONFIDENCE_THRESHOLD,
            lexical_min_overlap: DEFAULT_LEXICAL_MIN_OVERLAP,
            lexical_length_pivot: DEFAULT_LEXICAL_LENGTH_PIVOT,
            lexical_max_candidates: DEFAULT_LEXICAL_MAX_CANDIDATES,
            lexical_confidence_threshold: DEFAULT_LEXICAL_CONFIDENCE_THRESHOLD,
            semantic_threshold: DEFAULT_SEMANTIC_THRESHOLD,
            semantic_top_k: DEFAULT_SEMANTIC_TOP_K,
            semantic_timeout_ms: DEFAULT_SEMANTIC_TIMEOUT_MS,
            top_n: DEFAULT_TOP_N,
            cache_capacity: DEFAULT_RESULT_CACHE_CAPACITY,
            administrative_terms: vocabulary::default_administrative_terms(),
            word_variations: vocabulary::default_word_variations(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        override_from_env(&mut self.min_code_digits, "TARIFTRIEVER_RESOLVER_MIN_CODE_DIGITS");
        override_from_env(&mut self.max_code_digits, "TARIFTRIEVER_RESOLVER_MAX_CODE_DIGITS");
        override_from_env(&mut self.min_prefix_len, "TARIFTRIEVER_RESOLVER_MIN_PREFIX_LEN");
        override_from_env(
            &mut self.max_prefix_results,
            "TARIFTRIEVER_RESOLVER_MAX_PREFIX_RESULTS",
        );
        override_from_env(
            &mut self.exact_confidence_threshold,
            "TARIFTRIEVER_RESOLVER_EXACT_CONFIDENCE_THRESHOLD",
        );
        override_from_env(
            &mut self.lexical_min_overlap,
            "TARIFTRIEVER_RESOLVER_LEXICAL_MIN_OVERLAP",
        );
        override_from_env(
            &mut self.lexical_length_pivot,
            "TARIFTRIEVER_RESOLVER_LEXICAL_LENGTH_PIVOT",
        );
        override_from_env(
            &mut self.lexical_max_candidates,
            "TARIFTRIEVER_RESOLVER_LEXICAL_MAX_CANDIDATES",
        );
        override_from_env(
            &mut self.lexical_confidence_threshold,
            "TARIFTRIEVER_RESOLVER_LEXICAL_CONFIDENCE_THRESHOLD",
        );
        override_from_env(
            &mut self.semantic_threshold,
            "TARIFTRIEVER_RESOLVER_SEMANTIC_THRESHOLD",
        );
        override_from_env(&mut self.semantic_top_k, "TARIFTRIEVER_RESOLVER_SEMANTIC_TOP_K");
        override_from_env(
            &mut self.semantic_timeout_ms,
            "TARIFTRIEVER_RESOLVER_SEMANTIC_TIMEOUT_MS",
        );
        override_from_env(&mut self.top_n, "TARIFTRIEVER_RESOLVER_TOP_N");
        override_from_env(&mut self.cache_capacity, "TARIFTRIEVER_RESOLVER_CACHE_CAPACITY");
    }

    pub const fn semantic_timeout(&self) -> Duration {
        Duration::from_millis(self.semantic_timeout_ms)
    }
}

impl validation::Validate for ResolverConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_range(self.min_code_digits as u64, 1, 10, "min_code_digits")?;
        validation::validate_range(
            self.max_code_digits as u64,
            self.min_code_digits as u64,
            20,
            "max_code_digits",
        )?;
        validation::validate_range(
            self.min_prefix_len as u64,
            1,
            self.max_code_digits as u64,
            "min_prefix_len",
        )?;
        validation::validate_range(self.max_prefix_results as u64, 1, 100, "max_prefix_results")?;
        validation::validate_fraction(
            self.exact_confidence_threshold,
            "exact_confidence_threshold",
        )?;
        validation::validate_fraction(self.lexical_min_overlap, "lexical_min_overlap")?;
        validation::validate_range(
            self.lexical_length_pivot as u64,
            1,
            1000,
            "lexical_length_pivot",
        )?;
        validation::validate_range(
            self.lexical_max_candidates as u64,
            1,
            1000,
            "lexical_max_candidates",
        )?;
        validation::validate_fraction(
            self.lexical_confidence_threshold,
            "lexical_confidence_threshold",
        )?;
        validation::validate_fraction(self.semantic_threshold, "semantic_threshold")?;
        validation::validate_range(self.semantic_top_k as u64, 1, 1000, "semantic_top_k")?;
        validation::validate_range(self.semantic_timeout_ms, 1, 600_000, "semantic_timeout_ms")?;
        validation::validate_range(self.top_n as u64, 1, 1000, "top_n")?;
        if let Some((variant, first, second)) =
            vocabulary::conflicting_variation(&self.word_variations)
        {
            return Err(ConfigError::ConflictingVariation {
                variant,
                first,
                second,
            });
        }
        Ok(())
    }
}

/// Which embedding backend feeds the semantic tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// HTTP embedding service
    #[default]
    Remote,
    /// No embedding backend; the semantic tier always comes back empty
    Disabled,
}

impl FromStr for EmbeddingProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "disabled" | "none" => Ok(Self::Disabled),
            other => Err(ConfigError::Generic {
                message: format!("Unknown embedding provider: {other}"),
            }),
        }
    }
}

/// Embedding backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    /// Endpoint accepting `{"model", "input": [..]}` and returning `{"data": [{"embedding": [..]}]}`
    pub url: String,
    pub model: String,
    /// Expected vector length; must match the precomputed catalog vectors
    pub dimension: usize,
    /// Per-request HTTP timeout
    pub timeout_seconds: u64,
    /// Bearer token, if the service needs one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            url: DEFAULT_EMBEDDING_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            timeout_seconds: DEFAULT_EMBEDDING_TIMEOUT_SECONDS,
            api_key: None,
        }
    }
}

impl EmbeddingConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        override_from_env(&mut self.provider, "TARIFTRIEVER_EMBEDDING_PROVIDER");
        override_from_env(&mut self.url, "TARIFTRIEVER_EMBEDDING_URL");
        override_from_env(&mut self.model, "TARIFTRIEVER_EMBEDDING_MODEL");
        override_from_env(&mut self.dimension, "TARIFTRIEVER_EMBEDDING_DIMENSION");
        override_from_env(
            &mut self.timeout_seconds,
            "TARIFTRIEVER_EMBEDDING_TIMEOUT_SECONDS",
        );
        if let Ok(key) = std::env::var("TARIFTRIEVER_EMBEDDING_API_KEY") {
            self.api_key = Some(key);
        }
    }
}

impl validation::Validate for EmbeddingConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.provider == EmbeddingProviderKind::Disabled {
            return Ok(());
        }
        validation::validate_url(&self.url)?;
        validation::validate_non_empty(&self.model, "embedding.model")?;
        validation::validate_range(self.dimension as u64, 1, 8192, "embedding.dimension")?;
        validation::validate_range(self.timeout_seconds, 1, 600, "embedding.timeout_seconds")?;
        Ok(())
    }
}

/// Where the catalog snapshot is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSourceKind {
    /// JSON array of `{code, description, embedding?}`
    #[default]
    File,
    /// `tariff_codes` table
    Database,
}

impl FromStr for CatalogSourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "database" | "db" => Ok(Self::Database),
            other => Err(ConfigError::Generic {
                message: format!("Unknown catalog source: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub source: CatalogSourceKind,
    /// Only used by the file source
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSourceKind::default(),
            path: PathBuf::from(DEFAULT_CATALOG_PATH),
        }
    }
}

impl CatalogConfig {
    fn apply_env(&mut self) {
        override_from_env(&mut self.source, "TARIFTRIEVER_CATALOG_SOURCE");
        override_from_env(&mut self.path, "TARIFTRIEVER_CATALOG_PATH");
    }
}

impl validation::Validate for CatalogConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.source == CatalogSourceKind::File {
            validation::validate_non_empty(&self.path.to_string_lossy(), "catalog.path")?;
        }
        Ok(())
    }
}

/// Where miss records are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissSinkKind {
    /// `not_found_queries` table
    Database,
    /// Process memory only; lost on restart
    #[default]
    Memory,
}

impl FromStr for MissSinkKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "database" | "db" => Ok(Self::Database),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Generic {
                message: format!("Unknown miss sink: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MissConfig {
    pub sink: MissSinkKind,
    /// Default number of recent misses returned by stats
    pub stats_recent_limit: usize,
}

impl Default for MissConfig {
    fn default() -> Self {
        Self {
            sink: MissSinkKind::default(),
            stats_recent_limit: DEFAULT_MISS_STATS_RECENT_LIMIT,
        }
    }
}

impl MissConfig {
    fn apply_env(&mut self) {
        override_from_env(&mut self.sink, "TARIFTRIEVER_MISSES_SINK");
        override_from_env(
            &mut self.stats_recent_limit,
            "TARIFTRIEVER_MISSES_STATS_RECENT_LIMIT",
        );
    }
}

impl validation::Validate for MissConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_range(
            self.stats_recent_limit as u64,
            1,
            1000,
            "misses.stats_recent_limit",
        )
    }
}

/// Database configuration - comprehensive `PostgreSQL` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection string; when set it wins over the individual fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,

    /// Password for authentication (use environment variables for security)
    pub password: String,

    /// SSL mode for connections ("disable", "prefer", "require")
    pub ssl_mode: String,

    pub max_connections: u32,
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub timeout_seconds: u64,

    /// Idle timeout in seconds
    pub idle_timeout_seconds: u64,

    /// Run migrations on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            database: DEFAULT_DB_NAME.to_string(),
            username: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            ssl_mode: DEFAULT_DB_SSL_MODE.to_string(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            min_connections: DEFAULT_DB_MIN_CONNECTIONS,
            timeout_seconds: DEFAULT_DB_TIMEOUT_SECONDS,
            idle_timeout_seconds: DEFAULT_DB_IDLE_TIMEOUT_SECONDS,
            auto_migrate: DEFAULT_AUTO_MIGRATE,
        }
    }
}

impl DatabaseConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("TARIFTRIEVER_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
        {
            self.url = Some(url);
        }
        override_from_env(&mut self.host, "DB_HOST");
        override_from_env(&mut self.host, "TARIFTRIEVER_DATABASE_HOST");
        override_from_env(&mut self.port, "DB_PORT");
        override_from_env(&mut self.port, "TARIFTRIEVER_DATABASE_PORT");
        override_from_env(&mut self.database, "DB_NAME");
        override_from_env(&mut self.database, "TARIFTRIEVER_DATABASE_NAME");
        override_from_env(&mut self.username, "DB_USER");
        override_from_env(&mut self.username, "TARIFTRIEVER_DATABASE_USERNAME");
        override_from_env(&mut self.password, "DB_PASSWORD");
        override_from_env(&mut self.password, "TARIFTRIEVER_DATABASE_PASSWORD");
        override_from_env(&mut self.ssl_mode, "TARIFTRIEVER_DATABASE_SSL_MODE");
        override_from_env(
            &mut self.max_connections,
            "TARIFTRIEVER_DATABASE_MAX_CONNECTIONS",
        );
        override_from_env(
            &mut self.min_connections,
            "TARIFTRIEVER_DATABASE_MIN_CONNECTIONS",
        );
        override_from_env(
            &mut self.timeout_seconds,
            "TARIFTRIEVER_DATABASE_TIMEOUT_SECONDS",
        );
        override_from_env(
            &mut self.idle_timeout_seconds,
            "TARIFTRIEVER_DATABASE_IDLE_TIMEOUT_SECONDS",
        );
        override_from_env(&mut self.auto_migrate, "TARIFTRIEVER_DATABASE_AUTO_MIGRATE");
    }

    /// Convert string SSL mode to `PgSslMode`
    fn parse_ssl_mode(&self) -> PgSslMode {
        match self.ssl_mode.as_str() {
            "disable" => PgSslMode::Disable,
            "require" => PgSslMode::Require,
            _ => PgSslMode::Prefer,
        }
    }

    /// Build `PostgreSQL` connection options
    ///
    /// # Errors
    /// Returns an error if `url` is set and cannot be parsed
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.url {
            return url.parse::<PgConnectOptions>();
        }

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(self.parse_ssl_mode()))
    }

    /// Create a `PostgreSQL` connection pool with proper configuration
    ///
    /// # Errors
    /// Returns an error if connection to database fails
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        if self.url.is_none() && self.password == DEFAULT_DB_PASSWORD {
            tracing::warn!(
                "Using default database password - set TARIFTRIEVER_DATABASE_PASSWORD. NEVER use the default password in production!"
            );
        }

        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.timeout_seconds))
            .idle_timeout(Duration::from_secs(self.idle_timeout_seconds))
            .connect_with(self.connect_options()?)
            .await
    }

    /// Connection info for logging (NO PASSWORD!)
    pub fn safe_connection_string(&self) -> String {
        if self.url.is_some() {
            return "<connection url>".to_string();
        }
        format!(
            "{}@{}:{}/{} (ssl: {})",
            self.username, self.host, self.port, self.database, self.ssl_mode
        )
    }
}

impl validation::Validate for DatabaseConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.url.is_none() {
            validation::validate_non_empty(&self.host, "database.host")?;
            validation::validate_port(self.port)?;
            validation::validate_non_empty(&self.database, "database.database")?;
        }
        validation::validate_range(u64::from(self.max_connections), 1, 1000, "max_connections")?;
        validation::validate_range(
            u64::from(self.min_connections),
            0,
            u64::from(self.max_connections),
            "min_connections",
        )?;
        validation::validate_range(self.timeout_seconds, 1, 3600, "timeout_seconds")?;
        Ok(())
    }
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Longest query text accepted by `/resolve`
    pub max_query_chars: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_API_HOST.to_string(),
            port: DEFAULT_API_PORT,
            max_query_chars: DEFAULT_API_MAX_QUERY_CHARS,
        }
    }
}

impl ApiConfig {
    fn apply_env(&mut self) {
        override_from_env(&mut self.host, "TARIFTRIEVER_API_HOST");
        override_from_env(&mut self.port, "TARIFTRIEVER_API_PORT");
        override_from_env(&mut self.max_query_chars, "TARIFTRIEVER_API_MAX_QUERY_CHARS");
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl validation::Validate for ApiConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.host, "api.host")?;
        validation::validate_port(self.port)?;
        validation::validate_range(self.max_query_chars as u64, 1, 65_536, "max_query_chars")?;
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error)
    pub tracing_level: String,
    pub log_format: LogFormat,
    /// Write a daily rolling log file here in addition to stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tracing_level: DEFAULT_TRACING_LEVEL.to_string(),
            log_format: LogFormat::default(),
            log_dir: None,
            service_name: DEFAULT_TELEMETRY_SERVICE_NAME.to_string(),
        }
    }
}

impl TelemetryConfig {
    fn apply_env(&mut self) {
        override_from_env(&mut self.tracing_level, "TARIFTRIEVER_TELEMETRY_TRACING_LEVEL");
        override_from_env(&mut self.log_format, "TARIFTRIEVER_TELEMETRY_LOG_FORMAT");
        if let Ok(dir) = std::env::var("TARIFTRIEVER_TELEMETRY_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }
        override_from_env(&mut self.service_name, "TARIFTRIEVER_TELEMETRY_SERVICE_NAME");
    }
}

impl validation::Validate for TelemetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.service_name, "service_name")?;

        match self.tracing_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::Generic {
                message: format!("Invalid tracing level: {}", self.tracing_level),
            }),
        }
    }
}

impl ApplicationConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Apply every `TARIFTRIEVER_*` variable that is set
    pub fn apply_env(&mut self) {
        self.resolver.apply_env();
        self.embedding.apply_env();
        self.catalog.apply_env();
        self.misses.apply_env();
        self.database.apply_env();
        self.api.apply_env();
        self.telemetry.apply_env();
    }

    /// True when any configured backend needs a database connection
    pub fn needs_database(&self) -> bool {
        self.catalog.source == CatalogSourceKind::Database
            || self.misses.sink == MissSinkKind::Database
    }
}

impl validation::Validate for ApplicationConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.resolver.validate()?;
        self.embedding.validate()?;
        self.catalog.validate()?;
        self.misses.validate()?;
        self.database.validate()?;
        self.api.validate()?;
        self.telemetry.validate()?;

        if self.resolver.min_prefix_len < self.resolver.min_code_digits {
            return Err(ConfigError::Generic {
                message: format!(
                    "min_prefix_len ({}) must not be below min_code_digits ({})",
                    self.resolver.min_prefix_len, self.resolver.min_code_digits
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApplicationConfig::default();
        let validation_result = config.validate();
        assert!(
            validation_result.is_ok(),
            "defaults should be valid: {validation_result:?}"
        );
    }

    #[test]
    fn test_resolver_defaults() {
        let config = ResolverConfig::default();
        assert!((config.exact_confidence_threshold - 0.9).abs() < f32::EPSILON);
        assert!((config.semantic_threshold - 0.55).abs() < f32::EPSILON);
        assert_eq!(config.lexical_max_candidates, 20);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.semantic_timeout(), Duration::from_millis(2000));
    }

    #[test]
    fn test_config_validation_rejects_invalid_urls() {
        let mut config = ApplicationConfig::default();
        config.embedding.url = "not-a-valid-url".to_string();
        assert!(config.validate().is_err());

        // A disabled backend does not care about its URL
        config.embedding.provider = EmbeddingProviderKind::Disabled;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cross_field_validation_catches_prefix_below_code_length() {
        let mut config = ApplicationConfig::default();
        config.resolver.min_code_digits = 4;
        config.resolver.min_prefix_len = 2;

        let validation_result = config.validate();
        assert!(validation_result.is_err());
        if let Err(error) = validation_result {
            assert!(error.to_string().contains("min_prefix_len"));
        }
    }

    #[test]
    fn test_config_can_be_serialized_to_toml() {
        let config = ApplicationConfig::default();
        let toml_string = toml::to_string(&config).unwrap();
        assert!(toml_string.contains("[resolver]"));
        assert!(toml_string.contains("semantic_threshold"));

        let parsed: ApplicationConfig = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.resolver.top_n, config.resolver.top_n);
        assert_eq!(parsed.api.port, config.api.port);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_vocabulary_can_be_replaced_from_toml() {
        let parsed: ApplicationConfig = toml::from_str(
            "[resolver]\nadministrative_terms = [\"опт\"]\n\n\
             [resolver.word_variations]\n\"томат\" = [\"томаты\", \"помидоры\"]\n",
        )
        .unwrap();

        assert_eq!(parsed.resolver.administrative_terms, vec!["опт"]);
        assert_eq!(parsed.resolver.word_variations.len(), 1);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_conflicting_word_variations_are_rejected() {
        let mut config = ApplicationConfig::default();
        config
            .resolver
            .word_variations
            .insert("томат".to_string(), vec!["томаты".to_string()]);

        let validation_result = config.validate();
        assert!(matches!(
            validation_result,
            Err(ConfigError::ConflictingVariation { ref variant, .. }) if variant == "томаты"
        ));
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let parsed: ApplicationConfig = toml::from_str("").unwrap();
        assert_eq!(parsed.resolver.max_prefix_results, DEFAULT_MAX_PREFIX_RESULTS);
        assert_eq!(parsed.catalog.source, CatalogSourceKind::File);
    }

    #[test]
    fn test_environment_variable_overrides() {
        unsafe {
            std::env::set_var("TARIFTRIEVER_RESOLVER_SEMANTIC_TOP_K", "7");
            std::env::set_var("TARIFTRIEVER_MISSES_SINK", "database");
            std::env::set_var("TARIFTRIEVER_API_PORT", "not-a-number");
        }

        let config = ApplicationConfig::from_env();

        assert_eq!(config.resolver.semantic_top_k, 7);
        assert_eq!(config.misses.sink, MissSinkKind::Database);
        // Unparseable values leave the default in place
        assert_eq!(config.api.port, DEFAULT_API_PORT);

        unsafe {
            std::env::remove_var("TARIFTRIEVER_RESOLVER_SEMANTIC_TOP_K");
            std::env::remove_var("TARIFTRIEVER_MISSES_SINK");
            std::env::remove_var("TARIFTRIEVER_API_PORT");
        }
    }

    #[test]
    fn test_safe_connection_string_hides_password() {
        let config = DatabaseConfig::default();
        let safe = config.safe_connection_string();
        assert!(!safe.contains(DEFAULT_DB_PASSWORD));
        assert!(safe.contains("tariftriever@localhost:5432"));
    }

    #[test]
    fn test_needs_database() {
        let mut config = ApplicationConfig::default();
        assert!(!config.needs_database());
        config.catalog.source = CatalogSourceKind::Database;
        assert!(config.needs_database());
    }
}
