//! Configuration profiles for different environments

use crate::{
    ApplicationConfig, CatalogSourceKind, EmbeddingProviderKind, MissSinkKind,
};
use tariftriever_common::LogFormat;

/// Configuration profiles for different deployment environments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Profile {
    /// Development environment - pretty logs, local services
    #[default]
    #[serde(rename = "development")]
    Development,

    /// Staging environment - production-like but with debug logging
    #[serde(rename = "staging")]
    Staging,

    /// Production environment - JSON logs, database-backed catalog and misses
    #[serde(rename = "production")]
    Production,

    /// Test environment - no external services at all
    #[serde(rename = "test")]
    Test,
}

impl Profile {
    /// Adjust a configuration to the conventions of this profile.
    ///
    /// Explicit settings still win: call this before applying file or env sources.
    pub fn apply(self, config: &mut ApplicationConfig) {
        match self {
            Self::Development => {}
            Self::Staging => {
                config.telemetry.tracing_level = "debug".to_string();
                config.telemetry.log_format = LogFormat::Json;
            }
            Self::Production => {
                config.telemetry.log_format = LogFormat::Json;
                config.catalog.source = CatalogSourceKind::Database;
                config.misses.sink = MissSinkKind::Database;
            }
            Self::Test => {
                config.embedding.provider = EmbeddingProviderKind::Disabled;
                config.misses.sink = MissSinkKind::Memory;
                config.database.auto_migrate = false;
            }
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::Test => "test",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for Profile {
    type Err = crate::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            _ => Err(crate::ConfigError::Generic {
                message: format!("Invalid profile: {s}"),
            }),
        }
    }
}
