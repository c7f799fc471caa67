//! Configuration source loading and composition
//!
//! Sources are applied lowest priority first onto built-in defaults. File
//! sources describe a whole document (missing keys fall back to defaults);
//! the environment source only touches fields whose variables are set.

use crate::validation::Validate;
use crate::{ApplicationConfig, ConfigResult};
use std::path::{Path, PathBuf};

/// Trait for loading configuration from different sources
pub trait ConfigurationSource {
    /// Apply this source on top of `config`
    ///
    /// # Errors
    /// Returns configuration loading errors
    fn apply(&self, config: &mut ApplicationConfig) -> ConfigResult<()>;

    /// Get the name of this configuration source
    fn name(&self) -> &str;

    /// Get the priority of this source (higher number = higher priority)
    fn priority(&self) -> u8;
}

/// Overrides from `TARIFTRIEVER_*` environment variables
pub struct EnvironmentSource;

impl ConfigurationSource for EnvironmentSource {
    fn apply(&self, config: &mut ApplicationConfig) -> ConfigResult<()> {
        config.apply_env();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "environment"
    }

    fn priority(&self) -> u8 {
        100
    }
}

/// Load configuration from TOML file
pub struct TomlFileSource {
    path: PathBuf,
}

impl TomlFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigurationSource for TomlFileSource {
    fn apply(&self, config: &mut ApplicationConfig) -> ConfigResult<()> {
        let content = std::fs::read_to_string(&self.path)?;
        *config = toml::from_str(&content)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "toml_file"
    }

    fn priority(&self) -> u8 {
        50
    }
}

/// Load configuration from YAML file
pub struct YamlFileSource {
    path: PathBuf,
}

impl YamlFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigurationSource for YamlFileSource {
    fn apply(&self, config: &mut ApplicationConfig) -> ConfigResult<()> {
        let content = std::fs::read_to_string(&self.path)?;
        *config = serde_yaml::from_str(&content)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "yaml_file"
    }

    fn priority(&self) -> u8 {
        50
    }
}

/// Pick a file source from the extension (`.yaml`/`.yml` or TOML otherwise)
pub fn file_source<P: AsRef<Path>>(path: P) -> Box<dyn ConfigurationSource> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => Box::new(YamlFileSource::new(path)),
        _ => Box::new(TomlFileSource::new(path)),
    }
}

type ConfigSources = Vec<Box<dyn ConfigurationSource>>;

/// Configuration loader that combines multiple sources
pub struct ConfigurationLoader {
    base: ApplicationConfig,
    sources: ConfigSources,
}

impl ConfigurationLoader {
    pub fn new() -> Self {
        Self {
            base: ApplicationConfig::default(),
            sources: Vec::new(),
        }
    }

    /// Start from a pre-adjusted configuration instead of the built-in defaults
    #[must_use]
    pub fn with_base(mut self, base: ApplicationConfig) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub fn add_source(mut self, source: Box<dyn ConfigurationSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Load configuration from all sources with priority ordering
    ///
    /// A source that fails to load is an error: a config file the operator
    /// pointed at must not be silently ignored.
    ///
    /// # Errors
    /// Returns configuration loading or validation errors
    pub fn load(&self) -> ConfigResult<ApplicationConfig> {
        let mut config = self.base.clone();

        let mut sorted_sources = self.sources.iter().collect::<Vec<_>>();
        sorted_sources.sort_by_key(|source| source.priority());

        for source in sorted_sources {
            source.apply(&mut config).inspect_err(|e| {
                tracing::warn!(source = source.name(), error = %e, "Failed to load configuration source");
            })?;
            tracing::debug!(source = source.name(), "Applied configuration source");
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigurationLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_toml_file_with_partial_sections() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[resolver]\nsemantic_threshold = 0.6\ntop_n = 5\n\n[api]\nport = 9090"
        )
        .unwrap();

        let config = ConfigurationLoader::new()
            .add_source(file_source(file.path()))
            .load()
            .unwrap();

        assert!((config.resolver.semantic_threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.resolver.top_n, 5);
        assert_eq!(config.api.port, 9090);
        // Untouched keys keep their defaults
        assert_eq!(config.resolver.lexical_max_candidates, 20);
    }

    #[test]
    fn test_yaml_file_source() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        writeln!(file, "catalog:\n  source: file\n  path: /tmp/catalog.json").unwrap();

        let config = ConfigurationLoader::new()
            .add_source(file_source(file.path()))
            .load()
            .unwrap();

        assert_eq!(config.catalog.path, PathBuf::from("/tmp/catalog.json"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ConfigurationLoader::new()
            .add_source(Box::new(TomlFileSource::new("/definitely/not/here.toml")))
            .load();
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[resolver]\nsemantic_threshold = 1.5").unwrap();

        let result = ConfigurationLoader::new()
            .add_source(file_source(file.path()))
            .load();
        assert!(result.is_err());
    }
}
