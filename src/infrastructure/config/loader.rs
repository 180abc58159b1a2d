use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid initial_precision: {0}. Must be at least 1")]
    InvalidInitialPrecision(u64),

    #[error("Invalid guard_digits: {0}. Must be at least 1")]
    InvalidGuardDigits(u64),

    #[error("Invalid progress_interval: {0}. Must be at least 1")]
    InvalidProgressInterval(u64),

    #[error("Invalid progress_channel_capacity: {0}. Must be at least 1")]
    InvalidChannelCapacity(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Output path cannot be empty")]
    EmptyOutputPath,

    #[error("Reference path cannot be empty")]
    EmptyReferencePath,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .picalc/config.yaml (project config)
    /// 3. .picalc/local.yaml (local overrides, optional)
    /// 4. Environment variables (PICALC_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".picalc/config.yaml"))
            .merge(Yaml::file(".picalc/local.yaml"))
            .merge(Env::prefixed("PICALC_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override the file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("PICALC_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let engine = &config.engine;
        if engine.initial_precision == 0 {
            return Err(ConfigError::InvalidInitialPrecision(
                engine.initial_precision,
            ));
        }
        if engine.guard_digits == 0 {
            return Err(ConfigError::InvalidGuardDigits(engine.guard_digits));
        }
        if engine.progress_interval == 0 {
            return Err(ConfigError::InvalidProgressInterval(
                engine.progress_interval,
            ));
        }
        if engine.progress_channel_capacity == 0 {
            return Err(ConfigError::InvalidChannelCapacity(
                engine.progress_channel_capacity,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.output.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyOutputPath);
        }
        if config.verification.reference_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyReferencePath);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::LogFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        ConfigLoader::validate(&Config::default()).expect("Default config should be valid");
    }

    #[test]
    fn test_validate_zero_guard_digits() {
        let mut config = Config::default();
        config.engine.guard_digits = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidGuardDigits(0))
        ));
    }

    #[test]
    fn test_validate_zero_initial_precision() {
        let mut config = Config::default();
        config.engine.initial_precision = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidInitialPrecision(0))
        ));
    }

    #[test]
    fn test_validate_zero_progress_interval() {
        let mut config = Config::default();
        config.engine.progress_interval = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidProgressInterval(0))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "loud"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_empty_output_path() {
        let mut config = Config::default();
        config.output.path = std::path::PathBuf::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyOutputPath)
        ));
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "engine:\n  guard_digits: 3\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "engine:\n  guard_digits: 5\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.engine.guard_digits, 5, "Override should win");
        assert_eq!(config.engine.initial_precision, 100);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.format,
            LogFormat::Json,
            "Base value should persist when not overridden"
        );
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = ConfigLoader::load_from_file("/nonexistent/picalc.yaml").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "engine:\n  progress_interval: 0").unwrap();
        file.flush().unwrap();

        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}
