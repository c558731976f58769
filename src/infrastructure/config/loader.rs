use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("API base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Invalid API base_url: {0}. Must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Invalid requests_per_second: {0}. Must be at least 1")]
    InvalidRateLimit(u32),

    #[error("Invalid burst_size: {0}. Must be at least 1")]
    InvalidBurstSize(u32),

    #[error(
        "Invalid cache timing: gc_time_ms ({gc}) must be greater than or equal to stale_time_ms ({stale})"
    )]
    InvalidCacheTiming { stale: u64, gc: u64 },

    #[error("Invalid event_capacity: {0}. Must be at least 1")]
    InvalidEventCapacity(usize),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .storefront/config.yaml (project config)
    /// 3. .storefront/local.yaml (local overrides, optional)
    /// 4. Environment variables (STOREFRONT_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".storefront/config.yaml"))
            .merge(Yaml::file(".storefront/local.yaml"))
            .merge(Env::prefixed("STOREFRONT_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("STOREFRONT_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let api = &config.api;
        if api.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !(api.base_url.starts_with("http://") || api.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(api.base_url.clone()));
        }
        if api.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(api.timeout_secs));
        }
        if api.requests_per_second == 0 {
            return Err(ConfigError::InvalidRateLimit(api.requests_per_second));
        }
        if api.burst_size == 0 {
            return Err(ConfigError::InvalidBurstSize(api.burst_size));
        }

        let cache = &config.cache;
        if cache.gc_time_ms < cache.stale_time_ms {
            return Err(ConfigError::InvalidCacheTiming {
                stale: cache.stale_time_ms,
                gc: cache.gc_time_ms,
            });
        }
        if cache.event_capacity == 0 {
            return Err(ConfigError::InvalidEventCapacity(cache.event_capacity));
        }

        // max_retries = 0 is allowed and disables retries
        if config.retry.initial_backoff_ms > config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::ListMissPolicy;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.requests_per_second, 10);
        assert_eq!(config.cache.stale_time_ms, 60_000);
        assert_eq!(config.cache.list_miss_policy, ListMissPolicy::Fabricate);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
api:
  base_url: https://api.example.com
  access_token: secret
  requests_per_second: 5
cache:
  stale_time_ms: 0
  gc_time_ms: 1000
  list_miss_policy: invalidate
retry:
  max_retries: 0
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.access_token.as_deref(), Some("secret"));
        assert_eq!(config.api.requests_per_second, 5);
        assert_eq!(config.api.burst_size, 20);
        assert_eq!(config.cache.stale_time_ms, 0);
        assert_eq!(config.cache.list_miss_policy, ListMissPolicy::Invalidate);
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.logging.format, "json");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_empty_base_url() {
        let mut config = Config::default();
        config.api.base_url = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyBaseUrl)
        ));
    }

    #[test]
    fn test_validate_base_url_scheme() {
        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_validate_cache_timing() {
        let mut config = Config::default();
        config.cache.stale_time_ms = 10_000;
        config.cache.gc_time_ms = 5_000;
        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidCacheTiming { stale, gc }) => {
                assert_eq!(stale, 10_000);
                assert_eq!(gc, 5_000);
            }
            other => panic!("Expected InvalidCacheTiming, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_backoff() {
        let mut config = Config::default();
        config.retry.initial_backoff_ms = 60_000;
        config.retry.max_backoff_ms = 1_000;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(60_000, 1_000))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "invalid"),
            _ => panic!("Expected InvalidLogLevel error"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_validate_zero_rate_limit() {
        let mut config = Config::default();
        config.api.requests_per_second = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRateLimit(0))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "api:\n  base_url: https://shop.example.com\ncache:\n  stale_time_ms: 5\n  gc_time_ms: 10"
        )
        .expect("write config");

        let config = ConfigLoader::load_from_file(file.path()).expect("config loads");
        assert_eq!(config.api.base_url, "https://shop.example.com");
        assert_eq!(config.cache.stale_time_ms, 5);
        assert_eq!(config.cache.gc_time_ms, 10);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "api:\n  base_url: https://shop.example.com").expect("write config");

        temp_env::with_vars(
            [
                ("STOREFRONT_API__BASE_URL", Some("https://override.example.com")),
                ("STOREFRONT_RETRY__MAX_RETRIES", Some("7")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).expect("config loads");
                assert_eq!(config.api.base_url, "https://override.example.com");
                assert_eq!(config.retry.max_retries, 7);
            },
        );
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "logging:\n  level: loud").expect("write config");
        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }
}
