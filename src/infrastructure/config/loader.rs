use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Environment variable prefix; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "CIVIC_QUEST_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid comment_min_chars: {0}. Must be at least 1")]
    InvalidCommentMinChars(usize),

    #[error("Invalid tier ladder: {0}")]
    InvalidTiers(String),

    #[error("Invalid webhook URL: {0}. Must start with http:// or https://")]
    InvalidWebhookUrl(String),

    #[error("Invalid notification timeout: {0}. Must be at least 1 second")]
    InvalidNotificationTimeout(u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. civic-quest.yaml (project config)
    /// 3. civic-quest.local.yaml (local overrides, optional)
    /// 4. Environment variables (CIVIC_QUEST_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("civic-quest.yaml"))
            .merge(Yaml::file("civic-quest.local.yaml"))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
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
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        if config.progression.comment_min_chars == 0 {
            return Err(ConfigError::InvalidCommentMinChars(0));
        }

        config
            .progression
            .ladder()
            .map_err(|e| ConfigError::InvalidTiers(e.to_string()))?;

        if let Some(url) = &config.notifications.webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidWebhookUrl(url.clone()));
            }
        }

        if config.notifications.timeout_secs == 0 {
            return Err(ConfigError::InvalidNotificationTimeout(0));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TierThreshold;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, ".civic-quest/progression.db");
        assert_eq!(config.progression.comment_min_chars, 100);
        assert_eq!(config.progression.tiers.len(), 2);
        assert_eq!(config.progression.tiers[0].xp, 150);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
database:
  path: /var/lib/civic/progress.db
  max_connections: 8
logging:
  level: debug
  format: json
progression:
  comment_min_chars: 50
  base_tier: Newcomer
  tiers:
    - xp: 100
      name: Regular
    - xp: 1000
      name: Veteran
notifications:
  webhook_url: https://chat.example.org/hooks/abc
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.database.path, "/var/lib/civic/progress.db");
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.progression.comment_min_chars, 50);
        let ladder = config.progression.ladder().unwrap();
        assert_eq!(ladder.tier_for(0), "Newcomer");
        assert_eq!(ladder.tier_for(1000), "Veteran");
        assert_eq!(config.notifications.timeout_secs, 5);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "loud"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
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
    fn test_validate_empty_database_path() {
        let mut config = Config::default();
        config.database.path = String::new();

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDatabasePath)
        ));
    }

    #[test]
    fn test_validate_zero_max_connections() {
        let mut config = Config::default();
        config.database.max_connections = 0;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxConnections(0))
        ));
    }

    #[test]
    fn test_validate_unordered_tiers() {
        let mut config = Config::default();
        config.progression.tiers = vec![TierThreshold::new(400, "B"), TierThreshold::new(150, "A")];

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTiers(_))
        ));
    }

    #[test]
    fn test_validate_webhook_scheme() {
        let mut config = Config::default();
        config.notifications.webhook_url = Some("ftp://example.org".to_string());

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidWebhookUrl(_))
        ));
    }

    #[test]
    fn test_validate_zero_comment_floor() {
        let mut config = Config::default();
        config.progression.comment_min_chars = 0;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidCommentMinChars(0))
        ));
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "database:\n  path: from-file.db\nlogging:\n  level: warn").unwrap();

        temp_env::with_vars(
            [
                ("CIVIC_QUEST_LOGGING__LEVEL", Some("debug")),
                ("CIVIC_QUEST_PROGRESSION__COMMENT_MIN_CHARS", Some("42")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.database.path, "from-file.db");
                assert_eq!(config.logging.level, "debug");
                assert_eq!(config.progression.comment_min_chars, 42);
            },
        );
    }

    #[test]
    fn test_load_from_missing_file() {
        assert!(ConfigLoader::load_from_file("/no/such/civic-quest.yaml").is_err());
    }
}
