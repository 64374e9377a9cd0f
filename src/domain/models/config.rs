use serde::{Deserialize, Serialize};

use super::tier::{TierLadder, TierThreshold};
use crate::domain::errors::DomainResult;

/// Main configuration structure for the progression engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Completion rules and tier ladder
    #[serde(default)]
    pub progression: ProgressionConfig,

    /// Task catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Outbound notification settings
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a writer waits for the database lock
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_database_path() -> String {
    ".civic-quest/progression.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_busy_timeout_secs() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

impl DatabaseConfig {
    /// `sqlx` connection URL for the configured path.
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation policy for file output (daily, hourly, never)
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Completion rules and tier ladder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProgressionConfig {
    /// Minimum comment length for comment-gated tasks, in characters
    #[serde(default = "default_comment_min_chars")]
    pub comment_min_chars: usize,

    /// Tier held before the first threshold
    #[serde(default = "default_base_tier")]
    pub base_tier: String,

    /// Ascending `(xp, name)` thresholds
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierThreshold>,
}

const fn default_comment_min_chars() -> usize {
    100
}

fn default_base_tier() -> String {
    TierLadder::reference().base_tier().to_string()
}

fn default_tiers() -> Vec<TierThreshold> {
    TierLadder::reference().thresholds().to_vec()
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            comment_min_chars: default_comment_min_chars(),
            base_tier: default_base_tier(),
            tiers: default_tiers(),
        }
    }
}

impl ProgressionConfig {
    /// Build the validated tier ladder.
    pub fn ladder(&self) -> DomainResult<TierLadder> {
        TierLadder::new(self.base_tier.clone(), self.tiers.clone())
    }
}

/// Task catalog source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CatalogConfig {
    /// YAML file with task definitions; the built-in seed list when unset
    #[serde(default)]
    pub path: Option<String>,
}

/// Outbound notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NotificationConfig {
    /// Turn announcements and role grants off entirely
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,

    /// Webhook receiving announcements; log-only delivery when unset
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Request timeout for webhook delivery
    #[serde(default = "default_notification_timeout_secs")]
    pub timeout_secs: u64,

    /// Channel name forwarded with every webhook payload
    #[serde(default = "default_channel")]
    pub channel: String,
}

const fn default_notifications_enabled() -> bool {
    true
}

const fn default_notification_timeout_secs() -> u64 {
    5
}

fn default_channel() -> String {
    "announcements".to_string()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
            webhook_url: None,
            timeout_secs: default_notification_timeout_secs(),
            channel: default_channel(),
        }
    }
}
