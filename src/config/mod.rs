//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::lineup::BudgetPolicy;
use crate::stats::{RetryPolicy, StatsClientConfig};
use crate::storage::StorageConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Statistics proxy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Upstream endpoint that receives `{"event_id": ...}`
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Retries on connection failure or timeout
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_upstream_url() -> String {
    "http://localhost:8000/event".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    250
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            upstream_url: default_upstream_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl StatsConfig {
    pub fn client_config(&self) -> StatsClientConfig {
        StatsClientConfig {
            upstream_url: self.upstream_url.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                initial_delay_ms: self.retry_delay_ms,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Lineup rules configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineupConfig {
    /// "strict" rejects over-cap lineups at save; "lenient" saves them flagged
    #[serde(default)]
    pub budget_policy: BudgetPolicy,

    #[serde(default)]
    pub default_entry_fee: u32,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Defaults to `<data_dir>/fixtures`
    #[serde(default)]
    pub fixtures_dir: Option<PathBuf>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub lineup: LineupConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            fixtures_dir: None,
            log_level: default_log_level(),
            server: ServerConfig::default(),
            stats: StatsConfig::default(),
            lineup: LineupConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stats.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Stats timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if let Err(e) = url::Url::parse(&self.stats.upstream_url) {
            return Err(ConfigError::ValidationError(format!(
                "Stats upstream URL '{}' is invalid: {}",
                self.stats.upstream_url, e
            )));
        }

        Ok(())
    }

    pub fn storage(&self) -> StorageConfig {
        match &self.fixtures_dir {
            Some(dir) => StorageConfig::new(self.data_dir.clone(), dir.clone()),
            None => StorageConfig::with_data_dir(self.data_dir.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.lineup.budget_policy, BudgetPolicy::Strict);
        assert_eq!(config.stats.upstream_url, "http://localhost:8000/event");
    }

    #[test]
    fn test_config_validation_ok() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.stats.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_upstream() {
        let mut config = AppConfig::default();
        config.stats.upstream_url = "localhost without scheme".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            data_dir = "/srv/lineups"

            [lineup]
            budget_policy = "lenient"
            default_entry_fee = 5

            [stats]
            max_retries = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.lineup.budget_policy, BudgetPolicy::Lenient);
        assert_eq!(config.lineup.default_entry_fee, 5);
        assert_eq!(config.stats.max_retries, 0);
        assert_eq!(config.stats.timeout_seconds, 10);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.storage().fixtures_dir,
            PathBuf::from("/srv/lineups/fixtures")
        );
    }

    #[test]
    fn test_explicit_fixtures_dir() {
        let config = AppConfig {
            fixtures_dir: Some(PathBuf::from("/opt/fixtures")),
            ..Default::default()
        };
        assert_eq!(config.storage().players_path(), PathBuf::from("/opt/fixtures/players.json"));
    }

    #[test]
    fn test_stats_client_config() {
        let stats = StatsConfig {
            timeout_seconds: 3,
            max_retries: 1,
            retry_delay_ms: 50,
            ..Default::default()
        };
        let client = stats.client_config();
        assert_eq!(client.timeout, Duration::from_secs(3));
        assert_eq!(client.retry.max_retries, 1);
        assert_eq!(client.retry.initial_delay_ms, 50);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.toml");
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.lineup.budget_policy, BudgetPolicy::Strict);
        assert_eq!(config.storage().lineups_path(), PathBuf::from("./data/lineups/lineups.jsonl"));
    }
}
