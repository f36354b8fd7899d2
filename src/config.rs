//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/user-directory/config.toml`).
//! A missing file yields the defaults; every section and field is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::application::IngestionSettings;
use crate::infrastructure::{DatabaseConfig, PoolConfig, RandomUserIdentity};
use crate::shared::ConfigError;

/// Env var naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "USER_DIRECTORY_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
    pub random_user: RandomUserConfig,
    pub ingestion: IngestionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight requests on shutdown.
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub pool: PoolConfig,
    /// Command-line `--database-url`; beats both the file and `DATABASE_URL`.
    #[serde(skip)]
    pub url_override: Option<String>,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let defaults = DatabaseConfig::default();
        Self {
            url: defaults.url,
            pool: defaults.pool,
            url_override: None,
        }
    }
}

impl DatabaseSection {
    /// Precedence: `url_override`, then `DATABASE_URL`, then `url`.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url_override {
            return url.clone();
        }
        std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.url.clone())
    }

    pub fn to_database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.connection_url(),
            pool: self.pool.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomUserConfig {
    pub base_url: String,
    pub nationalities: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for RandomUserConfig {
    fn default() -> Self {
        let identity = RandomUserIdentity::default();
        Self {
            base_url: "https://randomuser.me/api/".to_string(),
            nationalities: identity.nationalities,
            timeout_secs: 15,
            user_agent: identity.user_agent,
        }
    }
}

impl RandomUserConfig {
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "random_user.base_url must not be empty".into(),
            ));
        }
        Url::parse(&self.base_url).map_err(|e| {
            ConfigError::Invalid(format!(
                "random_user.base_url {:?} is not a valid URL: {e}",
                self.base_url
            ))
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn identity(&self) -> RandomUserIdentity {
        RandomUserIdentity {
            user_agent: self.user_agent.clone(),
            nationalities: self.nationalities.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub chunk_size: usize,
    pub pause_ms: u64,
    pub max_target: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        let defaults = IngestionSettings::default();
        Self {
            chunk_size: defaults.chunk_size,
            pause_ms: defaults.pause.as_millis() as u64,
            max_target: defaults.max_target,
        }
    }
}

impl IngestionConfig {
    pub fn settings(&self) -> IngestionSettings {
        IngestionSettings {
            chunk_size: self.chunk_size,
            pause: Duration::from_millis(self.pause_ms),
            max_target: self.max_target,
        }
    }
}

impl AppConfig {
    /// Read and validate the config file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingestion.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "ingestion.chunk_size must be at least 1".into(),
            ));
        }
        if self.ingestion.max_target == 0 {
            return Err(ConfigError::Invalid(
                "ingestion.max_target must be at least 1".into(),
            ));
        }
        self.random_user.parsed_base_url()?;
        Ok(())
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.server.api_host, self.server.api_port)
    }
}

/// `USER_DIRECTORY_CONFIG` if set, otherwise the per-user config dir.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("user-directory")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.server.api_port, 8080);
        assert_eq!(config.ingestion.chunk_size, 20);
        assert_eq!(config.ingestion.pause_ms, 500);
        assert_eq!(config.ingestion.max_target, 100);
        assert_eq!(config.random_user.nationalities, "us,br,gb");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            api_port = 9090

            [ingestion]
            pause_ms = 50

            [database.pool]
            max_connections = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.server.api_port, 9090);
        assert_eq!(config.server.api_host, "0.0.0.0");
        assert_eq!(config.ingestion.settings().pause, Duration::from_millis(50));
        assert_eq!(config.ingestion.chunk_size, 20);
        assert_eq!(config.database.pool.max_connections, 3);
        assert_eq!(config.database.pool.min_connections, 1);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = AppConfig::from_toml("[ingestion]\nchunk_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_max_target_is_rejected() {
        let err = AppConfig::from_toml("[ingestion]\nmax_target = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        for url in ["", "not a url"] {
            let raw = format!("[random_user]\nbase_url = {url:?}");
            let err = AppConfig::from_toml(&raw).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{url:?}");
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = AppConfig::from_toml("[server\napi_port = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn url_override_wins() {
        let mut section = DatabaseSection::default();
        section.url_override = Some("sqlite::memory:".into());
        assert_eq!(section.connection_url(), "sqlite::memory:");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("user-directory-does-not-exist.toml");
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.api_address(), "0.0.0.0:8080");
    }
}
