use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::usage::{Granularity, TimeRange};

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "PORTAL_CONFIG";

const APP_NAME: &str = "portal";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub usage: UsageDefaults,
    pub server: ServerConfig,
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            usage: UsageDefaults::default(),
            server: ServerConfig::default(),
            log_level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Root URL of the portal backend
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5050".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UsageDefaults {
    pub time_range: TimeRange,
    pub granularity: Granularity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 7420 }
    }
}

/// Settable configuration fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigKey {
    ApiBaseUrl,
    ApiTimeoutSecs,
    UsageTimeRange,
    UsageGranularity,
    ServerPort,
    LogLevel,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ApiBaseUrl => "api.base_url",
            ConfigKey::ApiTimeoutSecs => "api.timeout_secs",
            ConfigKey::UsageTimeRange => "usage.time_range",
            ConfigKey::UsageGranularity => "usage.granularity",
            ConfigKey::ServerPort => "server.port",
            ConfigKey::LogLevel => "log_level",
        }
    }
}

impl Config {
    pub fn get(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::ApiBaseUrl => self.api.base_url.clone(),
            ConfigKey::ApiTimeoutSecs => self.api.timeout_secs.to_string(),
            ConfigKey::UsageTimeRange => self.usage.time_range.to_string(),
            ConfigKey::UsageGranularity => self.usage.granularity.to_string(),
            ConfigKey::ServerPort => self.server.port.to_string(),
            ConfigKey::LogLevel => self.log_level.clone(),
        }
    }

    /// Update one field from its textual value, leaving the rest untouched on error
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.as_str().to_string(),
            value: value.to_string(),
            reason,
        };

        match key {
            ConfigKey::ApiBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(invalid("must start with http:// or https://".to_string()));
                }
                self.api.base_url = value.trim_end_matches('/').to_string();
            }
            ConfigKey::ApiTimeoutSecs => {
                let secs: u64 = value.parse().map_err(|e| invalid(format!("{}", e)))?;
                if secs == 0 {
                    return Err(invalid("must be at least 1".to_string()));
                }
                self.api.timeout_secs = secs;
            }
            ConfigKey::UsageTimeRange => {
                self.usage.time_range = value.parse().map_err(invalid)?;
            }
            ConfigKey::UsageGranularity => {
                self.usage.granularity = value.parse().map_err(invalid)?;
            }
            ConfigKey::ServerPort => {
                self.server.port = value.parse().map_err(|e| invalid(format!("{}", e)))?;
            }
            ConfigKey::LogLevel => {
                let level = value.to_lowercase();
                if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
                    return Err(invalid(
                        "expected trace, debug, info, warn or error".to_string(),
                    ));
                }
                self.log_level = level;
            }
        }
        Ok(())
    }
}

/// Location of the config file: `$PORTAL_CONFIG`, else `<config dir>/portal/config.toml`
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("config.toml")
}

/// Load configuration, creating the file with defaults if missing
pub fn load_config() -> Result<Config, ConfigError> {
    let config = confy::load_path(config_path())?;
    Ok(config)
}

pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    confy::store_path(config_path(), config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:5050");
        assert_eq!(config.usage.time_range, TimeRange::LastMonth);
        assert_eq!(config.usage.granularity, Granularity::Week);
        assert_eq!(config.server.port, 7420);
    }

    #[test]
    fn test_set_typed_keys() {
        let mut config = Config::default();
        config.set(ConfigKey::UsageGranularity, "month").unwrap();
        config.set(ConfigKey::UsageTimeRange, "last-year").unwrap();
        config.set(ConfigKey::ApiBaseUrl, "https://portal.example.com/").unwrap();
        config.set(ConfigKey::LogLevel, "DEBUG").unwrap();

        assert_eq!(config.usage.granularity, Granularity::Month);
        assert_eq!(config.usage.time_range, TimeRange::LastYear);
        assert_eq!(config.api.base_url, "https://portal.example.com");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.get(ConfigKey::UsageTimeRange), "last-year");
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(config.set(ConfigKey::ServerPort, "99999").is_err());
        assert!(config.set(ConfigKey::ApiTimeoutSecs, "0").is_err());
        assert!(config.set(ConfigKey::ApiBaseUrl, "portal.local").is_err());
        assert!(config.set(ConfigKey::UsageGranularity, "hour").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = load_from_file("[server]\nport = 9000\n");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.api.timeout_secs, 15);
    }

    fn load_from_file(content: &str) -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        confy::load_path(&path).unwrap()
    }
}
