use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::transport::DEFAULT_CHAT_ENDPOINT;

pub const CONFIG_DIR_NAME: &str = "incident-chat";
pub const ENV_PREFIX: &str = "INCIDENT_CHAT";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,

    /// Empty means stderr for the service and no logging for the widget.
    #[serde(default)]
    pub file_path: String,
}

/// Settings of the chat widget, read from the `[client]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub theme: usize,

    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_endpoint() -> String {
    DEFAULT_CHAT_ENDPOINT.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tick_rate() -> u64 {
    50
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: String::new(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            theme: 0,
            tick_rate_ms: default_tick_rate(),
            logging: LoggingConfig::default(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(ConfigLoadError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.level, valid_levels
                ),
            });
        }
        Ok(())
    }
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> Result<Self, ConfigLoadError> {
        load_dotenv_files();

        let mut config: ClientConfig = load_section("client", paths)?;

        if let Ok(endpoint) = std::env::var("INCIDENT_CHAT_ENDPOINT") {
            config.endpoint = endpoint;
        }

        if let Ok(level) = std::env::var("INCIDENT_CHAT_LOG_LEVEL") {
            config.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            config.logging.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.endpoint.is_empty() {
            return Err(ConfigLoadError::MissingRequired("client.endpoint".to_string()));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ConfigLoadError::InvalidValue {
                key: "client.endpoint".to_string(),
                message: "Must be an http:// or https:// URL".to_string(),
            });
        }

        if self.tick_rate_ms == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "client.tick_rate_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        self.logging.validate()
    }
}

/// Reads one top-level table from the layered config files and environment.
///
/// Later sources win: files in `paths` order, then `INCIDENT_CHAT_<SECTION>__<KEY>`
/// variables. A missing table deserializes to `T::default()`.
pub fn load_section<T>(section: &str, paths: Vec<PathBuf>) -> Result<T, ConfigLoadError>
where
    T: DeserializeOwned + Default,
{
    let mut builder = ConfigBuilder::builder();

    for path in paths {
        if path.exists() {
            builder = builder.add_source(File::from(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    match config.get::<T>(section) {
        Ok(value) => Ok(value),
        Err(ConfigError::NotFound(_)) => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

pub fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("incident-chat.toml"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join("config.toml"));
    }

    paths
}

pub fn load_dotenv_files() {
    for path in get_dotenv_paths() {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join(".env"));
    }

    paths
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8000/chat");
        assert_eq!(config.theme, 0);
        assert_eq!(config.tick_rate_ms, 50);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file_path.is_empty());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_non_http_endpoint() {
        let mut config = ClientConfig::default();
        config.endpoint = "ws://localhost:8000/chat".to_string();
        assert!(config.validate().is_err());

        config.endpoint = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigLoadError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_validation_rejects_bad_log_level() {
        let mut config = ClientConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "incident_chat=debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_section_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[client]\nendpoint = \"http://127.0.0.1:9000/chat\"\ntheme = 2\n"
        )
        .unwrap();

        let config: ClientConfig =
            load_section("client", vec![file.path().to_path_buf()]).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:9000/chat");
        assert_eq!(config.theme, 2);
        assert_eq!(config.tick_rate_ms, 50);
    }

    #[test]
    fn test_load_section_missing_table_uses_default() {
        let config: ClientConfig = load_section("client", Vec::new()).unwrap();
        assert_eq!(config.tick_rate_ms, ClientConfig::default().tick_rate_ms);
    }
}
