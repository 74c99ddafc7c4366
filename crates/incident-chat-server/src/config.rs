use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use incident_chat_core::config::{get_config_paths, load_dotenv_files, load_section};
use incident_chat_core::{ConfigLoadError, LoggingConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,
}

/// Settings of the chat service, read from the `[server]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_incidents_path")]
    pub incidents_path: String,

    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,

    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_incidents_path() -> String {
    "incidents.csv".to_string()
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            incidents_path: default_incidents_path(),
            allowed_origin: default_allowed_origin(),
            openai: OpenAiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> Result<Self, ConfigLoadError> {
        load_dotenv_files();

        let mut config: ServerConfig = load_section("server", paths)?;

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.openai.api_key = key;
        }
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.openai.base_url = base_url;
        }
        if let Ok(level) = std::env::var("INCIDENT_CHAT_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigLoadError> {
        self.bind_addr
            .parse()
            .map_err(|e| ConfigLoadError::InvalidValue {
                key: "server.bind_addr".to_string(),
                message: format!("'{}' is not a socket address: {}", self.bind_addr, e),
            })
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        self.socket_addr()?;

        if self.incidents_path.is_empty() {
            return Err(ConfigLoadError::MissingRequired(
                "server.incidents_path".to_string(),
            ));
        }

        if !self.openai.base_url.starts_with("http://")
            && !self.openai.base_url.starts_with("https://")
        {
            return Err(ConfigLoadError::InvalidValue {
                key: "server.openai.base_url".to_string(),
                message: "Must be an http:// or https:// URL".to_string(),
            });
        }

        self.logging.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.allowed_origin, "http://localhost:3000");
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_bind_addr() {
        let mut config = ServerConfig::default();
        config.bind_addr = "localhost".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigLoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_section_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nbind_addr = \"0.0.0.0:9100\"\n\n[server.openai]\nmodel = \"gpt-4o\"\n"
        )
        .unwrap();

        let config: ServerConfig = load_section("server", vec![file.path().to_path_buf()]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9100");
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.incidents_path, "incidents.csv");
    }
}
