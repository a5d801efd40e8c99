use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::http::connection::ConnectionLimits;
use crate::http::parser::MAX_REQUEST_SIZE;

/// Environment variable naming a YAML configuration file.
pub const CONFIG_ENV: &str = "EMBER_CONFIG";
/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: Option<StaticFilesConfig>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub read_buffer_size: usize,
    pub max_request_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            read_buffer_size: crate::http::connection::READ_BUFFER_SIZE,
            max_request_size: MAX_REQUEST_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default)]
    pub not_found_page: Option<String>,
}

fn default_index() -> String {
    "index.html".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads `EMBER_CONFIG` if set, else defaults, then applies `LISTEN`.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = listen_addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(text)?;
        if cfg.server.read_buffer_size == 0 {
            anyhow::bail!("server.read_buffer_size must be greater than zero");
        }
        Ok(cfg)
    }

    pub fn limits(&self) -> ConnectionLimits {
        ConnectionLimits {
            read_buffer_size: self.server.read_buffer_size,
            max_request_size: self.server.max_request_size,
        }
    }
}
