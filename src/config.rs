//! Configuration loader and validator for the Jobber→GHL sync service.
//!
//! Values come from an optional YAML file, then from environment variables
//! (`GHL_API_KEY`, `GHL_LOCATION_ID`, `GHL_BASE_URL`, `PORT`). The result is
//! validated once at startup and passed around immutably.
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_GHL_BASE_URL: &str = "https://rest.gohighlevel.com/v1/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid environment variable {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub ghl: Ghl,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Server {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// GoHighLevel API settings.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ghl {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub location_id: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    DEFAULT_GHL_BASE_URL.into()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for Ghl {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            location_id: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for Ghl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ghl")
            .field("api_key", &"[REDACTED]")
            .field("location_id", &self.location_id)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// `host:port` string for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Overlay values found through `lookup` on top of the file values.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GHL_API_KEY") {
            self.ghl.api_key = v;
        }
        if let Some(v) = lookup("GHL_LOCATION_ID") {
            self.ghl.location_id = v;
        }
        if let Some(v) = lookup("GHL_BASE_URL") {
            self.ghl.base_url = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var: "PORT", value: v })?;
        }
        Ok(())
    }
}

/// Load configuration from the process environment plus an optional YAML file.
/// - If `path` is None, uses `config.yaml` in the current working directory.
/// - A missing file is not an error; defaults and the environment fill in.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_with_env(path, |key| std::env::var(key).ok())
}

pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let mut cfg = if path.exists() {
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)?
    } else {
        Config::default()
    };
    cfg.apply_env(lookup)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.server.host.trim().is_empty() {
        return Err(ConfigError::Invalid("server.host must be non-empty"));
    }
    if cfg.server.port == 0 {
        return Err(ConfigError::Invalid("server.port must be > 0"));
    }

    if cfg.ghl.api_key.trim().is_empty() {
        return Err(ConfigError::Invalid("ghl.api_key must be non-empty"));
    }
    if cfg.ghl.location_id.trim().is_empty() {
        return Err(ConfigError::Invalid("ghl.location_id must be non-empty"));
    }
    if Url::parse(&cfg.ghl.base_url).is_err() {
        return Err(ConfigError::Invalid("ghl.base_url must be an absolute URL"));
    }
    if cfg.ghl.timeout_secs == 0 {
        return Err(ConfigError::Invalid("ghl.timeout_secs must be > 0"));
    }

    Ok(())
}

/// Sample YAML configuration.
pub fn example() -> &'static str {
    r#"server:
  host: "0.0.0.0"
  port: 3000

ghl:
  api_key: "YOUR_GHL_API_KEY"
  location_id: "YOUR_GHL_LOCATION_ID"
  base_url: "https://rest.gohighlevel.com/v1/"
  timeout_secs: 30
"#
}
