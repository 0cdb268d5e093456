//! Config file handling

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::Error;

pub const USER_AGENT_STRING: &str = concat!("justhttp/", env!("CARGO_PKG_VERSION"));

/// Environment variable that points at an explicit config file
pub const CONFIG_ENV: &str = "JUSTHTTP_CONFIG";

const DEFAULT_MAX_REDIRECTS: usize = 30;
const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Client-wide defaults applied to every exchange
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    /// Used when a request does not set its own timeout
    pub timeout: Option<Duration>,
    pub max_redirects: usize,
    /// Sent with every request unless the request sets the same header
    pub default_headers: IndexMap<String, String>,
    /// Read size for response bodies, which is also the progress granularity
    pub chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT_STRING.to_string(),
            timeout: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            default_headers: IndexMap::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ClientConfig {
    /// Load configuration from `$JUSTHTTP_CONFIG` or the default config file
    ///
    /// A missing file yields the defaults; a present but invalid one is an error.
    pub fn load() -> Result<Self, Error> {
        let config_file = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::default_config_dir().join("config.toml"));

        if !config_file.exists() {
            return Ok(Self::default());
        }

        Self::from_file(&config_file)
    }

    /// Load configuration from an explicit TOML file
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let toml_value: toml::Value = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();
        let client = match toml_value.get("client") {
            Some(c) => c,
            None => return Ok(config),
        };

        if let Some(agent) = client.get("user_agent").and_then(|v| v.as_str()) {
            config.user_agent = agent.to_string();
        }

        if let Some(timeout) = client.get("timeout") {
            let secs = timeout
                .as_float()
                .or_else(|| timeout.as_integer().map(|i| i as f64))
                .ok_or_else(|| Error::Config("client.timeout must be a number of seconds".to_string()))?;
            config.timeout = Some(
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| Error::Config(format!("Invalid client.timeout: {}", e)))?,
            );
        }

        if let Some(max) = client.get("max_redirects").and_then(|v| v.as_integer()) {
            config.max_redirects = usize::try_from(max)
                .map_err(|_| Error::Config("client.max_redirects must not be negative".to_string()))?;
        }

        if let Some(size) = client.get("chunk_size").and_then(|v| v.as_integer()) {
            config.chunk_size = usize::try_from(size)
                .map_err(|_| Error::Config("client.chunk_size must be positive".to_string()))?;
        }

        if let Some(headers) = client.get("headers").and_then(|v| v.as_table()) {
            config.default_headers = headers
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values the fields' types cannot rule out
    pub fn validate(&self) -> Result<(), Error> {
        if self.chunk_size == 0 {
            return Err(Error::Config("client.chunk_size must be positive".to_string()));
        }
        Ok(())
    }

    /// Get the default config directory
    fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("justhttp"))
            .unwrap_or_else(|| PathBuf::from(".justhttp"))
    }
}
