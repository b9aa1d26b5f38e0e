//! Configuration management

use crate::config_error;
use crate::error::BiostoreResult;
use crate::logging::LoggingConfig;
use crate::protocol::ProtocolVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT_URL: &str = "https://bio-store.org/biostore/permission";
/// Liveness ceiling for a single exchange, not a performance target
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10 * 60;

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BiostoreConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How to reach the store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Endpoint every action is POSTed to
    pub endpoint_url: String,
    /// Identifier of this server, sent as `serverName` with every request
    pub server_name: Option<String>,
    /// Connect and request timeout in seconds
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub protocol: ProtocolVersion,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            server_name: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: format!("biostore-client/{}", env!("CARGO_PKG_VERSION")),
            protocol: ProtocolVersion::default(),
        }
    }
}

impl ConnectionConfig {
    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = endpoint_url.into();
        self
    }

    pub fn with_server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = Some(server_name.into());
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_protocol(mut self, protocol: ProtocolVersion) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn validate(&self) -> BiostoreResult<()> {
        let url = url::Url::parse(&self.endpoint_url).map_err(|e| {
            config_error!(
                format!("Invalid endpoint URL '{}': {}", self.endpoint_url, e),
                "validate",
                e
            )
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(config_error!(
                format!("Endpoint URL must use http or https, got '{}'", url.scheme()),
                "validate"
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(config_error!(
                "connection.timeout_seconds must be greater than 0",
                "validate"
            ));
        }

        if matches!(&self.server_name, Some(name) if name.is_empty()) {
            return Err(config_error!(
                "connection.server_name must not be empty when set",
                "validate"
            ));
        }

        Ok(())
    }
}

impl BiostoreConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> BiostoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            config_error!(format!("Failed to read config file: {}", e), "read_file", e)
        })?;

        let config: BiostoreConfig = toml::from_str(&content).map_err(|e| {
            config_error!(format!("Failed to parse config: {}", e), "parse_toml", e)
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> BiostoreResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            config_error!(format!("Failed to serialize config: {}", e), "serialize_toml", e)
        })?;

        std::fs::write(path, content).map_err(|e| {
            config_error!(format!("Failed to write config file: {}", e), "write_file", e)
        })?;

        Ok(())
    }

    /// `<config dir>/biostore/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("biostore").join("config.toml"))
    }

    /// Load from `path` (or the default location) if it exists, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> BiostoreResult<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path(),
        };

        let config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => {
                info!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BiostoreResult<()> {
        self.connection.validate()
    }
}
