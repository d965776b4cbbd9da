//! Configuration management for Focusd
//!
//! Loads settings from TOML file at ~/.focusd/config.toml

use crate::error::{CoreError, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Stats reporting configuration
    #[serde(default)]
    pub stats: StatsConfig,

    /// Data directory (defaults to ~/.focusd)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".focusd"))
        .unwrap_or_else(|| PathBuf::from(".focusd"))
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server port (default: 19480)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Server host (default: 127.0.0.1 - localhost only)
    /// WARNING: Setting to "0.0.0.0" exposes the server to your network.
    /// Only do this on trusted networks and consider setting api_key.
    #[serde(default = "default_host")]
    pub host: String,

    /// Optional API key for authentication
    /// Required in Authorization header if set: "Authorization: Bearer <key>"
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_port() -> u16 {
    19480 // Uncommon port to avoid conflicts
}

fn default_host() -> String {
    "127.0.0.1".to_string() // Localhost only - secure by default
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: default_port(),
            host: default_host(),
            api_key: None,
        }
    }
}

/// Stats reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatsConfig {
    /// Timezone used for calendar-day truncation and hour-of-day extraction
    #[serde(default)]
    pub timezone: StatsTimezone,
}

/// Timezone policy for stats bucketing.
///
/// Calendar-day and hour-of-day buckets depend on a wall clock; which one is
/// a deployment choice, not a property of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatsTimezone {
    /// Server-local wall time
    #[default]
    Local,
    /// Coordinated universal time
    Utc,
}

impl StatsTimezone {
    /// Wall-clock reading of a UTC instant under this policy.
    pub fn to_naive(&self, t: DateTime<Utc>) -> NaiveDateTime {
        match self {
            StatsTimezone::Local => t.with_timezone(&Local).naive_local(),
            StatsTimezone::Utc => t.naive_utc(),
        }
    }

    /// UTC instant for a wall-clock time under this policy. A wall time
    /// erased by a DST gap falls back to its UTC reading.
    pub fn from_naive(&self, t: NaiveDateTime) -> DateTime<Utc> {
        match self {
            StatsTimezone::Local => Local
                .from_local_datetime(&t)
                .earliest()
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&t)),
            StatsTimezone::Utc => Utc.from_utc_datetime(&t),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            stats: StatsConfig::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let expanded_path = expand_path(path.as_ref());

        if !expanded_path.exists() {
            return Err(CoreError::Config(format!(
                "Configuration file not found: {}",
                expanded_path.display()
            )));
        }

        let content = std::fs::read_to_string(&expanded_path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config)
    }

    /// Load configuration from file or use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|p| p.join(".focusd").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".focusd/config.toml"))
    }

    /// Get the data directory, expanding ~ if present
    pub fn data_dir(&self) -> PathBuf {
        expand_path(&self.data_dir)
    }

    /// Get the server socket address
    pub fn server_addr(&self) -> SocketAddr {
        use std::net::ToSocketAddrs;

        format!("{}:{}", self.server.host, self.server.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], self.server.port)))
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CoreError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Apply environment variable overrides (server options only)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("FOCUSD_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("FOCUSD_SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(key) = std::env::var("FOCUSD_SERVER_API_KEY") {
            self.server.api_key = if key.is_empty() { None } else { Some(key) };
        }
        if let Ok(data_dir) = std::env::var("FOCUSD_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }
    }

    /// Create a default configuration file at the given path
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        // Write a well-commented config file
        let content = r#"# Focusd Configuration

[server]
# Port to listen on (default: 19480)
port = 19480

# Host to bind to
# "127.0.0.1" = localhost only (secure, recommended)
# "0.0.0.0" = all interfaces (exposes to network - use with api_key!)
host = "127.0.0.1"

# Optional API key for authentication
# If set, clients must send: Authorization: Bearer <api_key>
# api_key = "your-secret-key"

[stats]
# Wall clock used to bucket stats into days and hours:
# "local" = the server's timezone, "utc" = UTC
timezone = "local"
"#;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }
}

/// Expand ~ to home directory in paths
pub fn expand_path(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~").unwrap());
        }
    }
    path.to_path_buf()
}
