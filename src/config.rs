//! Configuration management for scylla-kit.
//!
//! Handles loading configuration from TOML files and environment variables,
//! with support for named cluster connections and ScyllaDB Cloud API settings.

use crate::error::{KitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default CQL native transport port.
pub const DEFAULT_PORT: u16 = 9042;

/// Default connection timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default ScyllaDB Cloud API endpoint.
pub const DEFAULT_CLOUD_API_URL: &str = "https://api.cloud.scylladb.com";

/// Main configuration structure for scylla-kit.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// ScyllaDB Cloud API configuration.
    #[serde(default)]
    pub cloud: CloudConfig,

    /// Named cluster connections.
    #[serde(default)]
    pub connections: HashMap<String, ClusterConfig>,
}

/// ScyllaDB Cloud API configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CloudConfig {
    /// API base URL.
    pub api_url: Option<String>,

    /// Account identifier used in every account-scoped endpoint.
    pub account_id: Option<String>,

    /// Bearer token (prefer the SC_TOKEN environment variable).
    pub token: Option<String>,
}

impl CloudConfig {
    /// Fills unset fields from SC_API_URL, SC_ACCOUNT and SC_TOKEN.
    pub fn apply_env_defaults(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_url.is_none() {
            self.api_url = lookup("SC_API_URL");
        }
        if self.account_id.is_none() {
            self.account_id = lookup("SC_ACCOUNT");
        }
        if self.token.is_none() {
            self.token = lookup("SC_TOKEN");
        }
    }

    /// Returns the parsed API base URL, falling back to the public endpoint.
    pub fn base_url(&self) -> Result<Url> {
        let raw = self.api_url.as_deref().unwrap_or(DEFAULT_CLOUD_API_URL);
        Url::parse(raw).map_err(|e| KitError::config(format!("Invalid api_url '{raw}': {e}")))
    }

    /// Returns the account id or a configuration error.
    pub fn require_account(&self) -> Result<&str> {
        self.account_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| KitError::config("Cloud account id is not set (SC_ACCOUNT)"))
    }

    /// Returns the API token or a configuration error.
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| KitError::config("Cloud API token is not set (SC_TOKEN)"))
    }
}

/// Cluster connection configuration.
///
/// Unset fields stay `None` until a lower-precedence source fills them, so
/// an explicit value equal to the stock one still wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClusterConfig {
    /// Contact points, either `host` or `host:port`.
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Port applied to contact points that do not carry one.
    #[serde(default)]
    pub port: Option<u16>,

    /// Local datacenter used by the load balancing policy.
    pub datacenter: Option<String>,

    /// Username for plain-text authentication.
    pub username: Option<String>,

    /// Password (not recommended to store in config).
    pub password: Option<String>,

    /// Connection timeout in seconds.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

impl ClusterConfig {
    /// Splits a comma-separated host list, dropping empty entries.
    pub fn parse_hosts(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(String::from)
            .collect()
    }

    /// Merges another config into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &ClusterConfig) {
        if !other.hosts.is_empty() {
            self.hosts = other.hosts.clone();
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.datacenter.is_some() {
            self.datacenter = other.datacenter.clone();
        }
        if other.username.is_some() {
            self.username = other.username.clone();
        }
        if other.password.is_some() {
            self.password = other.password.clone();
        }
        if other.connect_timeout_secs.is_some() {
            self.connect_timeout_secs = other.connect_timeout_secs;
        }
    }

    /// Applies environment variables (SCYLLA_HOSTS, SCYLLA_PORT, etc.) as defaults.
    pub fn apply_env_defaults(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.hosts.is_empty() {
            if let Some(hosts) = lookup("SCYLLA_HOSTS") {
                self.hosts = Self::parse_hosts(&hosts);
            }
        }
        if self.port.is_none() {
            self.port = lookup("SCYLLA_PORT").and_then(|p| p.parse().ok());
        }
        if self.datacenter.is_none() {
            self.datacenter = lookup("SCYLLA_DC");
        }
        if self.username.is_none() {
            self.username = lookup("SCYLLA_USER");
        }
        if self.password.is_none() {
            self.password = lookup("SCYLLA_PASSWORD");
        }
    }

    /// Fills whatever is still unset with the stock local-cluster values.
    pub fn apply_builtin_defaults(&mut self) {
        if self.hosts.is_empty() {
            self.hosts = vec!["127.0.0.1".to_string()];
        }
        self.port.get_or_insert(DEFAULT_PORT);
        self.connect_timeout_secs.get_or_insert(DEFAULT_CONNECT_TIMEOUT_SECS);
        if self.datacenter.is_none() {
            self.datacenter = Some("dc1".to_string());
        }
        if self.username.is_none() {
            self.username = Some("cassandra".to_string());
        }
        if self.password.is_none() {
            self.password = Some("cassandra".to_string());
        }
    }

    /// Port for contact points without one, 9042 when unset.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Returns the contact points as `host:port` strings for the driver.
    pub fn contact_points(&self) -> Vec<String> {
        let port = self.port();
        self.hosts.iter().map(|host| with_port(host, port)).collect()
    }

    /// Returns a display-safe string (no password) for logs.
    pub fn display_string(&self) -> String {
        let hosts = if self.hosts.is_empty() {
            "127.0.0.1".to_string()
        } else {
            self.hosts.join(",")
        };
        let dc = self.datacenter.as_deref().unwrap_or("dc1");
        match &self.username {
            Some(user) => format!("{user}@{hosts}:{} ({dc})", self.port()),
            None => format!("{hosts}:{} ({dc})", self.port()),
        }
    }
}

fn with_port(host: &str, port: u16) -> String {
    if host.parse::<SocketAddr>().is_ok() {
        return host.to_string();
    }
    if let Ok(IpAddr::V6(addr)) = host.parse::<IpAddr>() {
        return format!("[{addr}]:{port}");
    }
    match host.rsplit_once(':') {
        Some((_, p)) if p.parse::<u16>().is_ok() => host.to_string(),
        _ => format!("{host}:{port}"),
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scylla-kit")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| KitError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            KitError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named connection, or the default connection if name is None.
    pub fn get_connection(&self, name: Option<&str>) -> Option<&ClusterConfig> {
        let key = name.unwrap_or("default");
        self.connections.get(key)
    }
}
