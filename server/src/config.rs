//! Configuration management for the node.

use crate::sync::PeerSet;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which peers the periodic scheduler pulls from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncScope {
    /// Every configured peer except this node
    #[default]
    All,
    /// Only peers listening on the same port as this node
    Cohort,
}

impl FromStr for SyncScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(SyncScope::All),
            "cohort" => Ok(SyncScope::Cohort),
            other => Err(ConfigError::InvalidScope(other.to_string())),
        }
    }
}

impl fmt::Display for SyncScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncScope::All => f.write_str("all"),
            SyncScope::Cohort => f.write_str("cohort"),
        }
    }
}

/// Node configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Identity stamped on records and history created here
    pub node_name: String,
    /// SQLite connection URL
    pub database_url: String,
    /// Static peer addresses (`host:port`)
    pub peers: Vec<String>,
    /// Publicly reachable host of this node, used to skip itself in `peers`
    pub public_host: Option<String>,
    /// Trigger a sync after every local create, update or read
    pub auto_sync: bool,
    /// Seconds between scheduled syncs; `<= 0` disables the scheduler
    pub sync_interval: i64,
    /// Peers targeted by scheduled syncs
    pub sync_scope: SyncScope,
    /// Bound on each peer snapshot fetch
    pub peer_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port: u16 = var("PORT")
            .unwrap_or_else(|| "5000".to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let node_name = var("NODE_NAME")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("Sucursal_{}", port));

        let database_url = var("DATABASE_URL")
            .unwrap_or_else(|| format!("sqlite://data_{}.sqlite3", port));

        let peers: Vec<String> = var("PEERS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let public_host = var("PUBLIC_HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());

        let auto_sync = match var("AUTO_SYNC") {
            Some(value) => parse_flag(&value)?,
            None => false,
        };

        let sync_interval = var("SYNC_INTERVAL")
            .unwrap_or_else(|| "600".to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidInterval)?;

        let sync_scope = match var("SYNC_SCOPE") {
            Some(value) => value.parse()?,
            None => SyncScope::All,
        };

        let timeout_secs: u64 = var("PEER_TIMEOUT_SECS")
            .unwrap_or_else(|| "4".to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidTimeout)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(Self {
            host,
            port,
            node_name,
            database_url,
            peers,
            public_host,
            auto_sync,
            sync_interval,
            sync_scope,
            peer_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// This node's own address as it appears in peer lists, if known.
    pub fn self_addr(&self) -> Option<String> {
        self.public_host
            .as_ref()
            .map(|host| format!("{}:{}", host, self.port))
    }

    /// The configured peers, minus this node.
    pub fn peer_set(&self) -> PeerSet {
        PeerSet::new(self.peers.iter().cloned(), self.self_addr())
    }
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidAutoSync(other.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid SYNC_INTERVAL value")]
    InvalidInterval,

    #[error("Invalid PEER_TIMEOUT_SECS value")]
    InvalidTimeout,

    #[error("Invalid SYNC_SCOPE value '{0}': expected 'all' or 'cohort'")]
    InvalidScope(String),

    #[error("Invalid AUTO_SYNC value '{0}'")]
    InvalidAutoSync(String),
}
