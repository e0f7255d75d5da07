use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use tracing::trace;

use crate::util;

/// Storage backend configuration
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (no persistence)
    #[serde(rename = "none")]
    None,

    /// SQLite database (default)
    Sqlite {
        /// Path to the SQLite database file
        #[serde(default = "default_sqlite_path")]
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./pulsewatch.db")
}

/// HTTP surface configuration
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ApiSettings {
    /// Bind address; `HOST`/`PORT` from the environment win over this
    pub bind_addr: Option<SocketAddr>,

    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Pre-built frontend served at `/` when the directory exists
    pub dashboard_dir: Option<PathBuf>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            enable_cors: default_enable_cors(),
            dashboard_dir: None,
        }
    }
}

fn default_enable_cors() -> bool {
    true
}

/// Health probe configuration
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ProbeConfig {
    /// Client-side timeout of one probe request
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn default_probe_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct Config {
    /// Storage configuration (defaults to SQLite)
    pub storage: Option<StorageConfig>,

    pub api: Option<ApiSettings>,

    pub probe: Option<ProbeConfig>,
}

impl Config {
    /// Storage settings with the `PULSEWATCH_DB` override applied
    pub fn storage(&self) -> StorageConfig {
        let configured = self.storage.clone().unwrap_or_default();
        match (util::get_db_path(), configured) {
            (Some(path), StorageConfig::Sqlite { .. }) => StorageConfig::Sqlite { path },
            (_, configured) => configured,
        }
    }

    pub fn api(&self) -> ApiSettings {
        self.api.clone().unwrap_or_default()
    }

    pub fn probe(&self) -> ProbeConfig {
        self.probe.clone().unwrap_or_default()
    }

    /// Address the HTTP server binds to
    ///
    /// Environment (`HOST`, `PORT`) first, then the config file, then
    /// `0.0.0.0:8000`.
    pub fn bind_addr(&self) -> SocketAddr {
        let configured = self.api.as_ref().and_then(|api| api.bind_addr);
        let ip: IpAddr = util::get_host()
            .or(configured.map(|addr| addr.ip()))
            .unwrap_or(util::DEFAULT_HOST);
        let port = util::get_port()
            .or(configured.map(|addr| addr.port()))
            .unwrap_or(util::DEFAULT_PORT);
        SocketAddr::new(ip, port)
    }
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
