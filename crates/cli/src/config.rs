// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is read from `config.toml` in the state directory. Every
//! field has a default, so a missing file is the same as an empty one.
//! Environment variables override the file; see [`Config::load`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sq_core::{FileStorage, SqliteStorage, Storage};

use crate::env;
use crate::error::{Error, Result};
use crate::sync::{EngineConfig, TcpProbe, DEFAULT_MAX_RETRIES};

const CONFIG_FILE_NAME: &str = "config.toml";
const QUEUE_DIR_NAME: &str = "queue";
const DB_FILE_NAME: &str = "queue.db";
const LOCK_FILE_NAME: &str = "drain.lock";
const APP_DIR_NAME: &str = "syncq";

/// Client configuration stored in `<state_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL that request paths are appended to.
    pub api_url: String,
    pub storage: StorageConfig,
    pub http: HttpConfig,
    pub sync: SyncConfig,
    pub connectivity: ConnectivityConfig,
    pub auth: AuthConfig,
}

/// Which backend holds the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per key under `<state_dir>/queue/`.
    #[default]
    File,
    /// A key/value table in `<state_dir>/queue.db`.
    Sqlite,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig { timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Failed replays allowed before a record is dropped (default: 3).
    pub max_retries: u32,
    /// Also attempt a drain on this interval while watching. Off when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            max_retries: DEFAULT_MAX_RETRIES,
            interval_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Poll interval for the reachability probe in milliseconds (default: 5000).
    pub probe_interval_ms: u64,
    /// Connect timeout for one probe in milliseconds (default: 2000).
    pub probe_timeout_ms: u64,
    /// `host:port` to probe. Derived from `api_url` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_addr: Option<String>,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        ConnectivityConfig {
            probe_interval_ms: 5_000,
            probe_timeout_ms: 2_000,
            probe_addr: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// File holding the bearer token, re-read on every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: "http://localhost:8001/api".to_string(),
            storage: StorageConfig::default(),
            http: HttpConfig::default(),
            sync: SyncConfig::default(),
            connectivity: ConnectivityConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `state_dir`, then applies environment
    /// overrides.
    ///
    /// A missing config file yields the defaults. `SYNCQ_API_URL` replaces
    /// `api_url`.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let mut config = Self::load_file(state_dir)?;
        if let Some(url) = env::api_url() {
            config.api_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Loads `config.toml` without environment overrides.
    pub fn load_file(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Saves configuration to `state_dir`.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(state_dir.join(CONFIG_FILE_NAME), content)?;
        Ok(())
    }

    /// Checks values that defaults cannot make sensible.
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api_url)
            .map_err(|e| Error::Config(format!("invalid api_url '{}': {}", self.api_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "invalid api_url '{}': must be http:// or https://",
                self.api_url
            )));
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::Config("http.timeout_secs must be greater than 0".to_string()));
        }
        if self.connectivity.probe_interval_ms == 0 {
            return Err(Error::Config(
                "connectivity.probe_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.sync.interval_secs == Some(0) {
            return Err(Error::Config("sync.interval_secs must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.connectivity.probe_interval_ms)
    }

    pub fn sync_interval(&self) -> Option<Duration> {
        self.sync.interval_secs.map(Duration::from_secs)
    }

    /// The reachability probe for the backend.
    pub fn probe(&self) -> Result<TcpProbe> {
        let timeout = Duration::from_millis(self.connectivity.probe_timeout_ms);
        match &self.connectivity.probe_addr {
            Some(addr) => Ok(TcpProbe::new(addr.clone(), timeout)),
            None => TcpProbe::from_url(&self.api_url, timeout).ok_or_else(|| {
                Error::Config(format!("cannot derive probe address from '{}'", self.api_url))
            }),
        }
    }

    pub fn engine_config(&self, state_dir: &Path) -> EngineConfig {
        EngineConfig {
            max_retries: self.sync.max_retries,
            lock_path: Some(state_dir.join(LOCK_FILE_NAME)),
        }
    }

    /// Opens the configured queue storage under `state_dir`.
    pub fn open_storage(&self, state_dir: &Path) -> Result<Arc<dyn Storage>> {
        let storage: Arc<dyn Storage> = match self.storage.backend {
            StorageBackend::File => Arc::new(FileStorage::open(&state_dir.join(QUEUE_DIR_NAME))?),
            StorageBackend::Sqlite => Arc::new(SqliteStorage::open(&state_dir.join(DB_FILE_NAME))?),
        };
        Ok(storage)
    }
}

/// Resolves the state directory.
///
/// Order: explicit flag, `SYNCQ_STATE_DIR`, the platform state directory
/// (`$XDG_STATE_HOME`), then `~/.local/state`.
pub fn resolve_state_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env::state_dir() {
        return Ok(dir);
    }
    if let Some(dir) = dirs::state_dir() {
        return Ok(dir.join(APP_DIR_NAME));
    }
    dirs::home_dir()
        .map(|home| home.join(".local").join("state").join(APP_DIR_NAME))
        .ok_or(Error::NoStateDir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
