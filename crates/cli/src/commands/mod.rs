// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod dropped;
pub mod list;
pub mod send;
pub mod status;
pub mod sync;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{resolve_state_dir, Config};
use crate::env;
use crate::error::{Error, Result};
use crate::sync::{
    ConnectivityMonitor, CredentialSource, HttpTransport, StaticToken, SyncService, TokenFile,
};

/// Resolved state directory and configuration for one invocation.
pub struct Context {
    pub state_dir: PathBuf,
    pub config: Config,
}

impl Context {
    /// Resolves the state directory and loads its configuration.
    pub fn load(state_dir: Option<&Path>) -> Result<Self> {
        let state_dir = resolve_state_dir(state_dir)?;
        let config = Config::load(&state_dir)?;
        tracing::debug!(
            state_dir = %state_dir.display(),
            api_url = %config.api_url,
            "loaded config"
        );
        Ok(Context { state_dir, config })
    }

    /// The bearer token source: `SYNCQ_TOKEN`, then `auth.token_file`.
    pub fn credentials(&self) -> Arc<dyn CredentialSource> {
        if let Some(token) = env::token() {
            return Arc::new(StaticToken::new(token));
        }
        match &self.config.auth.token_file {
            Some(path) => Arc::new(TokenFile::new(path)),
            None => Arc::new(StaticToken::none()),
        }
    }

    /// Connectivity monitor backed by a TCP probe of the backend.
    pub fn monitor(&self) -> Result<ConnectivityMonitor> {
        Ok(ConnectivityMonitor::with_probe(Arc::new(self.config.probe()?)))
    }

    /// Assembles the sync service for this state directory.
    pub fn service(&self) -> Result<SyncService> {
        let transport = HttpTransport::new(&self.config.api_url, self.config.request_timeout())
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(SyncService::builder(Arc::new(transport))
            .storage(self.config.open_storage(&self.state_dir)?)
            .credentials(self.credentials())
            .monitor(self.monitor()?)
            .engine_config(self.config.engine_config(&self.state_dir))
            .lock_dir(self.state_dir.clone())
            .build())
    }
}

/// Formats a record timestamp for display.
pub(crate) fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
