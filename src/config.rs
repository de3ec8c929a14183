//! Transfer settings passed explicitly into every connect/send call.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::addr::RemoteAddr;
use crate::protocol::{timeouts, DEFAULT_PORT};

#[derive(Debug, Clone)]
pub struct TransferConfig {
    pub remote: RemoteAddr,
    pub connect_timeout: Duration,
    pub io_timeout: Duration,
    /// Extra dial attempts after a refused/unreachable connect.
    pub retries: u32,
    pub retry_backoff: Duration,
    pub exclude_files: Vec<String>,
    pub exclude_dirs: Vec<String>,
}

impl TransferConfig {
    pub fn new(remote: RemoteAddr) -> Self {
        Self {
            remote,
            connect_timeout: Duration::from_millis(timeouts::CONNECT_MS),
            io_timeout: Duration::from_millis(timeouts::IO_MS),
            retries: 0,
            retry_backoff: Duration::from_millis(timeouts::RETRY_BACKOFF_MS),
            exclude_files: Vec::new(),
            exclude_dirs: Vec::new(),
        }
    }

    /// Overlay values present in a config file.
    pub fn apply_file(&mut self, file: &ConfigFile) {
        if let Some(ref host) = file.host {
            self.remote.host = host.clone();
        }
        if let Some(port) = file.port {
            self.remote.port = port;
        }
        if let Some(ms) = file.connect_timeout_ms {
            self.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = file.timeout_ms {
            self.io_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = file.retries {
            self.retries = n;
        }
        if let Some(ms) = file.retry_backoff_ms {
            self.retry_backoff = Duration::from_millis(ms);
        }
        self.exclude_files.extend(file.exclude_files.iter().cloned());
        self.exclude_dirs.extend(file.exclude_dirs.iter().cloned());
    }
}

/// On-disk TOML form; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub connect_timeout_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
    pub exclude_files: Vec<String>,
    pub exclude_dirs: Vec<String>,
}

pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let cfg: ConfigFile =
        toml::from_str(&data).with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(cfg)
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self::new(RemoteAddr::new("127.0.0.1", DEFAULT_PORT))
    }
}
