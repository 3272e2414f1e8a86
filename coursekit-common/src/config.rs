//! Configuration loading and gateway URL resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Default gateway base URL when nothing else is configured
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:4000/api/v1";

/// Default per-request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the remote API gateway
    pub gateway_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Path to the persisted session token, if any
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_file: default_session_file(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    gateway_url: Option<String>,
    request_timeout_secs: Option<u64>,
    session_file: Option<PathBuf>,
}

/// Gateway URL resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `COURSEKIT_GATEWAY_URL` environment variable
/// 3. TOML config file (`~/.config/coursekit/config.toml`)
/// 4. Compiled default (fallback)
pub fn resolve(cli_gateway_url: Option<&str>) -> Result<ClientConfig> {
    let mut config = ClientConfig::default();

    if let Ok(file) = load_config_file() {
        if let Some(url) = file.gateway_url {
            config.gateway_url = url;
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(path) = file.session_file {
            config.session_file = Some(path);
        }
    }

    if let Ok(url) = std::env::var("COURSEKIT_GATEWAY_URL") {
        config.gateway_url = url;
    }
    if let Ok(path) = std::env::var("COURSEKIT_SESSION_FILE") {
        config.session_file = Some(PathBuf::from(path));
    }

    if let Some(url) = cli_gateway_url {
        config.gateway_url = url.to_string();
    }

    // Trailing slash would double up when endpoint paths are appended
    while config.gateway_url.ends_with('/') {
        config.gateway_url.pop();
    }

    if config.gateway_url.is_empty() {
        return Err(Error::Config("Gateway URL is empty".to_string()));
    }

    tracing::debug!(gateway_url = %config.gateway_url, "Configuration resolved");
    Ok(config)
}

fn load_config_file() -> Result<ConfigFile> {
    let path = config_file_path()
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
    if !path.exists() {
        return Err(Error::Config(format!("Config file not found: {:?}", path)));
    }
    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
}

fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("coursekit").join("config.toml"))
}

fn default_session_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("coursekit").join("session"))
}
