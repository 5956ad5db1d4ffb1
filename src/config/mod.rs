//! Configuration: optional TOML file merged under command-line flags

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::infrastructure::ethereum::{normalize_http_endpoint, ProviderConfig};

/// Node endpoint used when nothing is configured
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8545";
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_LOG: &str = "info";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EndpointConfig {
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,

    pub listen: Option<String>,

    /// Sender placed in the call object
    pub from: Option<String>,

    /// Default tracing filter, overridden by `RUST_LOG`
    pub log: Option<String>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub provider: ProviderConfig,
    pub listen: SocketAddr,
    pub from: Address,
    pub log: String,
}

impl EndpointConfig {
    fn is_set(&self) -> bool {
        [&self.rpc, &self.ws, &self.ipc]
            .into_iter()
            .any(|value| non_empty(value).is_some())
    }

    /// IPC wins over WebSocket, WebSocket over HTTP.
    fn provider_config(&self) -> Result<Option<ProviderConfig>> {
        if let Some(ipc) = non_empty(&self.ipc) {
            #[cfg(unix)]
            {
                return Ok(Some(ProviderConfig::Ipc(PathBuf::from(ipc))));
            }
            #[cfg(not(unix))]
            {
                bail!("IPC is not supported on this platform ({ipc})");
            }
        }
        if let Some(ws) = non_empty(&self.ws) {
            return Ok(Some(ProviderConfig::WebSocket(ws.to_string())));
        }
        if let Some(rpc) = non_empty(&self.rpc) {
            return Ok(Some(ProviderConfig::Http(normalize_http_endpoint(rpc))));
        }
        Ok(None)
    }
}

impl Settings {
    /// Merge command-line values over file values over defaults.
    ///
    /// Endpoints are taken as a group: any endpoint given on the command
    /// line replaces every endpoint from the file.
    pub fn resolve(cli: &Config, file: &Config) -> Result<Self> {
        let endpoints = if cli.endpoint.is_set() {
            &cli.endpoint
        } else {
            &file.endpoint
        };
        let provider = endpoints
            .provider_config()?
            .unwrap_or_else(|| ProviderConfig::WebSocket(DEFAULT_ENDPOINT.to_string()));

        let listen = non_empty(&cli.listen)
            .or_else(|| non_empty(&file.listen))
            .unwrap_or(DEFAULT_LISTEN);
        let listen = listen
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid listen address `{listen}`"))?;

        let from = match non_empty(&cli.from).or_else(|| non_empty(&file.from)) {
            Some(raw) => raw
                .parse::<Address>()
                .with_context(|| format!("Invalid sender address `{raw}`"))?,
            None => Address::ZERO,
        };

        let log = non_empty(&cli.log)
            .or_else(|| non_empty(&file.log))
            .unwrap_or(DEFAULT_LOG)
            .to_string();

        Ok(Self {
            provider,
            listen,
            from,
            log,
        })
    }
}

/// Load the config file.
///
/// An explicit path must exist; the default location is optional.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match config_path() {
            Some(path) => (path, false),
            None => return Ok(Config::default()),
        },
    };

    if !path.exists() {
        if required {
            bail!("Config file {} does not exist", path.display());
        }
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str::<Config>(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CALLGATE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("callgate").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("callgate").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "callgate", "callgate")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
