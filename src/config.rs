//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::notification::DEFAULT_NOTIFICATION_TTL;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MAHJONG_SETTLE_CONFIG_PATH";
/// Environment variable that overrides the listening port.
const PORT_ENV: &str = "PORT";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORE_PATH: &str = "data/store.json";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// TCP port of the local form API.
    pub port: u16,
    /// JSON document backing the store; `None` keeps everything in memory.
    pub store_path: Option<PathBuf>,
    /// Upper bound for one settlement attempt, network call included.
    pub request_timeout: Duration,
    /// How long a notification keeps its styling.
    pub notification_ttl: Duration,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if let Some(port) = env::var(PORT_ENV)
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
        {
            config.port = port;
        }

        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    port: u16,
    store_path: Option<String>,
    request_timeout_ms: u64,
    notification_ttl_ms: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            store_path: Some(DEFAULT_STORE_PATH.to_string()),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            notification_ttl_ms: DEFAULT_NOTIFICATION_TTL.as_millis() as u64,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            port: value.port,
            store_path: value
                .store_path
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            request_timeout: Duration::from_millis(value.request_timeout_ms),
            notification_ttl: Duration::from_millis(value.notification_ttl_ms),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
