mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::business::Business;
use crate::error::UsherError;
use defaults::*;

/// Top-level Usher configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP API configuration: webhook, health, and admin endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Bearer token for admin routes. Empty = admin routes disabled.
    #[serde(default)]
    pub admin_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            admin_key: String::new(),
        }
    }
}

/// Outbound messaging transport configuration.
///
/// Empty credentials put the transport in log-only mock mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_transport_provider")]
    pub provider: String,
    #[serde(default = "default_transport_base_url")]
    pub base_url: String,
    /// Sending phone number id on the provider side.
    #[serde(default)]
    pub phone_number_id: String,
    #[serde(default)]
    pub access_token: String,
    /// Our own user identifier; inbound events from it are ignored
    /// and sends to it short-circuit.
    #[serde(default)]
    pub sender_id: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            provider: default_transport_provider(),
            base_url: default_transport_base_url(),
            phone_number_id: String::new(),
            access_token: String::new(),
            sender_id: String::new(),
        }
    }
}

/// Text-generation collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,
    /// Empty = generation-dependent extras (post-binding intro) are
    /// skipped; ordinary replies fall back to the static apology.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    /// No response within this bound counts as a generation failure.
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            api_key: String::new(),
            model: default_generation_model(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

/// Business directory configuration. A base URL selects the HTTP
/// directory; otherwise the inline static entries are served.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub businesses: Vec<Business>,
}

/// Engine tuning: windows, paging, queue sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Businesses per page while browsing the list.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Seen-message-id eviction window.
    #[serde(default = "default_seen_window")]
    pub seen_window_secs: u64,
    /// Duplicate-reply suppression window.
    #[serde(default = "default_reply_window")]
    pub reply_window_secs: u64,
    /// Delay before the post-binding generated introduction.
    #[serde(default = "default_intro_delay")]
    pub intro_delay_secs: u64,
    /// Bounded inbound event queue between webhook ack and the engine.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Cadence of the cache eviction sweep.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            seen_window_secs: default_seen_window(),
            reply_window_secs: default_reply_window(),
            intro_delay_secs: default_intro_delay(),
            queue_capacity: default_queue_capacity(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory for daily-rolling log files. Empty = stdout only.
    #[serde(default)]
    pub dir: String,
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, UsherError> {
    let path = Path::new(path);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| UsherError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| UsherError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
