//! Configuration management using Figment
//!
//! Loaded from (highest precedence first): environment variables prefixed
//! `FORTUNE_`, `./config.toml`, then defaults.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Resource policy configuration
    #[serde(default)]
    pub resource: ResourceConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_name")]
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Per-resource policy knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Report missing fortunes as 410 Gone instead of 404
    #[serde(default = "default_gone_when_missing")]
    pub gone_when_missing: bool,
}

fn default_name() -> String {
    "fortune-service".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_gone_when_missing() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: default_name(),
                port: default_port(),
                log_level: default_log_level(),
            },
            resource: ResourceConfig::default(),
        }
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            gone_when_missing: default_gone_when_missing(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, `./config.toml`, and environment.
    pub fn load() -> anyhow::Result<Self> {
        let config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("FORTUNE_").split("_"))
            .extract()?;
        Ok(config)
    }
}
