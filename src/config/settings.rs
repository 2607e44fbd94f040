//! Top-level config schema and loader.
//!
//! Grounded in `kairos-rs::models::settings::Settings` /
//! `kairos-rs::config::settings::load_settings` for the struct shape and
//! the `LB_CONFIG`-env-override loading pattern (the orphan root
//! `src/config/settings.rs` used `KAIROS_CONFIG_PATH`; this crate's
//! equivalent is `LB_CONFIG` per the config schema's own environment
//! section).

use crate::models::error::LbError;
use crate::selector::LoadBalancingConfig;
use serde::Deserialize;
use std::path::Path;

fn default_ip_version() -> u8 {
    4
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcceptorConfig {
    pub port: u16,
    #[serde(default = "default_ip_version")]
    pub ip_version: u8,
}

/// `auto` resolves to the number of available CPUs at runtime; a bare
/// integer pins the worker-thread count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadsNumber {
    Auto,
    Fixed(usize),
}

impl<'de> Deserialize<'de> for ThreadsNumber {
    fn deserialize<D>(deserializer: D) -> Result<ThreadsNumber, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Auto(String),
            Fixed(usize),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Auto(s) if s == "auto" => Ok(ThreadsNumber::Auto),
            Raw::Auto(other) => Err(serde::de::Error::custom(format!(
                "threads_number must be \"auto\" or an integer, got {other:?}"
            ))),
            Raw::Fixed(n) => Ok(ThreadsNumber::Fixed(n)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadPoolConfig {
    pub threads_number: ThreadsNumber,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleLogConfig {
    pub level: String,
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileLogConfig {
    pub level: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub truncate: Option<bool>,
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub console: ConsoleLogConfig,
    #[serde(default)]
    pub file: Option<FileLogConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub acceptor: AcceptorConfig,
    pub thread_pool: ThreadPoolConfig,
    pub logging: LoggingConfig,
    pub load_balancing: LoadBalancingConfig,
}

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Loads settings from `LB_CONFIG` if set, otherwise `./config.yaml`.
pub fn load_settings() -> Result<Settings, LbError> {
    let path = std::env::var("LB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_settings_from(Path::new(&path))
}

pub fn load_settings_from(path: &Path) -> Result<Settings, LbError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| LbError::Config(format!("reading {}: {e}", path.display())))?;
    serde_yaml::from_str(&raw).map_err(|e| LbError::Config(format!("parsing {}: {e}", path.display())))
}
