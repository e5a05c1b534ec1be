//! Application configuration loaded from an optional YAML file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    /// JSON file holding the monitored service list.
    #[serde(default = "default_services_file")]
    pub services_file: PathBuf,
    /// Per-invocation timeout for external commands.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Journal lines returned when a request does not say how many.
    #[serde(default = "default_log_lines")]
    pub default_log_lines: u32,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            services_file: default_services_file(),
            command_timeout_secs: default_command_timeout_secs(),
            default_log_lines: default_log_lines(),
        }
    }
}

impl MonitorConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_services_file() -> PathBuf {
    PathBuf::from("monitored_services.json")
}

fn default_command_timeout_secs() -> u64 {
    10
}

fn default_log_lines() -> u32 {
    100
}

/// Load configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: AppConfig =
        serde_yaml::from_str(&content).with_context(|| "Failed to parse YAML config file")?;

    Ok(config)
}
