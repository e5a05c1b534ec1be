//! The persisted list of monitored service names.
//!
//! Ordered and de-duplicated, guarded by a single reader/writer lock and
//! written through to a JSON file on every mutation. The in-memory list is
//! the authority; persistence is best-effort and a write failure never rolls
//! back a mutation.

use crate::executor::CommandExecutor;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Units monitored out of the box when no service list file exists yet.
const DEFAULT_SERVICES: &[&str] = &[
    "nginx",
    "postgresql",
    "redis",
    "docker",
    "ssh",
    "cron",
    "systemd-resolved",
    "NetworkManager",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid service name: {0:?}")]
    InvalidName(String),
    #[error("service '{0}' is already being monitored")]
    AlreadyExists(String),
    #[error("service '{0}' is not in the monitoring list")]
    NotFound(String),
    #[error("service '{0}' does not exist on this system")]
    AbsentOnSystem(String),
}

/// Unit names are 1-100 characters from `[A-Za-z0-9._-]`.
pub fn is_valid_service_name(name: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._-]{1,100}$").expect("service name pattern compiles")
    });
    pattern.is_match(name)
}

pub struct ServiceRegistry {
    services: RwLock<Vec<String>>,
    path: PathBuf,
    executor: Arc<dyn CommandExecutor>,
}

impl ServiceRegistry {
    /// Load the monitored list from `path`, falling back to the built-in
    /// defaults when the file is missing or unreadable. Never fails.
    pub async fn load(path: &Path, executor: Arc<dyn CommandExecutor>) -> Self {
        let services = match fs::read_to_string(path).await {
            Ok(contents) => match serde_json::from_str::<Vec<String>>(&contents) {
                Ok(list) => {
                    info!("loaded {} monitored services from {}", list.len(), path.display());
                    list
                }
                Err(err) => {
                    warn!("ignoring malformed service list {}: {err}", path.display());
                    default_services()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no service list at {}, using defaults", path.display());
                default_services()
            }
            Err(err) => {
                warn!("failed to read service list {}: {err}", path.display());
                default_services()
            }
        };

        Self {
            services: RwLock::new(services),
            path: path.to_path_buf(),
            executor,
        }
    }

    /// Snapshot copy of the monitored names.
    pub async fn list(&self) -> Vec<String> {
        self.services.read().await.clone()
    }

    /// Add a name to the monitored list, keeping it sorted.
    pub async fn add(&self, name: &str) -> Result<(), RegistryError> {
        let name = name.trim();
        if !is_valid_service_name(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }

        let mut services = self.services.write().await;
        if services.iter().any(|existing| existing == name) {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }

        services.push(name.to_string());
        services.sort();
        self.persist(&services).await;

        info!("added '{name}' to the monitoring list");
        Ok(())
    }

    pub async fn remove(&self, name: &str) -> Result<(), RegistryError> {
        let mut services = self.services.write().await;
        let Some(position) = services.iter().position(|existing| existing == name) else {
            return Err(RegistryError::NotFound(name.to_string()));
        };

        services.remove(position);
        self.persist(&services).await;

        info!("removed '{name}' from the monitoring list");
        Ok(())
    }

    /// Check that a unit actually exists on this system, via a read-only
    /// `systemctl cat` probe.
    pub async fn validate(&self, name: &str) -> Result<(), RegistryError> {
        match self.executor.run("systemctl", &["cat", name]).await {
            Ok(_) => Ok(()),
            Err(err) => {
                debug!("existence probe for '{name}' failed: {err}");
                Err(RegistryError::AbsentOnSystem(name.to_string()))
            }
        }
    }

    /// Write the list through to disk. Best-effort: failures are logged and
    /// the in-memory state stands.
    async fn persist(&self, services: &[String]) {
        let json = match serde_json::to_string_pretty(services) {
            Ok(json) => json,
            Err(err) => {
                warn!("failed to serialize service list: {err}");
                return;
            }
        };

        if let Err(err) = fs::write(&self.path, json).await {
            warn!("failed to save service list to {}: {err}", self.path.display());
        }
    }
}

fn default_services() -> Vec<String> {
    DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect()
}
