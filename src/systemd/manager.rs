//! Status aggregation and service control over `systemctl`/`journalctl`.

use crate::executor::{CommandExecutor, ExecutorError};
use crate::registry::ServiceRegistry;
use crate::systemd::status::{parse_show_output, ServiceStatus};
use crate::systemd::timestamp::TimestampNormalizer;
use futures_util::future;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Start,
    Stop,
    Restart,
}

impl ControlAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("status query for {service} failed: {source}")]
pub struct StatusError {
    pub service: String,
    #[source]
    pub source: ExecutorError,
}

/// A failed control command. The Display output carries the action, the
/// service name, and the captured stderr verbatim; supervisor error text is
/// the primary diagnostic signal for operators.
#[derive(Debug, Error)]
#[error("systemctl {action} {service} failed: {source}")]
pub struct ControlError {
    pub action: ControlAction,
    pub service: String,
    #[source]
    pub source: ExecutorError,
}

/// Queries and controls systemd units for the monitored service list.
pub struct SystemdManager {
    executor: Arc<dyn CommandExecutor>,
    normalizer: TimestampNormalizer,
    registry: Arc<ServiceRegistry>,
}

impl SystemdManager {
    pub fn new(executor: Arc<dyn CommandExecutor>, registry: Arc<ServiceRegistry>) -> Self {
        Self {
            normalizer: TimestampNormalizer::new(executor.clone()),
            executor,
            registry,
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Query the status of a single unit via `systemctl show`.
    ///
    /// Executor failure is returned as an error; turning it into a degraded
    /// record is the aggregator's job. A successful query always yields a
    /// fully populated record, even for empty or garbage output.
    pub async fn query_status(&self, name: &str) -> Result<ServiceStatus, StatusError> {
        let output = self
            .executor
            .run("systemctl", &["show", name, "--no-page"])
            .await
            .map_err(|source| StatusError {
                service: name.to_string(),
                source,
            })?;

        let fields = parse_show_output(&output.stdout);
        let since = match &fields.active_enter_timestamp {
            Some(raw) => self.normalizer.normalize(raw, name).await,
            None => None,
        };

        Ok(ServiceStatus {
            name: name.to_string(),
            load_state: fields.load_state,
            active_state: fields.active_state,
            sub_state: fields.sub_state,
            since,
            description: fields.description,
        })
    }

    /// Produce one status record per monitored name, preserving registry
    /// order. Per-name failures become degraded records; the batch itself
    /// cannot fail and the result length always equals the input length.
    pub async fn aggregate(&self) -> Vec<ServiceStatus> {
        let names = self.registry.list().await;
        let queries = names.iter().map(|name| self.query_status(name));
        let results = future::join_all(queries).await;

        names
            .iter()
            .zip(results)
            .map(|(name, result)| match result {
                Ok(status) => status,
                Err(err) => {
                    warn!("{err}");
                    ServiceStatus::degraded(name, &err)
                }
            })
            .collect()
    }

    /// Run a privileged control command. Fire-and-forget: on success callers
    /// re-query status to observe the effect.
    pub async fn control(&self, action: ControlAction, name: &str) -> Result<(), ControlError> {
        self.executor
            .run("sudo", &["systemctl", action.as_str(), name])
            .await
            .map_err(|source| ControlError {
                action,
                service: name.to_string(),
                source,
            })?;

        info!("systemctl {action} {name} succeeded");
        Ok(())
    }

    /// Fetch the most recent journal lines for a unit.
    pub async fn logs(&self, name: &str, lines: u32) -> Result<String, StatusError> {
        let count = lines.to_string();
        let output = self
            .executor
            .run("journalctl", &["-u", name, "-n", &count, "--no-pager"])
            .await
            .map_err(|source| StatusError {
                service: name.to_string(),
                source,
            })?;

        if output.stdout.is_empty() {
            return Ok("No logs available for this service.".to_string());
        }
        Ok(output.stdout)
    }
}
