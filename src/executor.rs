//! External command execution.
//!
//! Everything that talks to the system (`systemctl`, `journalctl`, `sudo`)
//! goes through the [`CommandExecutor`] trait so the systemd layer can be
//! exercised against scripted output in tests.

use async_trait::async_trait;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed ({status}): {stderr}")]
    NonZeroExit {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
}

/// Captured output of a successfully exited command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion and capture its output.
    ///
    /// A non-zero exit status is an error carrying the captured stderr.
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecutorError>;
}

/// Runs real commands via `tokio::process`, each invocation bounded by a
/// timeout. There are no retries; an unresponsive command fails exactly once.
pub struct SystemCommandExecutor {
    timeout: Duration,
}

impl SystemCommandExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

#[async_trait]
impl CommandExecutor for SystemCommandExecutor {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecutorError> {
        let command = command_line(program, args);
        debug!("running `{command}`");

        let output = match time::timeout(self.timeout, Command::new(program).args(args).output())
            .await
        {
            Ok(result) => result.map_err(|source| ExecutorError::Spawn {
                command: command.clone(),
                source,
            })?,
            Err(_) => {
                return Err(ExecutorError::Timeout {
                    command,
                    timeout: self.timeout,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ExecutorError::NonZeroExit {
                command,
                status: output.status,
                stderr: stderr.trim_end().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::os::unix::process::ExitStatusExt;
    use std::sync::Mutex;

    pub enum MockResponse {
        Success { stdout: String },
        Failure { stderr: String },
    }

    /// Scripted executor keyed by the full command line; records every
    /// invocation so tests can assert how often a command was issued.
    #[derive(Default)]
    pub struct MockExecutor {
        responses: HashMap<String, MockResponse>,
        calls: Mutex<Vec<String>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on_success(mut self, command: &str, stdout: &str) -> Self {
            self.responses.insert(
                command.to_string(),
                MockResponse::Success {
                    stdout: stdout.to_string(),
                },
            );
            self
        }

        pub fn on_failure(mut self, command: &str, stderr: &str) -> Self {
            self.responses.insert(
                command.to_string(),
                MockResponse::Failure {
                    stderr: stderr.to_string(),
                },
            );
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self, prefix: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| call.starts_with(prefix))
                .count()
        }
    }

    #[async_trait]
    impl CommandExecutor for MockExecutor {
        async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecutorError> {
            let command = command_line(program, args);
            self.calls.lock().unwrap().push(command.clone());

            match self.responses.get(&command) {
                Some(MockResponse::Success { stdout }) => Ok(CommandOutput {
                    stdout: stdout.clone(),
                    stderr: String::new(),
                }),
                Some(MockResponse::Failure { stderr }) => Err(ExecutorError::NonZeroExit {
                    command,
                    status: ExitStatus::from_raw(256),
                    stderr: stderr.clone(),
                }),
                None => Err(ExecutorError::NonZeroExit {
                    command,
                    status: ExitStatus::from_raw(256),
                    stderr: "no scripted response".to_string(),
                }),
            }
        }
    }
}
