use async_trait::async_trait;
use edex_common::config::ExecConfig;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// What happened to an external command. Launching never errors; every
/// failure is one of these variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// The process ran to exit. `exit_code` is -1 when killed by a signal.
    Completed {
        stdout: String,
        stderr: String,
        exit_code: i32,
    },
    /// The process outlived the wait bound and was killed.
    TimedOut { after: Duration },
    /// The process could not be started (not found, permission denied, ...).
    LaunchFailed { reason: String },
    /// The process started but collecting its output or status failed.
    ReadFailed { reason: String },
}

#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn run(&self, command_line: &str) -> ExecOutcome;
}

/// Runs command lines as host processes.
///
/// The line is split on whitespace into program and arguments; there is no
/// shell, so pipes, quoting and globs are passed through literally. The
/// child is killed if it has not exited within `timeout`.
pub struct SystemLauncher {
    timeout: Duration,
}

impl SystemLauncher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &ExecConfig) -> Self {
        Self::new(Duration::from_millis(config.timeout_ms))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ProcessLauncher for SystemLauncher {
    async fn run(&self, command_line: &str) -> ExecOutcome {
        let mut parts = command_line.split_whitespace();
        let Some(program) = parts.next() else {
            return ExecOutcome::LaunchFailed {
                reason: "empty command line".to_string(),
            };
        };

        let spawned = Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let child = match spawned {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("failed to launch {:?}: {}", program, e);
                return ExecOutcome::LaunchFailed {
                    reason: e.to_string(),
                };
            }
        };

        // Dropping the wait future on timeout drops the child, which kills it.
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => ExecOutcome::Completed {
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                exit_code: output.status.code().unwrap_or(-1),
            },
            Ok(Err(e)) => {
                tracing::warn!("lost {:?} while reading its output: {}", program, e);
                ExecOutcome::ReadFailed {
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                tracing::warn!("{:?} timed out after {:?}, killed", program, self.timeout);
                ExecOutcome::TimedOut {
                    after: self.timeout,
                }
            }
        }
    }
}
