//! # scaffoldsrv Process Execution (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! `ProcessRunner` invokes the external code-generation tool and turns the way it
//! exits into an `Outcome`:
//!
//! - exit code 0 → `Outcome::Success(stdout)`
//! - any other exit → `Outcome::Failure(stderr)`; the tool reports user errors
//!   (such as an unknown template name) this way, so callers surface the text as-is
//! - cannot be started, or ran past its timeout → `Outcome::Unavailable(reason)`
//!
//! ## Architecture
//!
//! - The child runs in the caller's working directory, or in a `ScopedWorkspace`
//!   created for the call and removed before `run` returns.
//! - stdin is null; stdout and stderr are both piped and drained concurrently by
//!   `wait_with_output`, so neither pipe can fill up and stall the child.
//! - A semaphore bounds how many children run at once.
//! - `kill_on_drop` ties the child to the future: if the request is abandoned
//!   (client disconnects) or the timeout fires, the child is killed.
//!
use crate::common::workspace::ScopedWorkspace;
use crate::core::config::ToolConfig;
use crate::core::error::ServiceError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Result of one external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Exit code 0; carries stdout.
    Success(String),
    /// Non-zero exit; carries stderr.
    Failure(String),
    /// The tool could not be run to completion; carries a diagnostic.
    Unavailable(String),
}

impl Outcome {
    /// Maps the outcome onto the service error taxonomy.
    pub fn into_result(self) -> Result<String, ServiceError> {
        match self {
            Outcome::Success(stdout) => Ok(stdout),
            Outcome::Failure(stderr) => Err(ServiceError::SubprocessFailed { stderr }),
            Outcome::Unavailable(reason) => Err(ServiceError::SubprocessUnavailable(reason)),
        }
    }
}

/// Runs the external tool with bounded concurrency and a hard timeout.
#[derive(Debug)]
pub struct ProcessRunner {
    executable: PathBuf,
    timeout: Duration,
    permits: Semaphore,
}

impl ProcessRunner {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            timeout: config.timeout,
            permits: Semaphore::new(config.max_concurrent),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// # Run External Tool (`run`)
    ///
    /// Runs the tool with `args` inside `working_dir`, or inside a fresh scoped
    /// workspace when `working_dir` is `None`. Waits for a concurrency permit
    /// first. Never returns an error: every failure mode is an `Outcome`.
    pub async fn run<S: AsRef<str>>(&self, args: &[S], working_dir: Option<&Path>) -> Outcome {
        let args: Vec<&str> = args.iter().map(|arg| arg.as_ref()).collect();

        // Lives until the end of `run`; dropping it removes the directory.
        let scoped: ScopedWorkspace;
        let dir = match working_dir {
            Some(dir) => dir,
            None => {
                scoped = match ScopedWorkspace::acquire() {
                    Ok(workspace) => workspace,
                    Err(e) => {
                        error!("Could not create a workspace for the external tool: {:#}", e);
                        return Outcome::Unavailable(format!("{:#}", e));
                    }
                };
                scoped.path()
            }
        };
        let id = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => return Outcome::Unavailable("process runner is shut down".to_string()),
        };

        info!("{}: {} {}", id, self.executable.display(), args.join(" "));
        let child = Command::new(&self.executable)
            .args(&args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(e) => {
                error!("{}: failed to launch {}: {}", id, self.executable.display(), e);
                return Outcome::Unavailable(format!(
                    "failed to launch {}: {}",
                    self.executable.display(),
                    e
                ));
            }
        };

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!("{}: failed to collect output: {}", id, e);
                return Outcome::Unavailable(format!("failed to collect tool output: {}", e));
            }
            Err(_) => {
                // The dropped future owned the child; kill_on_drop terminates it.
                warn!("{}: killed after {}s", id, self.timeout.as_secs_f32());
                return Outcome::Unavailable(format!(
                    "{} did not finish within {}s",
                    self.executable.display(),
                    self.timeout.as_secs_f32()
                ));
            }
        };

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            info!("{}>\n{}", id, stdout);
            Outcome::Success(stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            info!("{}: {} ({})", id, stderr, output.status);
            debug!("{}: stdout of failed run:\n{}", id, String::from_utf8_lossy(&output.stdout));
            Outcome::Failure(stderr)
        }
    }
}
