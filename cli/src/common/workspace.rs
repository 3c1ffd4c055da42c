//! # scaffoldsrv Scoped Workspaces (`common::workspace`)
//!
//! File: cli/src/common/workspace.rs
//!
//! ## Overview
//!
//! Every invocation of the external tool runs inside its own empty directory
//! under the system temp root. The directory name (`scaffoldsrv-<uuid>`) doubles
//! as the correlation id in log lines for that invocation.
//!
//! A `ScopedWorkspace` owns its directory: dropping it deletes the whole tree,
//! whether the owning call returned normally, bailed out with `?`, or panicked.
//! A failed deletion is logged and otherwise ignored so it never replaces the
//! result of the operation that used the workspace.
//!
//! ```rust
//! let workspace = ScopedWorkspace::acquire()?;
//! runner.run(&args, Some(workspace.path())).await;
//! // directory removed here
//! ```
//!
use crate::core::error::Result;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const WORKSPACE_PREFIX: &str = "scaffoldsrv-";

/// An ephemeral, uniquely named directory that is removed on drop.
///
/// Removal is synchronous. Async callers holding a large tree should let it
/// drop inside `spawn_blocking`.
#[derive(Debug)]
pub struct ScopedWorkspace {
    path: PathBuf,
    name: String,
}

impl ScopedWorkspace {
    /// Creates a new empty directory under `std::env::temp_dir()`.
    pub fn acquire() -> Result<Self> {
        Self::acquire_in(&std::env::temp_dir())
    }

    /// Creates a new empty directory under `root`.
    pub fn acquire_in(root: &Path) -> Result<Self> {
        let name = format!("{}{}", WORKSPACE_PREFIX, Uuid::new_v4());
        let path = root.join(&name);
        // `create_dir` (not `create_dir_all`) so a name collision is an error.
        fs::create_dir(&path)
            .with_context(|| format!("Failed to create workspace {}", path.display()))?;
        debug!("{}: workspace created at {}", name, path.display());
        Ok(Self { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name, used as the correlation id for log lines.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the workspace contains no entries (or cannot be read).
    pub fn is_empty(&self) -> bool {
        fs::read_dir(&self.path)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }
}

impl Drop for ScopedWorkspace {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("{}: workspace removed", self.name),
            Err(e) => warn!(
                "{}: failed to remove workspace {}: {}",
                self.name,
                self.path.display(),
                e
            ),
        }
    }
}
