//! # scaffoldsrv Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! Settings that control how the external tool is invoked are shared by every
//! command (`serve` and `templates`), so they live here. Server-only settings are
//! merged on top of these in `commands::serve::config`.
//!
//! Configuration sources (in order of precedence):
//! 1. Command-line arguments and environment variables, when they differ from the
//!    built-in defaults
//! 2. The TOML file named by `--config`, or `.scaffoldsrv.toml` in the current directory
//! 3. Default values defined in the code
//!
//! ## Examples
//!
//! ```toml
//! # .scaffoldsrv.toml
//! tool = "~/.dotnet/dotnet"
//! timeout_secs = 60
//! max_concurrent = 4
//! port = 9000
//! packaging = "zip"
//! ```
//!
use crate::core::error::Result;
use anyhow::{bail, Context};
use clap::Args;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info};

/// Name of the configuration file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".scaffoldsrv.toml";

pub const DEFAULT_TOOL: &str = "dotnet";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// # External Tool Arguments (`ToolArgs`)
///
/// Command-line options describing how to run the external tool. Flattened into
/// every subcommand that invokes it.
#[derive(Args, Debug, Clone)]
pub struct ToolArgs {
    /// Executable of the external code-generation tool. `~` is expanded.
    #[arg(long, env = "SCAFFOLDSRV_TOOL", default_value = DEFAULT_TOOL)]
    pub tool: String,

    /// Seconds a single tool invocation may run before it is killed.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Maximum number of tool processes running at the same time.
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT)]
    pub max_concurrent: usize,

    /// Path to a TOML configuration file. Defaults to `./.scaffoldsrv.toml` if present.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Resolved settings for invoking the external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Program name or path handed to the process spawner.
    pub executable: PathBuf,
    pub timeout: Duration,
    pub max_concurrent: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_TOOL),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

/// # Configuration File (`FileConfig`)
///
/// Every key is optional so the file only needs to mention what it overrides.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub tool: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_concurrent: Option<usize>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub enable_cors: Option<bool>,
    pub output_name: Option<String>,
    pub packaging: Option<String>,
}

impl ToolConfig {
    /// # Resolve Tool Configuration (`resolve`)
    ///
    /// Merges command-line arguments over the optional file configuration. An
    /// argument left at its default does not override a value from the file.
    ///
    /// ## Errors
    ///
    /// Returns an error if the timeout or the concurrency limit resolves to zero.
    pub fn resolve(args: &ToolArgs, file: Option<&FileConfig>) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();

        let tool = if args.tool != DEFAULT_TOOL {
            args.tool.clone()
        } else {
            file.tool.unwrap_or_else(|| args.tool.clone())
        };
        let timeout_secs = if args.timeout_secs != DEFAULT_TIMEOUT_SECS {
            args.timeout_secs
        } else {
            file.timeout_secs.unwrap_or(args.timeout_secs)
        };
        let max_concurrent = if args.max_concurrent != DEFAULT_MAX_CONCURRENT {
            args.max_concurrent
        } else {
            file.max_concurrent.unwrap_or(args.max_concurrent)
        };

        if timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        if max_concurrent == 0 {
            bail!("max_concurrent must be greater than zero");
        }

        let executable = PathBuf::from(shellexpand::tilde(&tool).into_owned());
        debug!("Resolved external tool: {}", executable.display());

        Ok(Self {
            executable,
            timeout: Duration::from_secs(timeout_secs),
            max_concurrent,
        })
    }
}

/// # Load Configuration File (`load_file_config`)
///
/// Reads the file given by `explicit`, or `.scaffoldsrv.toml` in the current
/// directory when no path is given.
///
/// ## Returns
///
/// * `Ok(None)` if no path was given and the default file does not exist.
///
/// ## Errors
///
/// Returns an error if an explicitly named file is missing, or if a file exists
/// but cannot be read or parsed.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return load_config_from_path(path).map(Some);
    }

    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let default_path = current_dir.join(CONFIG_FILE_NAME);
    if default_path.is_file() {
        load_config_from_path(&default_path).map(Some)
    } else {
        debug!("No {} found in {}", CONFIG_FILE_NAME, current_dir.display());
        Ok(None)
    }
}

fn load_config_from_path(path: &Path) -> Result<FileConfig> {
    info!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}
