//! # scaffoldsrv HTTP Server Configuration
//!
//! File: cli/src/commands/serve/config.rs
//!
//! ## Overview
//!
//! This module merges the settings for the `scaffoldsrv serve` command from:
//! 1. Command-line arguments (highest priority, when not left at their defaults)
//! 2. The configuration file (`--config <file>` or `./.scaffoldsrv.toml`)
//! 3. Default values (lowest priority)
//!
//! ## Examples
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 9000
//! enable_cors = false
//! output_name = "Project"
//! packaging = "zip"
//! tool = "/usr/share/dotnet/dotnet"
//! ```
//!
use crate::core::config::{self, FileConfig, ToolArgs, ToolConfig};
use crate::core::error::Result;
use anyhow::{bail, Context};
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, warn};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_OUTPUT_NAME: &str = "Sample";
const DEFAULT_PACKAGING: &str = "zip";

/// # Serve Command Arguments (`ServeArgs`)
///
/// Command-line arguments accepted by `scaffoldsrv serve`.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Network port the server listens on. The next free port is used if it is busy.
    #[arg(long, short, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// IP address to bind to. Use `0.0.0.0` to accept connections on all interfaces.
    #[arg(long, default_value_t = DEFAULT_HOST)]
    pub host: IpAddr,

    /// Disables Cross-Origin Resource Sharing (CORS) headers.
    #[arg(long)]
    pub no_cors: bool,

    /// Output directory and archive base name used when a request has no `output=` option.
    #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
    pub output_name: String,

    /// Packaging format used when a request has no `packaging` parameter.
    #[arg(long, default_value = DEFAULT_PACKAGING)]
    pub packaging: String,

    #[command(flatten)]
    pub tool: ToolArgs,
}

/// # Effective Server Configuration (`ServerConfig`)
///
/// Final settings after merging arguments, the configuration file and defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: IpAddr,
    pub enable_cors: bool,
    pub output_name: String,
    pub packaging: String,
    pub tool: ToolConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: DEFAULT_HOST,
            enable_cors: true,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            packaging: DEFAULT_PACKAGING.to_string(),
            tool: ToolConfig::default(),
        }
    }
}

/// # Load and Merge Server Configuration (`load_and_merge_config`)
///
/// Loads the configuration file, if any, and merges `args` over it.
///
/// ## Errors
///
/// Returns an error if the configuration file cannot be read or parsed, or if the
/// merged values are invalid.
pub fn load_and_merge_config(args: ServeArgs) -> Result<ServerConfig> {
    let file_config = config::load_file_config(args.tool.config.as_deref())?;
    merge(args, file_config)
}

fn merge(args: ServeArgs, file: Option<FileConfig>) -> Result<ServerConfig> {
    let tool = ToolConfig::resolve(&args.tool, file.as_ref())
        .context("Invalid external tool configuration")?;
    let mut effective = ServerConfig {
        port: args.port,
        host: args.host,
        enable_cors: !args.no_cors,
        output_name: args.output_name,
        packaging: args.packaging,
        tool,
    };

    let Some(file) = file else {
        debug!("No config file found or loaded. Using arguments.");
        return validate(effective);
    };

    if effective.port == DEFAULT_PORT {
        if let Some(port) = file.port {
            effective.port = port;
        }
    }
    if effective.host == DEFAULT_HOST {
        if let Some(host) = file.host.as_deref() {
            match host.parse() {
                Ok(ip) => effective.host = ip,
                Err(e) => warn!(
                    "Invalid host IP '{}' in config file ({}), using {}",
                    host, e, effective.host
                ),
            }
        }
    }
    // --no-cors always wins over the file.
    if effective.enable_cors {
        effective.enable_cors = file.enable_cors.unwrap_or(true);
    }
    if effective.output_name == DEFAULT_OUTPUT_NAME {
        if let Some(name) = file.output_name {
            effective.output_name = name;
        }
    }
    if effective.packaging == DEFAULT_PACKAGING {
        if let Some(packaging) = file.packaging {
            effective.packaging = packaging;
        }
    }

    validate(effective)
}

fn validate(config: ServerConfig) -> Result<ServerConfig> {
    if config.port == 0 {
        bail!("port must be greater than zero");
    }
    if config.output_name.trim().is_empty() {
        bail!("output_name must not be empty");
    }
    if config.output_name.contains(['/', '\\']) {
        bail!("output_name must be a plain name, got '{}'", config.output_name);
    }
    if config.packaging.trim().is_empty() {
        bail!("packaging must not be empty");
    }
    Ok(config)
}
