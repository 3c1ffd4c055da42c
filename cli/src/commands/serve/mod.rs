//! # scaffoldsrv Template Service
//!
//! File: cli/src/commands/serve/mod.rs
//!
//! ## Overview
//!
//! The `scaffoldsrv serve` command exposes the external code-generation tool over
//! HTTP: list templates, generate a project into a scoped workspace and download
//! it as an archive, show a template's help, and install template packages.
//!
//! ## Architecture
//!
//! - `config.rs`: argument and configuration file merging
//! - `routes.rs`: handlers and the error → status code mapping
//! - `server_logic.rs`: state construction, middleware, bind and shutdown
//!
//! ## Examples
//!
//! ```bash
//! scaffoldsrv serve --port 9000 --tool ~/.dotnet/dotnet
//! curl 'http://localhost:9000/templates'
//! curl -OJ 'http://localhost:9000/templates/console?options=output=Foo,framework=net6.0'
//! curl -X POST 'http://localhost:9000/templates?nuGetId=Steeltoe.NetCoreTool.Templates'
//! ```
//!
use crate::core::error::Result;
use tracing::info;

pub use config::ServeArgs;

/// Handles configuration loading and merging for the template service.
pub mod config;

/// HTTP handlers for the template endpoints.
pub mod routes;

/// Contains the Axum server setup and lifecycle.
pub mod server_logic;

/// # Handle Serve Command (`handle_serve`)
///
/// Merges configuration and runs the server until shutdown.
pub async fn handle_serve(args: ServeArgs) -> Result<()> {
    info!("Handling serve command with args: {:?}", args);

    let config = config::load_and_merge_config(args)?;
    info!("Effective server config: {:?}", config);

    server_logic::run_server(config).await
}
