//! # scaffoldsrv Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! `scaffoldsrv` exposes the project-scaffolding features of an external
//! code-generation CLI (by default `dotnet new`) as an HTTP service. This file:
//! - Parses command-line arguments using Clap
//! - Sets up logging based on verbosity flags and `RUST_LOG`
//! - Dispatches to the command handlers
//!
//! ## Examples
//!
//! ```bash
//! # Run the service on port 9000
//! scaffoldsrv -v serve --port 9000
//!
//! # Check which templates the tool reports
//! scaffoldsrv templates
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod common;
mod core;

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "scaffoldsrv",
    about = "HTTP service for generating projects from code-generation templates",
    long_about = "Lists templates of an external code-generation tool, generates projects into\n\
                  temporary workspaces and serves them as archives, and installs template packs.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    /// Run the HTTP template service.
    #[command(alias = "s")]
    Serve(commands::serve::ServeArgs),
    /// Print the templates reported by the external tool.
    #[command(alias = "t")]
    Templates(commands::templates::TemplatesArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Serve(args) => commands::serve::handle_serve(args).await,
        Commands::Templates(args) => commands::templates::handle_templates(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
