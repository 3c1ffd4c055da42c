//! # scaffoldsrv HTTP Server Implementation
//!
//! File: cli/src/commands/serve/server_logic.rs
//!
//! ## Overview
//!
//! This module starts the template service:
//! - Archiver registry with the zip baseline plus the `tgz` format
//! - Process runner for the external tool (bounded, with timeout)
//! - Port availability checking with automatic fallback
//! - Request tracing and optional CORS
//! - Graceful shutdown on Ctrl+C / SIGTERM
//!
use super::config::ServerConfig;
use super::routes::{self, AppState};
use crate::common::archive::{ArchiverRegistry, TarGzArchiver};
use crate::common::process::ProcessRunner;
use crate::core::error::Result;
use anyhow::Context;
use axum::Router;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

/// # Run HTTP Server (`run_server`)
///
/// Builds the application state from `config`, binds the first free port at or
/// after `config.port`, and serves requests until a shutdown signal arrives.
///
/// ## Errors
///
/// Returns an error if archiver registration fails, no port can be bound, or the
/// server itself fails.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let max_port_attempts = 10;
    let addr = find_available_port(config.host, config.port, max_port_attempts).await?;

    let state = build_state(&config)?;
    info!(
        "Archivers: {}; external tool: {}",
        state.archivers.names().join(", "),
        state.runner.executable().display()
    );
    if state.archivers.lookup(&config.packaging).is_none() {
        warn!(
            "Default packaging '{}' is not registered; requests without `packaging` will get 404",
            config.packaging
        );
    }

    let app = create_app(state, config.enable_cors);

    println!("\n=================================================================");
    println!("🌐 Listening on:      http://{}", addr);
    println!("🛠️  External tool:     {}", config.tool.executable.display());
    println!("📦 Default packaging: {}", config.packaging);
    println!("🔒 CORS enabled:      {}", config.enable_cors);
    println!("=================================================================\n");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;
    info!("Starting server on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    println!("\nServer shutdown complete.");
    Ok(())
}

/// Registers the archivers and creates the process runner.
fn build_state(config: &ServerConfig) -> Result<AppState> {
    let archivers = ArchiverRegistry::new();
    archivers
        .register(Arc::new(TarGzArchiver))
        .context("Failed to register built-in archivers")?;

    Ok(AppState {
        runner: Arc::new(ProcessRunner::new(&config.tool)),
        archivers: Arc::new(archivers),
        default_output: config.output_name.clone(),
        default_packaging: config.packaging.clone(),
    })
}

/// Resolves on Ctrl+C, or SIGTERM on Unix. In-flight generations finish and
/// clean up their workspaces before the server exits.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        "Ctrl+C"
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
        "SIGTERM"
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };
    info!("{} received, draining requests", received);
}

/// # Find Available Port (`find_available_port`)
///
/// Tries `start_port` and the ports after it, `attempts` in total, and returns
/// the first address that binds. The trial listener is released immediately.
async fn find_available_port(host: IpAddr, start_port: u16, attempts: u8) -> Result<SocketAddr> {
    let last_port = start_port.saturating_add(u16::from(attempts).saturating_sub(1));
    for port in start_port..=last_port {
        let addr = SocketAddr::new(host, port);
        match TcpListener::bind(addr).await {
            Ok(_) => {
                if port != start_port {
                    info!("Port {} is busy, using {}", start_port, port);
                }
                return Ok(addr);
            }
            Err(e) => warn!("Cannot bind {}: {}", addr, e),
        }
    }

    anyhow::bail!(
        "No free port on {} in {}..={}",
        host,
        start_port,
        last_port
    )
}

/// # Create Axum Application (`create_app`)
///
/// Wraps the template routes in tracing and (optionally permissive) CORS layers.
fn create_app(state: AppState, enable_cors: bool) -> Router {
    let cors_layer = if enable_cors {
        info!("CORS middleware enabled (permissive).");
        CorsLayer::permissive()
    } else {
        info!("CORS middleware disabled.");
        CorsLayer::new()
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default().include_headers(true))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    routes::router(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer)
            .layer(cors_layer),
    )
}
