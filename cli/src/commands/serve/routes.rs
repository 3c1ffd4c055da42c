//! # scaffoldsrv HTTP Routes
//!
//! File: cli/src/commands/serve/routes.rs
//!
//! ## Overview
//!
//! Request handlers for the template service:
//!
//! | Route                              | Tool invocation                     |
//! |------------------------------------|-------------------------------------|
//! | `GET /templates`                   | `new --list`                        |
//! | `POST /templates?nuGetId=<id>`     | `new --list`, `new --install <id>`, `new --list` |
//! | `GET /templates/{template}`        | `new <template> --output <name> --<opt>...` |
//! | `GET /templates/{template}/help`   | `new <template> --help`             |
//! | `GET /health`                      | none                                |
//!
//! Handlers return `Result<_, ServiceError>`; the `IntoResponse` impl below is the
//! single place where error kinds become status codes.
//!
//! Template names starting with `-` and output names that are not a single plain
//! path component are rejected with 400 before the tool runs.
//!
use crate::common::archive::{Archiver, ArchiverRegistry};
use crate::common::process::ProcessRunner;
use crate::common::workspace::ScopedWorkspace;
use crate::core::error::ServiceError;
use crate::core::template_list::{self, TemplateListing};
use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::path::Path as StdPath;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub runner: Arc<ProcessRunner>,
    pub archivers: Arc<ArchiverRegistry>,
    /// Output name used when the request has no `output=` option.
    pub default_output: String,
    /// Packaging format used when the request has no `packaging` parameter.
    pub default_packaging: String,
}

/// Builds the router for the template endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/templates", get(list_templates).post(install_templates))
        .route("/templates/{template}", get(generate_project))
        .route("/templates/{template}/help", get(template_help))
        .with_state(state)
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::SubprocessFailed { .. }
            | ServiceError::EmptyOutput { .. }
            | ServiceError::UnknownPackagingFormat { .. } => StatusCode::NOT_FOUND,
            ServiceError::SubprocessUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::MissingInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::FormatChanged(_)
            | ServiceError::DuplicateRegistration { .. }
            | ServiceError::Internal(_) => {
                error!("Request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Runs `new --list` and parses the table.
async fn fetch_listing(runner: &ProcessRunner) -> Result<TemplateListing, ServiceError> {
    let stdout = runner.run(&["new", "--list"], None).await.into_result()?;
    template_list::parse_listing(&stdout)
}

async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<TemplateListing>, ServiceError> {
    Ok(Json(fetch_listing(&state.runner).await?))
}

#[derive(Debug, Deserialize)]
struct InstallQuery {
    #[serde(rename = "nuGetId")]
    nuget_id: Option<String>,
}

/// Installs a template package and returns the templates it added.
async fn install_templates(
    State(state): State<AppState>,
    Query(query): Query<InstallQuery>,
) -> Result<Json<TemplateListing>, ServiceError> {
    let package = query
        .nuget_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ServiceError::MissingInput("NuGet ID".to_string()))?;

    let before = fetch_listing(&state.runner).await?;
    state
        .runner
        .run(&["new", "--install", package.as_str()], None)
        .await
        .into_result()?;
    let after = fetch_listing(&state.runner).await?;

    let added = template_list::installed_delta(&before, after);
    info!("Installed {}: {} new template(s)", package, added.len());
    Ok(Json(added))
}

async fn template_help(
    State(state): State<AppState>,
    Path(template): Path<String>,
) -> Result<String, ServiceError> {
    check_template_name(&template)?;
    state
        .runner
        .run(&["new", template.as_str(), "--help"], None)
        .await
        .into_result()
}

#[derive(Debug, Deserialize)]
struct GenerateQuery {
    options: Option<String>,
    packaging: Option<String>,
}

/// Tool arguments and download base name for one generation request.
#[derive(Debug, PartialEq, Eq)]
struct GenerateArgs {
    args: Vec<String>,
    output: String,
}

/// Rejects template names the tool would read as flags.
fn check_template_name(template: &str) -> Result<(), ServiceError> {
    if template.trim().is_empty() || template.starts_with('-') {
        return Err(ServiceError::MissingInput(format!(
            "valid template name, got '{}'",
            template
        )));
    }
    Ok(())
}

/// Rejects output names that would place files outside the workspace or break
/// the download header: empty, `.`/`..`, absolute, any separator or drive prefix.
fn check_output_name(output: &str) -> Result<(), ServiceError> {
    let is_plain = !output.trim().is_empty()
        && output != "."
        && !output.contains("..")
        && !output.contains(['/', '\\', ':', '"'])
        && !output.starts_with('-')
        && !StdPath::new(output).is_absolute();
    if !is_plain {
        return Err(ServiceError::MissingInput(format!(
            "plain output name, got '{}'",
            output
        )));
    }
    Ok(())
}

/// Turns `output=Foo,framework=net6.0,no-restore` into
/// `new <template> --output=Foo --framework=net6.0 --no-restore`. Without an
/// `output=` option, `--output <default_output>` is added.
///
/// ## Errors
///
/// `ServiceError::MissingInput` if the template looks like a flag or the
/// output name is not a plain directory name.
fn generate_args(
    template: &str,
    options: Option<&str>,
    default_output: &str,
) -> Result<GenerateArgs, ServiceError> {
    check_template_name(template)?;
    let options: Vec<&str> = options
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|opt| !opt.is_empty())
        .collect();

    // Every `output=` is checked, since the tool may honor any of them.
    let outputs: Vec<&str> = options
        .iter()
        .filter_map(|opt| opt.split_once('='))
        .filter(|(key, _)| key.trim() == "output")
        .map(|(_, value)| value.trim())
        .collect();
    for output in &outputs {
        check_output_name(output)?;
    }

    let mut args = vec!["new".to_string(), template.to_string()];
    let output = match outputs.first() {
        Some(name) => name.to_string(),
        None => {
            args.push("--output".to_string());
            args.push(default_output.to_string());
            check_output_name(default_output)?;
            default_output.to_string()
        }
    };
    args.extend(options.iter().map(|opt| format!("--{}", opt)));

    Ok(GenerateArgs { args, output })
}

/// Generates a project from `template` and returns it as an archive download.
async fn generate_project(
    State(state): State<AppState>,
    Path(template): Path<String>,
    Query(query): Query<GenerateQuery>,
) -> Result<Response, ServiceError> {
    let GenerateArgs { args, output } =
        generate_args(&template, query.options.as_deref(), &state.default_output)?;
    let packaging = query
        .packaging
        .unwrap_or_else(|| state.default_packaging.clone());

    let workspace = ScopedWorkspace::acquire()?;
    let outcome = state.runner.run(&args, Some(workspace.path())).await;

    // Filesystem work, including removal of the workspace when the closure
    // returns, stays off the async workers.
    let archivers = Arc::clone(&state.archivers);
    let (archiver, bytes) = tokio::task::spawn_blocking(
        move || -> Result<(Arc<dyn Archiver>, Vec<u8>), ServiceError> {
            outcome.into_result()?;
            if workspace.is_empty() {
                warn!("{}: template {} produced no files", workspace.name(), template);
                return Err(ServiceError::EmptyOutput { template });
            }

            let archiver = archivers
                .lookup(&packaging)
                .ok_or(ServiceError::UnknownPackagingFormat { format: packaging })?;
            let bytes = archiver.to_bytes(workspace.path())?;
            Ok((archiver, bytes))
        },
    )
    .await
    .context("Archive task failed")??;

    let filename = format!("{}{}", output, archiver.file_extension());
    info!("Sending {} ({} bytes)", filename, bytes.len());
    Ok((
        [
            (header::CONTENT_TYPE, archiver.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}
