//! # scaffoldsrv Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error taxonomy shared by the process runner, the
//! template list parser, the archiver registry and the HTTP handlers. Every
//! failure that can reach a caller is one of the `ServiceError` kinds below, so
//! the HTTP boundary can pick a status code by matching on the kind instead of
//! unwinding from deep inside a handler.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `ServiceError`: A `thiserror` enum with one variant per error kind
//! - `Result<T>`: A type alias for `anyhow::Result<T>` used for application plumbing
//!   (config loading, server startup) where context matters more than the kind
//!
//! The kinds split into three groups:
//! - Caller-facing "not found" conditions: `SubprocessFailed`, `EmptyOutput`,
//!   `UnknownPackagingFormat`
//! - Service-level conditions: `SubprocessUnavailable`, `Internal`
//! - Integrity conditions raised at startup or when the external tool changes its
//!   output: `FormatChanged`, `DuplicateRegistration`
//!
//! ## Examples
//!
//! ```rust
//! let archiver = registry
//!     .lookup(&packaging)
//!     .ok_or_else(|| ServiceError::UnknownPackagingFormat { format: packaging.clone() })?;
//! ```
//!
use thiserror::Error;

/// Custom error type for the scaffolding service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The external tool could not be launched, or did not finish in time.
    #[error("External tool unavailable: {0}")]
    SubprocessUnavailable(String),

    /// The external tool exited non-zero. Carries its stderr verbatim, which is
    /// what the caller sees.
    #[error("{stderr}")]
    SubprocessFailed { stderr: String },

    #[error("template {template} does not exist")]
    EmptyOutput { template: String },

    #[error("Packaging '{format}' not found.")]
    UnknownPackagingFormat { format: String },

    /// The listing printed by the external tool no longer has the expected layout.
    #[error("Template listing format changed: {0}")]
    FormatChanged(String),

    #[error("Archiver '{name}' is already registered.")]
    DuplicateRegistration { name: String },

    #[error("missing {0}")]
    MissingInput(String),

    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
/// Anyhow allows for easy context addition and flexible error handling.
pub type Result<T> = anyhow::Result<T>;
