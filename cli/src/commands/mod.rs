//! # scaffoldsrv Commands
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per top-level subcommand. Each exposes a clap argument struct and
//! an async `handle_*` function that `main.rs` dispatches to.
//!
//! - **`serve`**: the HTTP template service
//! - **`templates`**: print the external tool's template listing
//!

/// The HTTP template service (`scaffoldsrv serve`).
pub mod serve;
/// Template listing on the command line (`scaffoldsrv templates`).
pub mod templates;
