//! # scaffoldsrv Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! - `config`: settings for invoking the external tool, and the TOML file they can come from
//! - `error`: the `ServiceError` taxonomy and the `Result` alias
//! - `template_list`: parser for the tool's fixed-width template listing
//!
//! ```rust
//! use crate::core::error::{Result, ServiceError};
//! use crate::core::template_list::parse_listing;
//! ```
//!
pub mod config;
pub mod error;
pub mod template_list;
