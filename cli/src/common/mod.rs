//! # scaffoldsrv Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared building blocks used by the commands:
//!
//! - **`archive`**: the `Archiver` capability, the `ArchiverRegistry`, and the zip and tar.gz formats.
//! - **`process`**: `ProcessRunner`, which runs the external tool and maps its exit to an `Outcome`.
//! - **`workspace`**: `ScopedWorkspace`, a uniquely named temp directory removed on drop.
//!

/// Directory → archive bytes, keyed by packaging format.
pub mod archive;
/// Invocation of the external code-generation tool.
pub mod process;
/// Ephemeral working directories with guaranteed cleanup.
pub mod workspace;

#[cfg(all(test, unix))]
pub mod testing;
